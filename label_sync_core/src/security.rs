//! Credential handling
//!
//! The issue tracker token is wrapped so it is zeroed when dropped and never
//! shows up in debug output or logs.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An opaque API token
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken {
    inner: String,
}

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            inner: token.into(),
        }
    }

    /// Borrow the raw token for use in an Authorization header
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.trim().is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

impl From<String> for AuthToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}
