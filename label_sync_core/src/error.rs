//! Error types for the label-sync core library
//!
//! Errors are grouped by where they arise: the issue tracker, input
//! validation, and the reconciliation run itself.

use thiserror::Error;

pub mod reconcile;
pub mod tracker;
pub mod validation;

pub use self::reconcile::ReconcileError;
pub use self::tracker::TrackerError;
pub use self::validation::ValidationError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the label-sync core library
///
/// - Tracker errors: transport and API failures from the issue tracker
/// - Validation errors: configuration problems caught before any remote call
/// - Reconcile errors: load failures, per-label failures and incomplete runs
#[derive(Error, Debug)]
pub enum Error {
    /// Issue tracker errors
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reconciliation errors
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl Error {
    /// Whether the error was caused by configuration rather than the remote side
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
