//! Issue tracker related error types

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by an issue tracker client
///
/// Every variant carries owned strings so that a failure can be stored in a
/// reconciliation report and rendered later.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerError {
    /// The request never produced a response
    #[error("Network error: {message}")]
    Network { message: String },

    /// The tracker answered with a non-success status
    #[error("Issue tracker API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The tracker rejected the credential
    #[error("Authentication failed: {message}")]
    Unauthorized { message: String },

    /// The request quota is exhausted
    #[error("Rate limit exceeded{}", reset_suffix(.reset_in_secs))]
    RateLimited { reset_in_secs: Option<u64> },

    /// The response body could not be decoded
    #[error("Failed to decode issue tracker response: {message}")]
    Decode { message: String },

    /// The request could not be built, so nothing was sent
    #[error("Invalid issue tracker request: {message}")]
    InvalidRequest { message: String },
}

fn reset_suffix(reset_in_secs: &Option<u64>) -> String {
    reset_in_secs
        .map(|secs| format!(", resets in {secs}s"))
        .unwrap_or_default()
}

impl TrackerError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an API error with status and message
    pub fn api(status: u16, message: &str) -> Self {
        Self::Api {
            status,
            message: message.to_string(),
        }
    }

    /// Create an authentication error
    pub fn unauthorized(message: &str) -> Self {
        Self::Unauthorized {
            message: message.to_string(),
        }
    }

    /// Create a rate limit error
    pub fn rate_limited(reset_in: Option<Duration>) -> Self {
        Self::RateLimited {
            reset_in_secs: reset_in.map(|d| d.as_secs()),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an error for a request that cannot be sent
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Check if this error is transient and a later run may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => matches!(status, 500..=504),
            Self::Unauthorized { .. } | Self::Decode { .. } | Self::InvalidRequest { .. } => false,
        }
    }

    /// Check if this error indicates a permanent failure
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Api { status, .. } => matches!(status, 400..=499),
            Self::Unauthorized { .. } | Self::InvalidRequest { .. } => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error() {
        let error = TrackerError::network("connection reset");
        assert!(error.to_string().contains("Network error"));
        assert!(error.to_string().contains("connection reset"));
        assert!(error.is_transient());
        assert!(!error.is_permanent());
    }

    #[test]
    fn test_api_error() {
        let error = TrackerError::api(502, "Bad gateway");
        assert!(error.to_string().contains("502"));
        assert!(error.to_string().contains("Bad gateway"));
        assert!(error.is_transient());
        assert!(!error.is_permanent());
    }

    #[test]
    fn test_validation_failure_is_permanent() {
        let error = TrackerError::api(422, "Validation Failed");
        assert!(!error.is_transient());
        assert!(error.is_permanent());
    }

    #[test]
    fn test_unauthorized_error() {
        let error = TrackerError::unauthorized("Bad credentials");
        assert!(error.to_string().contains("Authentication failed"));
        assert!(error.is_permanent());
    }

    #[test]
    fn test_rate_limited_display() {
        let error = TrackerError::rate_limited(Some(Duration::from_secs(42)));
        assert_eq!(error.to_string(), "Rate limit exceeded, resets in 42s");

        let error = TrackerError::rate_limited(None);
        assert_eq!(error.to_string(), "Rate limit exceeded");
        assert!(error.is_transient());
    }

    #[test]
    fn test_invalid_request_is_permanent() {
        let error = TrackerError::invalid_request("label name '..' cannot be addressed");
        assert!(error.to_string().starts_with("Invalid issue tracker request"));
        assert!(error.is_permanent());
        assert!(!error.is_transient());
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let error = TrackerError::api(404, "Not Found");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "api");
        assert_eq!(json["status"], 404);
        assert_eq!(json["message"], "Not Found");
    }
}
