//! Validation related error types

use std::path::PathBuf;
use thiserror::Error;

/// Validation and configuration errors
///
/// These are raised before any remote call is attempted.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Invalid input parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Labels file could not be read or parsed
    #[error("Invalid labels file {path}: {reason}")]
    LabelsFile { path: PathBuf, reason: String },
}

impl ValidationError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: &str) -> Self {
        Self::InvalidConfiguration {
            message: message.to_string(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    /// Create a labels file error
    pub fn labels_file(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::LabelsFile {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_invalid_configuration_error() {
        let error = ValidationError::invalid_configuration("Bad config");
        assert!(error.to_string().contains("Invalid configuration"));
        assert!(error.to_string().contains("Bad config"));
    }

    #[test]
    fn test_invalid_parameter_error() {
        let error = ValidationError::invalid_parameter("repo", "expected owner/name");
        assert!(error.to_string().contains("Invalid parameter"));
        assert!(error.to_string().contains("repo"));
        assert!(error.to_string().contains("expected owner/name"));
    }

    #[test]
    fn test_missing_field_error() {
        let error = ValidationError::missing_field("token");
        assert!(error.to_string().contains("Missing required field"));
        assert!(error.to_string().contains("token"));
    }

    #[test]
    fn test_labels_file_error() {
        let error = ValidationError::labels_file(Path::new("/tmp/labels.toml"), "expected a table");
        assert!(error.to_string().contains("/tmp/labels.toml"));
        assert!(error.to_string().contains("expected a table"));
    }
}
