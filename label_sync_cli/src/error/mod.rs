use colored::*;
use label_sync_core::{Error as CoreError, ReconcileError, TrackerError, ValidationError};
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// CLI-specific error type with semantic exit codes
#[derive(Debug)]
pub struct CliError {
    /// The main error message
    message: String,

    /// Error category for exit code determination
    category: ErrorCategory,

    /// Additional context information
    context: Vec<(String, String)>,

    /// Suggestions for recovery
    pub suggestions: Vec<String>,

    /// Source error if any
    source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Error categories that map to exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCategory {
    General,
    Misuse,
    Network,
    Filesystem,
    Incomplete,
}

/// Semantic exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Misuse = 2,
    NetworkError = 3,
    FilesystemError = 4,
    /// Some labels failed or were skipped
    Incomplete = 5,
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Extension trait for adding context to errors
pub trait ErrorContext {
    fn with_context(self, key: &str, value: &str) -> Self;
    fn with_suggestion(self, suggestion: &str) -> Self;
    fn with_source(self, source: Box<dyn StdError + Send + Sync>) -> Self;
}

impl CliError {
    fn new(message: &str, category: ErrorCategory) -> Self {
        Self {
            message: message.to_string(),
            category,
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Create a general error
    pub fn general(message: &str) -> Self {
        Self::new(message, ErrorCategory::General)
    }

    /// Create a command misuse or configuration error
    pub fn misuse(message: &str) -> Self {
        Self::new(message, ErrorCategory::Misuse)
            .with_suggestion("Run 'label-sync --help' for usage information")
    }

    /// Create a network error
    pub fn network(message: &str) -> Self {
        Self::new(message, ErrorCategory::Network)
            .with_suggestion("Check your internet connection")
            .with_suggestion("Verify GitHub status at https://www.githubstatus.com")
            .with_suggestion("Try again later")
    }

    /// Create a filesystem error
    pub fn filesystem(message: &str) -> Self {
        let mut error = Self::new(message, ErrorCategory::Filesystem);

        if message.contains("not found") {
            error
                .suggestions
                .push("Check if the file or directory exists".to_string());
        } else if message.contains("permission") || message.contains("denied") {
            error.suggestions.push("Check file permissions".to_string());
        }

        error
    }

    /// Create an error for a reconciliation that did not converge
    pub fn incomplete(message: &str) -> Self {
        Self::new(message, ErrorCategory::Incomplete)
            .with_suggestion("Re-run the sync once the failures above are resolved")
    }

    /// Create an error from an IO error
    pub fn from_io_error(error: io::Error, path: &str) -> Self {
        let message = format!("IO error on '{path}': {error}");
        let mut cli_error = match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                Self::filesystem(&message)
            }
            _ => Self::general(&message),
        };

        cli_error.source = Some(Box::new(error));
        cli_error
            .context
            .push(("path".to_string(), path.to_string()));
        cli_error
    }

    /// Create an error from a failed tracker call
    pub fn from_tracker_error(error: TrackerError) -> Self {
        let message = error.to_string();
        let cli_error = match &error {
            TrackerError::Unauthorized { .. } => Self::new(&message, ErrorCategory::Network)
                .with_suggestion("Check that the token is valid and can write issues"),
            TrackerError::RateLimited { .. } => Self::new(&message, ErrorCategory::Network)
                .with_suggestion("Wait for the rate limit window to reset"),
            TrackerError::Api { status: 404, .. } => Self::new(&message, ErrorCategory::Network)
                .with_suggestion("Check the owner and repository names"),
            e if e.is_transient() => Self::network(&message),
            e if e.is_permanent() => Self::new(&message, ErrorCategory::Network)
                .with_suggestion("The request was rejected; retrying will not change the result"),
            _ => Self::new(&message, ErrorCategory::Network)
                .with_suggestion("Run with --debug to see the full error chain"),
        };

        cli_error.with_source(Box::new(error))
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::General => ExitCode::GeneralError,
            ErrorCategory::Misuse => ExitCode::Misuse,
            ErrorCategory::Network => ExitCode::NetworkError,
            ErrorCategory::Filesystem => ExitCode::FilesystemError,
            ErrorCategory::Incomplete => ExitCode::Incomplete,
        }
    }

    fn prefix(&self) -> &'static str {
        match self.category {
            ErrorCategory::General => "Error",
            ErrorCategory::Misuse => "Usage Error",
            ErrorCategory::Network => "Network Error",
            ErrorCategory::Filesystem => "File Error",
            ErrorCategory::Incomplete => "Sync Incomplete",
        }
    }

    /// Format the error for user display
    pub fn format_for_user(&self, debug: bool) -> String {
        let mut output = String::new();

        let prefix = match self.category {
            ErrorCategory::Misuse | ErrorCategory::Incomplete => self.prefix().yellow(),
            _ => self.prefix().red(),
        };

        output.push_str(&format!("{}: {}\n", prefix, self.message));

        if !self.context.is_empty() {
            output.push_str("\nContext:\n");
            for (key, value) in &self.context {
                output.push_str(&format!("  {}: {}\n", key.bold(), value));
            }
        }

        // Error chain in debug mode
        if debug && let Some(source) = &self.source {
            output.push_str("\nCaused by:\n");
            let mut current: Option<&dyn StdError> = Some(source.as_ref());
            let mut level = 1;

            while let Some(err) = current {
                output.push_str(&format!("  {level}: {err}\n"));
                current = err.source();
                level += 1;
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.prefix(), self.message)?;

        for (key, value) in &self.context {
            write!(f, " ({key}: {value})")?;
        }

        Ok(())
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl ErrorContext for CliError {
    fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.push((key.to_string(), value.to_string()));
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }

    fn with_source(mut self, source: Box<dyn StdError + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(e) => Self::misuse(&e.to_string()).with_source(Box::new(e)),
            CoreError::Tracker(e) => Self::from_tracker_error(e),
            CoreError::Reconcile(ReconcileError::Load { source }) => {
                Self::from_tracker_error(source).with_context("stage", "loading remote labels")
            }
            CoreError::Reconcile(e @ ReconcileError::Incomplete { .. }) => {
                Self::incomplete(&e.to_string())
            }
            CoreError::Reconcile(e) => Self::general(&e.to_string()).with_source(Box::new(e)),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(error: ValidationError) -> Self {
        CoreError::from(error).into()
    }
}

impl From<ReconcileError> for CliError {
    fn from(error: ReconcileError) -> Self {
        CoreError::from(error).into()
    }
}

/// Convert anyhow errors to CLI errors
impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        Self::general(&format!("{error:#}"))
    }
}

/// Simple Levenshtein distance for key suggestions
pub(crate) fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();
    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(len1 + 1) {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate().take(len2 + 1) {
        *cell = j;
    }

    for (i, c1) in s1_chars.iter().enumerate() {
        let i1 = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let j1 = j + 1;
            let cost = if c1 == c2 { 0 } else { 1 };
            matrix[i1][j1] = std::cmp::min(
                std::cmp::min(matrix[i][j1] + 1, matrix[i1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }

    matrix[len1][len2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_misuse() {
        let error: CliError = CoreError::from(ValidationError::missing_field("token")).into();
        assert_eq!(error.exit_code(), ExitCode::Misuse);
        assert!(error.to_string().contains("token"));
    }

    #[test]
    fn test_load_failure_is_network() {
        let error: CliError = ReconcileError::Load {
            source: TrackerError::unauthorized("Bad credentials"),
        }
        .into();
        assert_eq!(error.exit_code(), ExitCode::NetworkError);
        assert!(error.to_string().contains("loading remote labels"));
        assert!(error.suggestions.iter().any(|s| s.contains("token")));
    }

    #[test]
    fn test_tracker_suggestions_follow_retryability() {
        let transient = CliError::from_tracker_error(TrackerError::api(502, "Bad Gateway"));
        assert_eq!(transient.exit_code(), ExitCode::NetworkError);
        assert!(transient.suggestions.iter().any(|s| s.contains("Try again later")));

        let permanent = CliError::from_tracker_error(TrackerError::api(422, "Validation Failed"));
        assert_eq!(permanent.exit_code(), ExitCode::NetworkError);
        assert!(permanent.suggestions.iter().any(|s| s.contains("retrying will not")));
        assert!(!permanent.suggestions.iter().any(|s| s.contains("Try again later")));

        let decode = CliError::from_tracker_error(TrackerError::decode("expected value"));
        assert!(decode.suggestions.iter().any(|s| s.contains("--debug")));
    }

    #[test]
    fn test_success_exit_code() {
        assert_eq!(ExitCode::Success as i32, 0);
    }

    #[test]
    fn test_incomplete_exit_code() {
        let error: CliError = ReconcileError::Incomplete {
            failed: 1,
            skipped: 2,
        }
        .into();
        assert_eq!(error.exit_code(), ExitCode::Incomplete);
        assert_eq!(error.exit_code() as i32, 5);
    }

    #[test]
    fn test_io_error_category() {
        let error = CliError::from_io_error(
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            "/etc/label-sync/config.toml",
        );
        assert_eq!(error.exit_code(), ExitCode::FilesystemError);
        assert!(error.format_for_user(false).contains("config.toml"));
    }

    #[test]
    fn test_debug_output_includes_cause() {
        let error: CliError = ReconcileError::Cancelled.into();
        let output = error.format_for_user(true);
        assert!(output.contains("Caused by"));
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("github.ownr", "github.owner"), 1);
        assert_eq!(levenshtein_distance("same", "same"), 0);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }
}
