//! Reconciliation error types

use super::TrackerError;
use thiserror::Error;

/// Errors raised while converging the remote label set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The initial inventory could not be fetched, so no decision was made
    #[error("Failed to load remote labels: {source}")]
    Load {
        #[source]
        source: TrackerError,
    },

    /// Creating a missing label failed
    #[error("Failed to create label '{label}': {source}")]
    Create {
        label: String,
        #[source]
        source: TrackerError,
    },

    /// Changing the color of an existing label failed
    #[error("Failed to update label '{label}': {source}")]
    Update {
        label: String,
        #[source]
        source: TrackerError,
    },

    /// Deleting an orphan label failed
    #[error("Failed to delete label '{label}': {source}")]
    Delete {
        label: String,
        #[source]
        source: TrackerError,
    },

    /// The run was cancelled before it issued its first remote call
    #[error("Reconciliation cancelled")]
    Cancelled,

    /// The run finished but did not converge
    #[error("Reconciliation incomplete: {failed} failed, {skipped} skipped")]
    Incomplete { failed: usize, skipped: usize },
}

impl ReconcileError {
    /// The label this error concerns, if any
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Create { label, .. } | Self::Update { label, .. } | Self::Delete { label, .. } => {
                Some(label)
            }
            _ => None,
        }
    }

    /// The tracker error underneath, if any
    pub fn tracker_error(&self) -> Option<&TrackerError> {
        match self {
            Self::Load { source }
            | Self::Create { source, .. }
            | Self::Update { source, .. }
            | Self::Delete { source, .. } => Some(source),
            Self::Cancelled | Self::Incomplete { .. } => None,
        }
    }
}
