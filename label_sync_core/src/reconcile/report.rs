//! Reconciliation results

use crate::error::{ReconcileError, TrackerError};
use serde::Serialize;

/// Remote operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOperation {
    Create,
    Update,
    Delete,
}

/// Terminal state of one desired label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LabelOutcome {
    Created,
    Updated {
        previous: String,
    },
    Verified,
    /// Dry run: the label would be created
    WouldCreate,
    /// Dry run: the label would change color
    WouldUpdate {
        previous: String,
    },
    Failed {
        operation: LabelOperation,
        error: TrackerError,
    },
    /// Not attempted because the run stopped first
    Skipped,
}

impl LabelOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Short lowercase name for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated { .. } => "updated",
            Self::Verified => "verified",
            Self::WouldCreate => "would create",
            Self::WouldUpdate { .. } => "would update",
            Self::Failed { .. } => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Outcome for one desired label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelResult {
    pub name: String,
    pub color: String,
    #[serde(flatten)]
    pub outcome: LabelOutcome,
}

/// Counts per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub verified: usize,
    pub planned: usize,
    pub failed: usize,
    pub skipped: usize,
    pub orphans: usize,
}

/// Result of one reconciliation pass
///
/// `results` holds exactly one entry per desired label, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub repository: String,
    pub results: Vec<LabelResult>,
    pub orphans: Vec<String>,
    pub dry_run: bool,
    pub cancelled: bool,
}

impl ReconcileReport {
    pub fn outcome(&self, name: &str) -> Option<&LabelOutcome> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.outcome)
    }

    pub fn summary(&self) -> ReconcileSummary {
        let mut summary = ReconcileSummary {
            orphans: self.orphans.len(),
            ..Default::default()
        };

        for result in &self.results {
            match result.outcome {
                LabelOutcome::Created => summary.created += 1,
                LabelOutcome::Updated { .. } => summary.updated += 1,
                LabelOutcome::Verified => summary.verified += 1,
                LabelOutcome::WouldCreate | LabelOutcome::WouldUpdate { .. } => {
                    summary.planned += 1
                }
                LabelOutcome::Failed { .. } => summary.failed += 1,
                LabelOutcome::Skipped => summary.skipped += 1,
            }
        }

        summary
    }

    /// True when no label failed or was skipped
    pub fn is_success(&self) -> bool {
        !self
            .results
            .iter()
            .any(|r| r.outcome.is_failed() || r.outcome.is_skipped())
    }

    /// One error per failed label
    pub fn errors(&self) -> Vec<ReconcileError> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                LabelOutcome::Failed { operation, error } => {
                    Some(label_error(*operation, &r.name, error))
                }
                _ => None,
            })
            .collect()
    }

    /// Turn a non-converged report into [`ReconcileError::Incomplete`]
    pub fn ensure_success(&self) -> Result<(), ReconcileError> {
        if self.is_success() {
            return Ok(());
        }

        let summary = self.summary();
        Err(ReconcileError::Incomplete {
            failed: summary.failed,
            skipped: summary.skipped,
        })
    }
}

/// A label that could not be deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneFailure {
    pub name: String,
    pub error: TrackerError,
}

/// Result of deleting orphan labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub deleted: Vec<String>,
    /// Dry run: labels that would be deleted
    pub planned: Vec<String>,
    pub failed: Vec<PruneFailure>,
    pub skipped: Vec<String>,
    pub cancelled: bool,
}

impl PruneReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn errors(&self) -> Vec<ReconcileError> {
        self.failed
            .iter()
            .map(|f| label_error(LabelOperation::Delete, &f.name, &f.error))
            .collect()
    }

    pub fn ensure_success(&self) -> Result<(), ReconcileError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(ReconcileError::Incomplete {
                failed: self.failed.len(),
                skipped: self.skipped.len(),
            })
        }
    }
}

fn label_error(operation: LabelOperation, label: &str, error: &TrackerError) -> ReconcileError {
    let label = label.to_string();
    let source = error.clone();
    match operation {
        LabelOperation::Create => ReconcileError::Create { label, source },
        LabelOperation::Update => ReconcileError::Update { label, source },
        LabelOperation::Delete => ReconcileError::Delete { label, source },
    }
}
