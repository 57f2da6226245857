//! Label reconciliation
//!
//! The [`Reconciler`] classifies every desired label against a snapshot of
//! the remote labels, applies one create or update call per label that
//! differs, and reports remote labels that are not declared (orphans).
//!
//! Labels are processed sequentially in name order. The remote snapshot is
//! taken once and never re-read, so a second run over the result of the
//! first issues no calls at all.
//!
//! Orphans are never deleted by [`Reconciler::reconcile`]. Deletion is the
//! separate [`Reconciler::delete_orphans`] operation, which the caller must
//! invoke explicitly.

mod plan;
mod report;

pub use plan::{LabelAction, orphans, plan};
pub use report::{
    LabelOperation, LabelOutcome, LabelResult, PruneFailure, PruneReport, ReconcileReport,
    ReconcileSummary,
};

use crate::error::{ReconcileError, Result};
use crate::inventory::load_remote_labels;
use crate::label::{DesiredLabelSet, Label, RemoteLabelSet};
use crate::tracker::IssueTracker;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What to do after a remote call fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure and carry on with the next label
    #[default]
    Continue,
    /// Stop issuing calls; remaining labels are reported as skipped
    FailFast,
}

/// Reconciler settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    pub failure_policy: FailurePolicy,
    /// Classify only, never call the tracker's mutating operations
    pub dry_run: bool,
}

/// Converges a tracker's labels to a desired label set
pub struct Reconciler {
    tracker: Arc<dyn IssueTracker>,
    options: ReconcileOptions,
    cancel: CancellationToken,
}

impl Reconciler {
    pub fn new(tracker: Arc<dyn IssueTracker>, options: ReconcileOptions) -> Self {
        Self {
            tracker,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop issuing remote calls once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Load the remote labels, then reconcile against `desired`
    ///
    /// A failed load aborts before any decision is made.
    pub async fn run(&self, desired: &DesiredLabelSet) -> Result<ReconcileReport> {
        if self.cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled.into());
        }

        let remote = load_remote_labels(self.tracker.as_ref())
            .await
            .map_err(|source| ReconcileError::Load { source })?;

        Ok(self.reconcile(&remote, desired).await)
    }

    /// Reconcile `desired` against an already loaded snapshot
    pub async fn reconcile(
        &self,
        remote: &RemoteLabelSet,
        desired: &DesiredLabelSet,
    ) -> ReconcileReport {
        let mut report = ReconcileReport {
            repository: self.tracker.repository().to_string(),
            dry_run: self.options.dry_run,
            ..Default::default()
        };
        let mut halted = false;

        for action in plan(remote, desired) {
            let outcome = if !action.requires_call() {
                debug!("Label '{}' already up to date", action.name());
                LabelOutcome::Verified
            } else if self.options.dry_run {
                planned_outcome(&action)
            } else if halted || self.cancel.is_cancelled() {
                report.cancelled |= self.cancel.is_cancelled();
                LabelOutcome::Skipped
            } else {
                let outcome = self.apply(&action).await;
                if outcome.is_failed() && self.options.failure_policy == FailurePolicy::FailFast {
                    warn!("Stopping after first failure");
                    halted = true;
                }
                outcome
            };

            report.results.push(LabelResult {
                name: action.name().to_string(),
                color: action.color().to_string(),
                outcome,
            });
        }

        report.orphans = orphans(remote, desired);
        for orphan in &report.orphans {
            warn!(
                "Label '{}' exists on {} but is not declared",
                orphan, report.repository
            );
        }

        report
    }

    async fn apply(&self, action: &LabelAction) -> LabelOutcome {
        match action {
            LabelAction::Create { name, color } => {
                match self.tracker.create_label(&Label::new(name, color)).await {
                    Ok(_) => {
                        info!("Created label '{name}' ({color})");
                        LabelOutcome::Created
                    }
                    Err(error) => {
                        warn!("Failed to create label '{name}': {error}");
                        LabelOutcome::Failed {
                            operation: LabelOperation::Create,
                            error,
                        }
                    }
                }
            }
            LabelAction::Update { name, from, to } => {
                match self.tracker.edit_label(name, &Label::new(name, to)).await {
                    Ok(_) => {
                        info!("Updated label '{name}' ({from} -> {to})");
                        LabelOutcome::Updated {
                            previous: from.clone(),
                        }
                    }
                    Err(error) => {
                        warn!("Failed to update label '{name}': {error}");
                        LabelOutcome::Failed {
                            operation: LabelOperation::Update,
                            error,
                        }
                    }
                }
            }
            LabelAction::Verify { .. } => LabelOutcome::Verified,
        }
    }

    /// Delete the orphans found by a previous [`reconcile`](Self::reconcile)
    ///
    /// Only names listed in `report.orphans` are touched. Follows the same
    /// failure policy, dry-run setting and cancellation as reconciliation.
    pub async fn delete_orphans(&self, report: &ReconcileReport) -> PruneReport {
        let mut prune = PruneReport::default();
        let mut halted = false;

        for name in &report.orphans {
            if self.options.dry_run {
                prune.planned.push(name.clone());
                continue;
            }
            if halted || self.cancel.is_cancelled() {
                prune.cancelled |= self.cancel.is_cancelled();
                prune.skipped.push(name.clone());
                continue;
            }

            match self.tracker.delete_label(name).await {
                Ok(()) => {
                    info!("Deleted label '{name}'");
                    prune.deleted.push(name.clone());
                }
                Err(error) => {
                    warn!("Failed to delete label '{name}': {error}");
                    prune.failed.push(PruneFailure {
                        name: name.clone(),
                        error,
                    });
                    halted = self.options.failure_policy == FailurePolicy::FailFast;
                }
            }
        }

        prune
    }
}

fn planned_outcome(action: &LabelAction) -> LabelOutcome {
    match action {
        LabelAction::Create { .. } => LabelOutcome::WouldCreate,
        LabelAction::Update { from, .. } => LabelOutcome::WouldUpdate {
            previous: from.clone(),
        },
        LabelAction::Verify { .. } => LabelOutcome::Verified,
    }
}
