//! Sync command orchestrator
//!
//! Runs one reconciliation against a tracker, optionally followed by orphan
//! deletion, and bundles both results for rendering.

use label_sync_core::{
    DesiredLabelSet, FailurePolicy, IssueTracker, PruneReport, ReconcileError, ReconcileOptions,
    ReconcileReport, ReconcileSummary, Reconciler,
};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Sync command options
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Report what would change without calling the tracker
    pub dry_run: bool,
    /// Stop at the first failed call
    pub fail_fast: bool,
    /// Delete orphan labels after reconciling
    pub prune: bool,
}

impl SyncOptions {
    fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            failure_policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Continue
            },
            dry_run: self.dry_run,
        }
    }
}

/// Everything a sync run produced
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub report: ReconcileReport,
    pub summary: ReconcileSummary,
    /// Present only when pruning was requested
    pub prune: Option<PruneReport>,
}

impl SyncOutcome {
    pub fn new(report: ReconcileReport, prune: Option<PruneReport>) -> Self {
        Self {
            summary: report.summary(),
            report,
            prune,
        }
    }

    /// Fail unless every label and every requested deletion went through
    pub fn ensure_success(&self) -> Result<(), ReconcileError> {
        let (prune_failed, prune_skipped) = self
            .prune
            .as_ref()
            .map_or((0, 0), |p| (p.failed.len(), p.skipped.len()));

        let failed = self.summary.failed + prune_failed;
        let skipped = self.summary.skipped + prune_skipped;

        if failed == 0 && skipped == 0 {
            Ok(())
        } else {
            Err(ReconcileError::Incomplete { failed, skipped })
        }
    }
}

/// Orchestrator for the sync command
pub struct SyncOrchestrator {
    reconciler: Reconciler,
    options: SyncOptions,
}

impl SyncOrchestrator {
    pub fn new(tracker: Arc<dyn IssueTracker>, options: SyncOptions) -> Self {
        debug!("Creating sync orchestrator with options: {options:?}");
        Self {
            reconciler: Reconciler::new(tracker, options.reconcile_options()),
            options,
        }
    }

    /// Stop issuing calls once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.reconciler = self.reconciler.with_cancellation(token);
        self
    }

    /// Reconcile `desired`, then delete orphans when pruning is enabled
    pub async fn sync(&self, desired: &DesiredLabelSet) -> label_sync_core::Result<SyncOutcome> {
        let report = self.reconciler.run(desired).await?;

        let prune = if !self.options.prune {
            None
        } else if self.options.fail_fast && !report.is_success() {
            warn!("Not deleting orphans after a failed reconciliation");
            Some(PruneReport {
                skipped: report.orphans.clone(),
                ..Default::default()
            })
        } else {
            Some(self.reconciler.delete_orphans(&report).await)
        };

        Ok(SyncOutcome::new(report, prune))
    }
}
