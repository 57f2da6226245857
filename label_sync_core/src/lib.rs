//! label-sync core library
//!
//! Reconciles the labels of an issue-tracker repository against a declared
//! label set: missing labels are created, labels with the wrong color are
//! updated, matching labels are left alone, and undeclared labels are
//! reported as orphans.

pub mod error;
pub mod inventory;
pub mod label;
pub mod reconcile;
pub mod security;
pub mod tracker;

// Re-export main types
pub use error::{Error, ReconcileError, Result, TrackerError, ValidationError};
pub use inventory::load_remote_labels;
pub use label::{DEFAULT_LABELS, DesiredLabelSet, Label, LabelSet, RemoteLabelSet};
pub use reconcile::{
    FailurePolicy, LabelAction, LabelOperation, LabelOutcome, LabelResult, PruneFailure,
    PruneReport, ReconcileOptions, ReconcileReport, ReconcileSummary, Reconciler,
};
pub use security::AuthToken;
pub use tracker::{GitHubClient, GitHubConfig, IssueTracker, RepositoryRef};
