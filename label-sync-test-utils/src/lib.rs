//! Test utilities for label-sync
//!
//! This crate provides an in-memory issue tracker and label-set builders
//! for testing the reconciler and the CLI orchestration.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{LabelSetBuilder, label_set};
pub use mocks::{MockIssueTracker, TrackerCall};
