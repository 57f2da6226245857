//! Mock implementations for testing

mod tracker;

pub use tracker::{MockIssueTracker, TrackerCall};
