//! Pure classification of desired labels against the remote snapshot

use crate::label::{DesiredLabelSet, RemoteLabelSet};
use serde::Serialize;

/// What a desired label needs in order to match the remote tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LabelAction {
    /// The label is missing remotely
    Create { name: String, color: String },
    /// The label exists with another color
    Update {
        name: String,
        from: String,
        to: String,
    },
    /// The label already matches
    Verify { name: String, color: String },
}

impl LabelAction {
    pub fn name(&self) -> &str {
        match self {
            Self::Create { name, .. } | Self::Update { name, .. } | Self::Verify { name, .. } => {
                name
            }
        }
    }

    /// The color the label has once the action is applied
    pub fn color(&self) -> &str {
        match self {
            Self::Create { color, .. } | Self::Verify { color, .. } => color,
            Self::Update { to, .. } => to,
        }
    }

    /// Whether applying this action takes a remote call
    pub fn requires_call(&self) -> bool {
        !matches!(self, Self::Verify { .. })
    }
}

/// Classify every desired label, in name order
///
/// Each decision depends only on `remote[name]` and `desired[name]`. Hex
/// colors match regardless of letter case; updates carry the desired color
/// as declared.
pub fn plan(remote: &RemoteLabelSet, desired: &DesiredLabelSet) -> Vec<LabelAction> {
    desired
        .iter()
        .map(|(name, color)| match remote.get(name) {
            None => LabelAction::Create {
                name: name.to_string(),
                color: color.to_string(),
            },
            Some(current) if current.eq_ignore_ascii_case(color) => LabelAction::Verify {
                name: name.to_string(),
                color: color.to_string(),
            },
            Some(current) => LabelAction::Update {
                name: name.to_string(),
                from: current.to_string(),
                to: color.to_string(),
            },
        })
        .collect()
}

/// Remote labels that are not declared, in name order
pub fn orphans(remote: &RemoteLabelSet, desired: &DesiredLabelSet) -> Vec<String> {
    remote.difference(desired).map(str::to_string).collect()
}
