//! Issue tracker abstraction
//!
//! The reconciler only talks to an [`IssueTracker`]. The repository a
//! tracker operates on is fixed when the tracker is constructed.

pub mod github;

pub use github::{GitHubClient, GitHubConfig};

use crate::error::{TrackerError, ValidationError};
use crate::label::Label;
use std::fmt;
use std::str::FromStr;

/// Label operations offered by an issue tracker
#[async_trait::async_trait]
pub trait IssueTracker: Send + Sync {
    /// The repository this tracker operates on
    fn repository(&self) -> &RepositoryRef;

    /// List every label of the repository
    async fn list_labels(&self) -> Result<Vec<Label>, TrackerError>;

    /// Create a label
    async fn create_label(&self, label: &Label) -> Result<Label, TrackerError>;

    /// Replace the label called `name` with `label`
    async fn edit_label(&self, name: &str, label: &Label) -> Result<Label, TrackerError>;

    /// Delete the label called `name`
    async fn delete_label(&self, name: &str) -> Result<(), TrackerError>;
}

/// An `owner/name` repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Create a reference, rejecting blank or slash-containing parts
    pub fn new(owner: &str, name: &str) -> Result<Self, ValidationError> {
        let owner = owner.trim();
        let name = name.trim();

        if owner.is_empty() {
            return Err(ValidationError::missing_field("owner"));
        }
        if name.is_empty() {
            return Err(ValidationError::missing_field("repo"));
        }
        if owner.contains('/') {
            return Err(ValidationError::invalid_parameter(
                "owner",
                "must not contain '/'",
            ));
        }
        if name.contains('/') {
            return Err(ValidationError::invalid_parameter(
                "repo",
                "must not contain '/' when --owner is given",
            ));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepositoryRef {
    type Err = ValidationError;

    /// Parse an `owner/name` slug
    fn from_str(slug: &str) -> Result<Self, Self::Err> {
        match slug.trim().split_once('/') {
            Some((owner, name)) => Self::new(owner, name),
            None => Err(ValidationError::invalid_parameter(
                "repo",
                "expected 'owner/name'",
            )),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
