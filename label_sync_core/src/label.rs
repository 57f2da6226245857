//! Label model and label sets
//!
//! A [`LabelSet`] maps label names to colors. It is used both for the
//! declared target state and for the snapshot of the remote tracker.

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::Path;

/// Labels applied when no label set is configured
pub const DEFAULT_LABELS: &[(&str, &str)] = &[
    ("review/triage", "924cb2"),
    // priorities
    ("P0", "b60205"),
    ("P1", "d93f0b"),
    ("P2", "e99695"),
    ("P3", "c2e0c6"),
    ("P4", "c5def5"),
    // estimates
    ("1", "fef2c0"),
    ("2", "f9d0c4"),
    ("4", "e99695"),
    ("8", "d93f0b"),
    ("16", "b60205"),
    // issue kinds
    ("backlog", "f7d74a"),
    ("Task", "1d76db"),
    ("Story", "1c8300"),
    ("Epic", "3E4B9E"),
    ("S", "0c508c"),
];

/// A single issue tracker label
///
/// Colors are six hex digits without a leading `#`. They are not validated
/// here; the tracker decides what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Mapping from label name to label color
///
/// Names compare exactly. Iteration is in name order, which keeps
/// reconciliation output stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

/// The label set a run should converge to
pub type DesiredLabelSet = LabelSet;

/// Snapshot of the labels present on the tracker at run start
pub type RemoteLabelSet = LabelSet;

#[derive(Deserialize)]
struct LabelsFile {
    labels: LabelSet,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in label table
    pub fn builtin() -> Self {
        DEFAULT_LABELS.iter().copied().collect()
    }

    /// Fold a list of labels into a set; a repeated name keeps the last color
    pub fn from_labels(labels: impl IntoIterator<Item = Label>) -> Self {
        labels.into_iter().collect()
    }

    /// Parse a TOML document with a `[labels]` table
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<LabelsFile>(content).map(|file| file.labels)
    }

    /// Load a TOML labels file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::labels_file(path, e.to_string()))?;
        let labels = Self::from_toml_str(&content)
            .map_err(|e| ValidationError::labels_file(path, e.message()))?;

        if labels.is_empty() {
            return Err(ValidationError::labels_file(path, "no labels defined").into());
        }

        Ok(labels)
    }

    /// Insert a label, returning the color it replaced
    pub fn insert(&mut self, name: impl Into<String>, color: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), color.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(name, color)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Names present in `self` but absent from `other`
    pub fn difference<'a>(&'a self, other: &'a LabelSet) -> impl Iterator<Item = &'a str> {
        self.names().filter(move |name| !other.contains(name))
    }

    pub fn to_labels(&self) -> Vec<Label> {
        self.iter().map(|(name, color)| Label::new(name, color)).collect()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, color)| (name.into(), color.into()))
                .collect(),
        )
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self(iter.into_iter().map(|l| (l.name, l.color)).collect())
    }
}

impl IntoIterator for LabelSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_table() {
        let labels = LabelSet::builtin();
        assert_eq!(labels.len(), 16);
        assert_eq!(labels.get("P0"), Some("b60205"));
        assert_eq!(labels.get("backlog"), Some("f7d74a"));
        assert_eq!(labels.get("Epic"), Some("3E4B9E"));
        assert_eq!(labels.get("review/triage"), Some("924cb2"));
    }

    #[test]
    fn test_duplicate_names_last_seen_wins() {
        let labels = LabelSet::from_labels(vec![
            Label::new("bug", "ff0000"),
            Label::new("docs", "0000ff"),
            Label::new("bug", "00ff00"),
        ]);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("bug"), Some("00ff00"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let labels: LabelSet = [("Bug", "ff0000")].into_iter().collect();
        assert!(labels.contains("Bug"));
        assert!(!labels.contains("bug"));
    }

    #[test]
    fn test_difference() {
        let remote: LabelSet = [("P0", "b60205"), ("stale", "ffffff")].into_iter().collect();
        let desired: LabelSet = [("P0", "b60205"), ("P1", "d93f0b")].into_iter().collect();

        let orphans: Vec<&str> = remote.difference(&desired).collect();
        assert_eq!(orphans, vec!["stale"]);
    }

    #[test]
    fn test_from_toml_str() {
        let labels = LabelSet::from_toml_str(
            r#"
            [labels]
            P0 = "b60205"
            "review/triage" = "924cb2"
            "#,
        )
        .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("review/triage"), Some("924cb2"));
    }

    #[test]
    fn test_from_toml_file_rejects_empty_table() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[labels]").unwrap();

        let error = LabelSet::from_toml_file(file.path()).unwrap_err();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("no labels defined"));
    }

    #[test]
    fn test_from_toml_file_missing() {
        let error = LabelSet::from_toml_file(Path::new("/nonexistent/labels.toml")).unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_serializes_as_plain_table() {
        let labels: LabelSet = [("Task", "1d76db")].into_iter().collect();
        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, r#"{"Task":"1d76db"}"#);
    }
}
