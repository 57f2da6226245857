//! Builders for label sets used in test scenarios

use label_sync_core::LabelSet;

/// Build a label set from `(name, color)` pairs
pub fn label_set(pairs: &[(&str, &str)]) -> LabelSet {
    pairs.iter().copied().collect()
}

/// Builder for label sets
#[derive(Debug, Default)]
pub struct LabelSetBuilder {
    labels: LabelSet,
}

impl LabelSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the built-in label table
    pub fn builtin() -> Self {
        Self {
            labels: LabelSet::builtin(),
        }
    }

    pub fn with_label(mut self, name: &str, color: &str) -> Self {
        self.labels.insert(name, color);
        self
    }

    pub fn build(self) -> LabelSet {
        self.labels
    }
}
