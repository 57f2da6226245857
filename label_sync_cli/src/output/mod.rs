mod formatters;

pub use formatters::{HumanFormatter, JsonFormatter, MinimalFormatter};

use crate::orchestrators::sync_orchestrator::SyncOutcome;
use anyhow::Result;
use label_sync_core::LabelSet;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// Minimal output (for scripting)
    Minimal,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn from_string(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "minimal" => Ok(Self::Minimal),
            _ => anyhow::bail!("Unknown output format: {}", s),
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format the result of a sync run
    fn format_sync(&self, outcome: &SyncOutcome) -> Result<String>;

    /// Format a label set
    fn format_labels(&self, labels: &LabelSet) -> Result<String>;
}

/// Create a formatter based on output format
pub fn create_formatter(format: OutputFormat, use_color: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Human => Box::new(HumanFormatter::new(use_color)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Minimal => Box::new(MinimalFormatter),
    }
}
