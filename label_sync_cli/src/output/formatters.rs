use super::OutputFormatter;
use crate::orchestrators::sync_orchestrator::SyncOutcome;
use anyhow::Result;
use colored::*;
use label_sync_core::{LabelOperation, LabelOutcome, LabelSet, PruneReport};

type Paint = fn(&str) -> ColoredString;

fn operation_verb(operation: LabelOperation) -> &'static str {
    match operation {
        LabelOperation::Create => "create",
        LabelOperation::Update => "update",
        LabelOperation::Delete => "delete",
    }
}

/// Text formatter for human-readable output
pub struct HumanFormatter {
    use_color: bool,
}

impl HumanFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn colorize(&self, text: &str, color: Paint) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// A two-cell block painted in the label's own color
    fn swatch(&self, color: &str) -> String {
        if !self.use_color || color.len() != 6 {
            return String::new();
        }
        match u32::from_str_radix(color, 16) {
            Ok(rgb) => {
                let [_, r, g, b] = rgb.to_be_bytes();
                format!("{} ", "  ".on_truecolor(r, g, b))
            }
            Err(_) => String::new(),
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn outcome_style(outcome: &LabelOutcome) -> (&'static str, Color) {
        match outcome {
            LabelOutcome::Created | LabelOutcome::WouldCreate => ("+", Color::Green),
            LabelOutcome::Updated { .. } | LabelOutcome::WouldUpdate { .. } => {
                ("~", Color::Yellow)
            }
            LabelOutcome::Verified => ("✓", Color::BrightBlack),
            LabelOutcome::Failed { .. } => ("✗", Color::Red),
            LabelOutcome::Skipped => ("-", Color::Magenta),
        }
    }

    fn outcome_detail(outcome: &LabelOutcome) -> String {
        match outcome {
            LabelOutcome::Updated { previous } | LabelOutcome::WouldUpdate { previous } => {
                format!("{} (was {previous})", outcome.as_str())
            }
            LabelOutcome::Failed { operation, error } => {
                format!("failed to {}: {error}", operation_verb(*operation))
            }
            other => other.as_str().to_string(),
        }
    }

    fn format_prune(&self, prune: &PruneReport, output: &mut String) {
        for name in &prune.deleted {
            output.push_str(&format!("  {} {name}\n", self.colorize("deleted", |s| s.red())));
        }
        for name in &prune.planned {
            output.push_str(&format!(
                "  {} {name}\n",
                self.colorize("would delete", |s| s.yellow())
            ));
        }
        for failure in &prune.failed {
            output.push_str(&format!(
                "  {} {}: {}\n",
                self.colorize("✗ failed to delete", |s| s.red()),
                failure.name,
                failure.error
            ));
        }
        for name in &prune.skipped {
            output.push_str(&format!(
                "  {} {name}\n",
                self.colorize("skipped", |s| s.magenta())
            ));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_sync(&self, outcome: &SyncOutcome) -> Result<String> {
        let report = &outcome.report;
        let mut output = String::new();

        let title = format!("Labels for {}", report.repository);
        output.push_str(&self.colorize(&title, |s| s.cyan().bold()));
        if report.dry_run {
            output.push_str(&self.colorize(" (dry run, no changes made)", |s| s.yellow()));
        }
        output.push_str("\n\n");

        let width = report
            .results
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0);

        for result in &report.results {
            let (marker, color) = Self::outcome_style(&result.outcome);
            output.push_str(&format!(
                "  {} {:<width$}  {}{}  {}\n",
                self.paint(marker, color),
                result.name,
                self.swatch(&result.color),
                result.color,
                self.paint(&Self::outcome_detail(&result.outcome), color),
            ));
        }

        if !report.orphans.is_empty() {
            output.push_str(&format!(
                "\n{}\n",
                self.colorize("Orphans (present remotely, not declared):", |s| s.bold())
            ));
            match &outcome.prune {
                Some(prune) => self.format_prune(prune, &mut output),
                None => {
                    for name in &report.orphans {
                        output.push_str(&format!("  ? {name}\n"));
                    }
                    output.push_str("  Run with --prune to delete them\n");
                }
            }
        }

        let summary = &outcome.summary;
        let mut parts = Vec::new();
        if report.dry_run {
            parts.push(format!("{} planned", summary.planned));
        } else {
            parts.push(format!("{} created", summary.created));
            parts.push(format!("{} updated", summary.updated));
        }
        parts.push(format!("{} verified", summary.verified));
        parts.push(format!("{} failed", summary.failed));
        parts.push(format!("{} skipped", summary.skipped));
        parts.push(format!("{} orphans", summary.orphans));

        output.push_str(&format!(
            "\n{} {}\n",
            self.colorize("Summary:", |s| s.bold()),
            parts.join(", ")
        ));

        if report.cancelled {
            output.push_str(&self.colorize(
                "Run cancelled; remaining labels were skipped\n",
                |s| s.yellow(),
            ));
        }

        Ok(output)
    }

    fn format_labels(&self, labels: &LabelSet) -> Result<String> {
        let width = labels.names().map(|n| n.chars().count()).max().unwrap_or(0);

        let mut output = String::new();
        for (name, color) in labels.iter() {
            output.push_str(&format!(
                "  {:<width$}  {}{color}\n",
                name,
                self.swatch(color)
            ));
        }
        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_sync(&self, outcome: &SyncOutcome) -> Result<String> {
        self.to_json(outcome)
    }

    fn format_labels(&self, labels: &LabelSet) -> Result<String> {
        self.to_json(labels)
    }
}

/// Tab separated `name<TAB>state` lines for scripting
pub struct MinimalFormatter;

impl MinimalFormatter {
    fn tag(outcome: &LabelOutcome) -> &'static str {
        match outcome {
            LabelOutcome::Created => "created",
            LabelOutcome::Updated { .. } => "updated",
            LabelOutcome::Verified => "verified",
            LabelOutcome::WouldCreate => "would_create",
            LabelOutcome::WouldUpdate { .. } => "would_update",
            LabelOutcome::Failed { .. } => "failed",
            LabelOutcome::Skipped => "skipped",
        }
    }
}

impl OutputFormatter for MinimalFormatter {
    fn format_sync(&self, outcome: &SyncOutcome) -> Result<String> {
        let mut lines: Vec<String> = outcome
            .report
            .results
            .iter()
            .map(|r| format!("{}\t{}", r.name, Self::tag(&r.outcome)))
            .collect();

        match &outcome.prune {
            Some(prune) => {
                lines.extend(prune.deleted.iter().map(|n| format!("{n}\tdeleted")));
                lines.extend(prune.planned.iter().map(|n| format!("{n}\twould_delete")));
                lines.extend(prune.failed.iter().map(|f| format!("{}\tdelete_failed", f.name)));
                lines.extend(prune.skipped.iter().map(|n| format!("{n}\tdelete_skipped")));
            }
            None => {
                lines.extend(outcome.report.orphans.iter().map(|n| format!("{n}\torphan")));
            }
        }

        Ok(lines.join("\n"))
    }

    fn format_labels(&self, labels: &LabelSet) -> Result<String> {
        Ok(labels
            .iter()
            .map(|(name, color)| format!("{name}={color}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
