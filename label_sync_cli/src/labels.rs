//! The `labels` command: print the effective desired label set

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, create_formatter};
use crate::terminal;
use clap::Args;
use std::path::PathBuf;

/// Show the labels a sync would converge to
#[derive(Debug, Args)]
pub struct LabelsCommand {
    /// TOML file with a [labels] table to use instead of the configured labels
    #[arg(long, value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,
}

pub fn execute(cmd: LabelsCommand, config: AppConfig) -> CliResult<()> {
    let labels = config.desired_labels(cmd.labels.as_deref())?;
    let format = config
        .output
        .format(cmd.format)
        .map_err(|e| CliError::misuse(&e.to_string()))?;

    let formatter = create_formatter(format, terminal::should_use_color(config.output.color_enabled));
    println!("{}", formatter.format_labels(&labels)?.trim_end());
    Ok(())
}
