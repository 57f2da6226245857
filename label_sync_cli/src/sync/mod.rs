//! The `sync` command
//!
//! Resolves the repository, token and desired labels from flags and
//! configuration, then converges the repository's labels.

use crate::config::{AppConfig, GITHUB_TOKEN_ENV, GitHubSettings};
use crate::error::{CliError, CliResult};
use crate::orchestrators::sync_orchestrator::{SyncOptions, SyncOrchestrator};
use crate::output::{OutputFormat, create_formatter};
use crate::terminal;
use clap::Args;
use label_sync_core::{AuthToken, GitHubClient, RepositoryRef, ValidationError};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Converge a repository's labels to the desired set
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Repository owner (user or organization)
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name, or an owner/name slug
    #[arg(long)]
    pub repo: Option<String>,

    /// GitHub token (defaults to the configured token, then GITHUB_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// TOML file with a [labels] table to use instead of the configured labels
    #[arg(long, value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// Show what would change without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Stop at the first failed call
    #[arg(long)]
    pub fail_fast: bool,

    /// Delete labels that exist remotely but are not declared
    #[arg(long)]
    pub prune: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl SyncCommand {
    /// Repository from flags, falling back to configuration
    ///
    /// A slug passed with `--repo` carries its own owner, so the configured
    /// owner is ignored for it.
    pub fn repository(&self, settings: &GitHubSettings) -> Result<RepositoryRef, ValidationError> {
        let slug_flag = self.repo.as_deref().is_some_and(|r| r.contains('/'));
        let owner = if slug_flag {
            self.owner.as_deref()
        } else {
            self.owner.as_deref().or(settings.owner.as_deref())
        };
        let repo = self.repo.as_deref().or(settings.repo.as_deref());

        resolve_repository(owner, repo)
    }

    /// Token from `--token`, the configuration, then `GITHUB_TOKEN`
    ///
    /// An empty value at one source falls through to the next.
    pub fn token(&self, settings: &GitHubSettings) -> Result<AuthToken, ValidationError> {
        resolve_token([
            self.token.clone(),
            settings.token.clone(),
            std::env::var(GITHUB_TOKEN_ENV).ok(),
        ])
    }

    fn options(&self, config: &AppConfig) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run,
            fail_fast: self.fail_fast || config.sync.fail_fast,
            prune: self.prune || config.sync.prune,
        }
    }
}

/// First non-empty token among `candidates`, in order
fn resolve_token(
    candidates: impl IntoIterator<Item = Option<String>>,
) -> Result<AuthToken, ValidationError> {
    candidates
        .into_iter()
        .flatten()
        .find(|token| !token.is_empty())
        .map(AuthToken::new)
        .ok_or_else(|| ValidationError::missing_field("token"))
}

/// Build a repository reference from an owner and a name or `owner/name` slug
pub fn resolve_repository(
    owner: Option<&str>,
    repo: Option<&str>,
) -> Result<RepositoryRef, ValidationError> {
    let repo = repo.ok_or_else(|| ValidationError::missing_field("repo"))?;

    if repo.contains('/') {
        let slug: RepositoryRef = repo.parse()?;
        if let Some(owner) = owner
            && owner.trim() != slug.owner()
        {
            return Err(ValidationError::invalid_parameter(
                "repo",
                &format!("slug owner '{}' conflicts with owner '{owner}'", slug.owner()),
            ));
        }
        return Ok(slug);
    }

    let owner = owner.ok_or_else(|| ValidationError::missing_field("owner"))?;
    RepositoryRef::new(owner, repo)
}

/// Execute the sync command
pub async fn execute(cmd: SyncCommand, config: AppConfig) -> CliResult<()> {
    // Everything that can be wrong locally is checked before the first request
    let repository = cmd.repository(&config.github)?;
    let token = cmd.token(&config.github)?;
    let desired = config.desired_labels(cmd.labels.as_deref())?;
    let format = config
        .output
        .format(cmd.format)
        .map_err(|e| CliError::misuse(&e.to_string()))?;
    let options = cmd.options(&config);

    debug!("Syncing {} labels to {repository}", desired.len());
    let client = GitHubClient::new(repository, token, config.github.client_config())?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let orchestrator = SyncOrchestrator::new(Arc::new(client), options).with_cancellation(cancel);
    let result = orchestrator.sync(&desired).await;
    interrupt.abort();
    let outcome = result?;

    let formatter = create_formatter(format, terminal::should_use_color(config.output.color_enabled));
    println!("{}", formatter.format_sync(&outcome)?.trim_end());

    outcome.ensure_success()?;
    Ok(())
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Interrupted; no further changes will be made");
        token.cancel();
    }
}
