use crate::error::levenshtein_distance;
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use label_sync_core::tracker::github::DEFAULT_API_URL;
use label_sync_core::{DesiredLabelSet, GitHubConfig, LabelSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "LABEL_SYNC_";

/// Token source used when neither flags nor configuration provide one
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Keys whose values are never printed
const SECRET_KEYS: &[&str] = &["github.token"];

/// A configuration value as it may be shown on a terminal
pub fn display_value(key: &str, value: &str) -> String {
    if SECRET_KEYS.contains(&key) && !value.is_empty() {
        "********".to_string()
    } else {
        value.to_string()
    }
}

/// Keys accepted by `config set`
const KNOWN_KEYS: &[&str] = &[
    "github.owner",
    "github.repo",
    "github.token",
    "github.api_url",
    "github.timeout_seconds",
    "github.user_agent",
    "sync.fail_fast",
    "sync.prune",
    "output.default_format",
    "output.color_enabled",
];

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub output: OutputConfig,

    /// Replaces the built-in label table when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelSet>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GitHubSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub api_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SyncSettings {
    pub fail_fast: bool,
    pub prune: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub default_format: String,
    pub color_enabled: bool,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        let defaults = GitHubConfig::default();
        Self {
            owner: None,
            repo: None,
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: defaults.timeout.as_secs(),
            user_agent: defaults.user_agent,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "human".to_string(),
            color_enabled: true,
        }
    }
}

impl OutputConfig {
    /// The flag if given, otherwise the configured default
    pub fn format(&self, flag: Option<OutputFormat>) -> Result<OutputFormat> {
        match flag {
            Some(format) => Ok(format),
            None => OutputFormat::from_string(&self.default_format),
        }
    }
}

impl GitHubSettings {
    /// Connection settings for the GitHub adapter
    pub fn client_config(&self) -> GitHubConfig {
        GitHubConfig {
            api_url: self.api_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

impl AppConfig {
    /// The label set a run converges to
    ///
    /// A labels file wins over the `[labels]` table, which wins over the
    /// built-in table.
    pub fn desired_labels(
        &self,
        labels_file: Option<&Path>,
    ) -> label_sync_core::Result<DesiredLabelSet> {
        if let Some(path) = labels_file {
            return LabelSet::from_toml_file(path);
        }

        Ok(match &self.labels {
            Some(labels) if !labels.is_empty() => labels.clone(),
            _ => LabelSet::builtin(),
        })
    }
}

/// Configuration manager that handles XDG-compliant paths and layered configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with default XDG-compliant paths
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    fn default_config_path() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("label-sync/config.toml");
        }

        dirs::config_dir()
            .map(|d| d.join("label-sync").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".label-sync/config.toml"))
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    ///
    /// Command line flags are applied on top by the caller.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().with_context(|| {
            format!(
                "Failed to load configuration from {}",
                self.config_path.display()
            )
        })
    }

    /// Get a configuration value by key (dot notation)
    pub fn get(&self, key: &str) -> Result<String> {
        let config = self.load()?;
        let toml_string = toml::to_string(&config)?;
        let value: toml::Value = toml::from_str(&toml_string)?;

        let mut current = &value;
        for part in key.split('.') {
            match current {
                toml::Value::Table(table) => {
                    current = table
                        .get(part)
                        .ok_or_else(|| anyhow::anyhow!("Key '{}' not found", key))?;
                }
                _ => anyhow::bail!("Invalid key path: {}", key),
            }
        }

        match current {
            toml::Value::String(s) => Ok(s.clone()),
            toml::Value::Integer(i) => Ok(i.to_string()),
            toml::Value::Boolean(b) => Ok(b.to_string()),
            _ => anyhow::bail!("Value at '{}' is not a simple type", key),
        }
    }

    /// Set a configuration value by key (dot notation)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.validate_config_value(key, value)?;
        let parsed_value = self.parse_config_value(key, value)?;

        let mut config = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            toml::from_str(&content)?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let Some((section, field)) = key.split_once('.') else {
            anyhow::bail!("Invalid key path: {}", key);
        };

        let toml::Value::Table(root) = &mut config else {
            anyhow::bail!("Configuration file is not a table");
        };
        let toml::Value::Table(table) = root
            .entry(section)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()))
        else {
            anyhow::bail!("Invalid key path: expected table at '{}'", section);
        };
        table.insert(field.to_string(), parsed_value);

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(&self.config_path, toml_string)?;

        Ok(())
    }

    /// List all configuration values, with the token masked
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let config = self.load()?;
        let toml_string = toml::to_string(&config)?;
        let value: toml::Value = toml::from_str(&toml_string)?;

        let mut items = Vec::new();
        Self::collect_values(&value, String::new(), &mut items);
        for (key, value) in &mut items {
            *value = display_value(key, value);
        }
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(items)
    }

    fn collect_values(value: &toml::Value, prefix: String, items: &mut Vec<(String, String)>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    Self::collect_values(val, new_prefix, items);
                }
            }
            toml::Value::String(s) => items.push((prefix, s.clone())),
            toml::Value::Integer(i) => items.push((prefix, i.to_string())),
            toml::Value::Boolean(b) => items.push((prefix, b.to_string())),
            _ => {}
        }
    }

    fn validate_config_value(&self, key: &str, value: &str) -> Result<()> {
        if let Some(name) = key.strip_prefix("labels.") {
            if name.is_empty() {
                anyhow::bail!("Label name must not be empty");
            }
            return Ok(());
        }

        match key {
            "github.timeout_seconds" => {
                let timeout: u64 = value
                    .parse()
                    .context("timeout_seconds must be a positive integer")?;
                if timeout == 0 {
                    anyhow::bail!("timeout_seconds must be greater than 0");
                }
            }
            "github.owner" | "github.repo" => {
                if value.trim().is_empty() || value.contains('/') {
                    anyhow::bail!("{key} must be a single non-empty path segment");
                }
            }
            "sync.fail_fast" | "sync.prune" | "output.color_enabled" => {
                let _: bool = value.parse().context("Value must be 'true' or 'false'")?;
            }
            "output.default_format" => {
                OutputFormat::from_string(value)?;
            }
            k if KNOWN_KEYS.contains(&k) => {}
            _ => match suggest_key(key) {
                Some(known) => {
                    anyhow::bail!("Unknown configuration key '{key}'. Did you mean '{known}'?")
                }
                None => anyhow::bail!("Unknown configuration key '{key}'"),
            },
        }
        Ok(())
    }

    fn parse_config_value(&self, key: &str, value: &str) -> Result<toml::Value> {
        match key {
            k if k.ends_with("_seconds") => {
                let num: i64 = value.parse().context("Expected integer value")?;
                Ok(toml::Value::Integer(num))
            }
            k if k.ends_with("_enabled") || k == "sync.fail_fast" || k == "sync.prune" => {
                let bool_val: bool = value
                    .parse()
                    .context("Expected boolean value (true/false)")?;
                Ok(toml::Value::Boolean(bool_val))
            }
            // colors such as 000000 must stay strings
            _ => Ok(toml::Value::String(value.to_string())),
        }
    }
}

/// Closest known key to a mistyped one
fn suggest_key(key: &str) -> Option<&'static str> {
    KNOWN_KEYS
        .iter()
        .copied()
        .map(|known| (known, levenshtein_distance(key, known)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(known, _)| known)
}

/// Load configuration from the default location
pub fn get_config() -> Result<AppConfig> {
    ConfigManager::new().load()
}
