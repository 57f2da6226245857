use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use label_sync_cli::config::{AppConfig, ConfigManager, display_value, get_config};
use label_sync_cli::error::{CliError, CliResult, ErrorContext, ExitCode};
use label_sync_cli::{labels, sync};
use std::collections::BTreeMap;

#[derive(Parser)]
#[command(name = "label-sync")]
#[command(author, version, about = "Reconcile GitHub issue labels against a declared label set", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and update labels so the repository matches the desired set
    Sync(sync::SyncCommand),

    /// Print the desired label set
    Labels(labels::LabelsCommand),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., github.owner)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., github.owner or labels.P0)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration values
    List,

    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let debug = cli.debug;

    // Initialize logging based on debug flag
    if debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("label_sync_core", log::LevelFilter::Debug)
            .filter_module("label_sync_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let exit_code = match run(cli.command).await {
        Ok(()) => ExitCode::Success,
        Err(error) => {
            eprint!("{}", error.format_for_user(debug));
            error.exit_code()
        }
    };

    std::process::exit(exit_code as i32);
}

async fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Sync(command) => sync::execute(command, load_config()?).await,
        Commands::Labels(command) => labels::execute(command, load_config()?),
        Commands::Config { command } => config_command(command),
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

fn load_config() -> CliResult<AppConfig> {
    get_config().map_err(|e| {
        CliError::misuse(&format!("{e:#}")).with_context(
            "config",
            &ConfigManager::new().get_config_path().display().to_string(),
        )
    })
}

fn config_command(command: ConfigCommand) -> CliResult<()> {
    let mut manager = ConfigManager::new();
    let config_path = manager.get_config_path().display().to_string();

    match command {
        ConfigCommand::Get { key } => {
            let value = manager
                .get(&key)
                .map_err(|e| CliError::misuse(&format!("{e:#}")))?;
            println!("{}", display_value(&key, &value));
        }
        ConfigCommand::Set { key, value } => {
            manager.set(&key, &value).map_err(|e| {
                match e.downcast::<std::io::Error>() {
                    Ok(io_error) => CliError::from_io_error(io_error, &config_path),
                    Err(e) => CliError::misuse(&format!("{e:#}")),
                }
            })?;
            let shown = display_value(&key, &value);
            eprintln!("{}", format!("Set {key} = {shown}").green());
            eprintln!("Configuration saved to: {config_path}");
        }
        ConfigCommand::List => {
            let items = manager
                .list()
                .map_err(|e| CliError::misuse(&format!("{e:#}")))?;

            eprintln!("{}", "Configuration:".bold().blue());
            eprintln!("Config file: {config_path}");
            eprintln!();

            let mut sections: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
            for (key, value) in items {
                let (section, field) = key.split_once('.').unwrap_or(("general", &key));
                sections
                    .entry(section.to_string())
                    .or_default()
                    .push((field.to_string(), value));
            }

            for (section, items) in sections {
                println!("[{}]", section.yellow());
                for (key, value) in items {
                    println!("  {} = {}", key.cyan(), value);
                }
                println!();
            }
        }
        ConfigCommand::Path => {
            println!("{config_path}");
        }
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
