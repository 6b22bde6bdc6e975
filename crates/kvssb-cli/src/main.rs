mod report;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use kvssb_core::config::{Config, KEYS};
use kvssb_core::scenario::{DEFAULT_MAX_TICKS, Replay, Scenario};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Overrides the log filter, e.g. `KVSSB_LOG=kvssb_core=trace`
const LOG_ENV: &str = "KVSSB_LOG";

#[derive(Parser, Debug)]
#[command(name = "kvssb")]
#[command(author, version, about = "Replay scroll and visibility streams against the KVSSB page state")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log synchronizer decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a scenario file and print the resulting effects
    Replay {
        /// Scenario TOML file
        scenario: PathBuf,

        /// Print one JSON object per effect, then the summary
        #[arg(long)]
        json: bool,

        /// Give up if counters need more timer ticks than this
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        max_ticks: usize,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Set a configuration value
    Set {
        /// The key to set (see `kvssb config show`)
        key: String,
        /// The value to set
        value: String,
    },
    /// Get a configuration value
    Get {
        /// The key to get
        key: String,
    },
    /// Show every configuration value
    Show,
    /// Show the config file path
    Path,
    /// Reset a configuration value to its default
    Clear {
        /// The key to clear
        key: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Replay {
            scenario,
            json,
            max_ticks,
        } => run_replay(&scenario, json, max_ticks),
        Commands::Config { action } => handle_config(action),
    }
}

/// Logging stays off unless asked for, so stdout and stderr carry only
/// report output and warnings.
fn init_logging(verbose: bool) {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => return,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the config, telling the user if a corrupted file was set aside.
fn load_config() -> Result<Config> {
    let loaded = Config::load()?;
    if let Some(backup) = loaded.recovered {
        eprintln!(
            "{} config.toml is corrupted; moved to {}, using defaults.",
            "Warning:".yellow().bold(),
            backup.display()
        );
    }
    Ok(loaded.config)
}

fn run_replay(path: &Path, json: bool, max_ticks: usize) -> Result<()> {
    let config = load_config()?;
    let scenario = Scenario::load(path)?;
    debug!(
        events = scenario.events.len(),
        sections = scenario.sections.len(),
        "replaying scenario"
    );

    let report = Replay::run(&scenario, config.sync(), max_ticks)?;
    if json {
        report::print_json(&report)
    } else {
        report::print_human(&report);
        Ok(())
    }
}

fn display_key(key: &str) -> String {
    key.trim().replace('_', "-")
}

fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = load_config()?;
            config.set(&key, &value)?;
            config.save()?;
            println!(
                "{}",
                format!("{} set to: {}", display_key(&key), config.get(&key)?).green()
            );
        }
        ConfigAction::Get { key } => {
            let config = load_config()?;
            println!("{}: {}", display_key(&key), config.get(&key)?);
        }
        ConfigAction::Show => {
            let config = load_config()?;
            for key in KEYS {
                println!("{}: {}", key, config.get(key)?);
            }
        }
        ConfigAction::Path => {
            if let Some(path) = Config::path() {
                println!("{}", path.display());
            } else {
                bail!("Could not determine config path");
            }
        }
        ConfigAction::Clear { key } => {
            let mut config = load_config()?;
            config.clear(&key)?;
            config.save()?;
            println!(
                "{}",
                format!("{} reset to default: {}", display_key(&key), config.get(&key)?).green()
            );
        }
    }
    Ok(())
}
