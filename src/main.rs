//! movieinfo: configuration and logging toolkit
//!
//! Command-line consumer of the `movieinfo` library: validates and inspects
//! configuration files and emits records through the configured logger.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::path::Path;

use cli::{Cli, Commands};
use movieinfo::config::{ConfigLoader, ConfigManager, ConfigSummary};
use movieinfo::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(ConfigLoader::default_path);

    match cli.command {
        Commands::Init { path } => init(&path.unwrap_or(config_path), cli.quiet),
        Commands::Version => {
            println!("movieinfo {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => run(command, &config_path, cli.quiet),
    }
}

fn init(path: &Path, quiet: bool) -> Result<()> {
    ConfigLoader::generate_at(path)?;
    if !quiet {
        eprintln!("Configuration file created at: {}", path.display());
    }
    Ok(())
}

/// Execute a command that needs the loaded configuration.
fn run(command: Commands, config_path: &Path, quiet: bool) -> Result<()> {
    let manager = ConfigManager::new(config_path)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
    logger::init(&manager.log_config()).context("Failed to initialize logger")?;

    match command {
        Commands::Check => {
            logger::with_field("path", config_path.display().to_string())
                .info("Configuration is valid");
            if !quiet {
                eprintln!("Configuration is valid.");
            }
        }
        Commands::Show => {
            print!("{}", ConfigSummary(&manager.get()));
        }
        Commands::Dsn => {
            println!("{}", manager.dsn());
            println!("{}", manager.cache_address());
        }
        Commands::Log {
            level,
            fields,
            message,
        } => {
            let record_logger = fields
                .into_iter()
                .fold(logger::logger(), |logger, (key, value)| {
                    logger.with_field(key, field_value(&value))
                });
            record_logger.log(level.into(), message);
        }
        Commands::Init { .. } | Commands::Version => {}
    }

    Ok(())
}

/// Numbers and booleans keep their JSON type; everything else is a string.
fn field_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
