//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Configuration and logging toolkit for the movieinfo service
#[derive(Parser)]
#[command(
    name = "movieinfo",
    version,
    about = "Configuration and logging toolkit for the movieinfo service",
    long_about = "Loads, validates and inspects movieinfo configuration files, \
                  and emits structured log records through the configured sink."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Level accepted by the `log` command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for movieinfo::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate configuration file
    Check,
    /// Print the configuration with secrets masked
    Show,
    /// Print the datastore DSN and cache address
    Dsn,
    /// Emit one record through the configured logger
    Log {
        /// Record level
        #[arg(long, short = 'l', value_enum, default_value = "info")]
        level: LogLevel,

        /// Structured field as key=value (repeatable)
        #[arg(long = "field", short = 'f', value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Record message
        message: String,
    },
    /// Generate sample configuration file
    Init {
        /// Path where to create the configuration file
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,
    },
    /// Display version information
    Version,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("user_id=42"),
            Ok(("user_id".to_string(), "42".to_string()))
        );
        assert_eq!(
            parse_field("query=a=b"),
            Ok(("query".to_string(), "a=b".to_string()))
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=v").is_err());
    }

    #[test]
    fn test_log_command_parsing() {
        let cli = Cli::try_parse_from([
            "movieinfo", "-c", "cfg.yaml", "log", "--level", "warn", "-f", "k=v", "hello",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.yaml")));
        match cli.command {
            Commands::Log {
                level,
                fields,
                message,
            } => {
                assert_eq!(level, LogLevel::Warn);
                assert_eq!(fields, vec![("k".to_string(), "v".to_string())]);
                assert_eq!(message, "hello");
            }
            _ => panic!("Expected log command"),
        }
    }
}
