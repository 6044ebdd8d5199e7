//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for cloudmask using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// cloudmask - anonymize cloud network identifiers
#[derive(Parser, Debug)]
#[command(name = "cloudmask")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply if it does not exist)
    #[arg(short, long, default_value = "cloudmask.toml", env = "CLOUDMASK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CLOUDMASK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Print an anonymization summary to stderr
    #[arg(long, global = true)]
    pub report: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize free text
    Text(commands::text::TextArgs),

    /// Anonymize a JSON document, starting from an empty mapping store
    Data(commands::data::DataArgs),

    /// Anonymize a JSON array of flow-log records
    FlowLogs(commands::flow_logs::FlowLogsArgs),

    /// Anonymize a network topology JSON document
    Topology(commands::topology::TopologyArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_text() {
        let cli = Cli::parse_from(["cloudmask", "text"]);
        assert_eq!(cli.config, "cloudmask.toml");
        assert!(matches!(cli.command, Commands::Text(_)));
        assert!(!cli.report);
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["cloudmask", "--config", "custom.toml", "data"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Data(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["cloudmask", "--log-level", "debug", "topology"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_report_after_subcommand() {
        let cli = Cli::parse_from(["cloudmask", "flow-logs", "--report"]);
        assert!(cli.report);
        assert!(matches!(cli.command, Commands::FlowLogs(_)));
    }

    #[test]
    fn test_cli_parse_engine_args() {
        let cli = Cli::parse_from([
            "cloudmask",
            "text",
            "--sequential",
            "--salt",
            "pepper",
            "--mappings-out",
            "map.json",
            "-i",
            "in.txt",
        ]);
        let Commands::Text(args) = cli.command else {
            panic!("expected text command");
        };
        assert!(args.engine.sequential);
        assert_eq!(args.engine.salt.as_deref(), Some("pepper"));
        assert_eq!(
            args.engine.mappings_out.as_deref(),
            Some(std::path::Path::new("map.json"))
        );
        assert_eq!(args.io.input.as_deref(), Some(std::path::Path::new("in.txt")));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["cloudmask", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["cloudmask", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
