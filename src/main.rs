// cloudmask - anonymization of cloud network identifiers
// Copyright (c) 2025 cloudmask Contributors
// Licensed under the MIT License

use cloudmask::cli::commands::common::load_cli_config;
use cloudmask::cli::commands::{EXIT_CONFIG_ERROR, EXIT_FATAL};
use cloudmask::cli::{Cli, Commands};
use cloudmask::config::CloudMaskConfig;
use cloudmask::logging::init_logging;
use clap::Parser;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // validate-config reports its own load errors
    let config = if matches!(cli.command, Commands::ValidateConfig(_)) {
        CloudMaskConfig::default()
    } else {
        match load_cli_config(&cli.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(EXIT_CONFIG_ERROR);
            }
        }
    };

    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.application.log_level);
    let guard = match init_logging(log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "cloudmask starting");

    let exit_code = match execute_command(&cli, &config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
fn execute_command(cli: &Cli, config: &CloudMaskConfig) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Text(args) => args.execute(config, cli.report),
        Commands::Data(args) => args.execute(config, cli.report),
        Commands::FlowLogs(args) => args.execute(config, cli.report),
        Commands::Topology(args) => args.execute(config, cli.report),
        Commands::ValidateConfig(args) => args.execute(&cli.config),
        Commands::Init(args) => args.execute(),
    }
}
