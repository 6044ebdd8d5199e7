//! Validate config command implementation
//!
//! Loads the configuration file, validates it and builds an engine from it,
//! which also compiles custom patterns and the pattern library.

use super::{EXIT_CONFIG_ERROR, EXIT_OK};
use crate::anonymization::{AnonymizationEngine, PatternCategory};
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let engine = match AnonymizationEngine::new(config.anonymization.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                println!("Anonymization settings are invalid");
                println!("   Error: {e:#}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let enabled: Vec<String> = PatternCategory::ALL
            .iter()
            .filter(|category| config.anonymization.is_enabled(**category))
            .map(|category| category.to_string())
            .collect();

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Strategy: {}", engine.strategy_name());
        println!("  Enabled Categories: {}", enabled.join(", "));
        println!(
            "  Custom Patterns: {}",
            config.anonymization.custom_patterns.len()
        );
        if let Some(library) = &config.anonymization.pattern_library {
            println!("  Pattern Library: {}", library.display());
        }
        println!("  Audit Log: {}", config.anonymization.audit.enabled);
        println!("  File Logging: {}", config.logging.local_enabled);

        Ok(EXIT_OK)
    }
}
