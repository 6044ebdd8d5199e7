//! Shared arguments and helpers for the anonymizing commands

use crate::anonymization::{AnonymizationEngine, AnonymizationReport, DataValue};
use crate::config::{load_config, load_config_str, CloudMaskConfig};
use crate::domain::Result as DomainResult;
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Input and output locations
#[derive(Args, Debug, Default)]
pub struct IoArgs {
    /// Read input from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write output to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl IoArgs {
    pub fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display())),
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read stdin")?;
                Ok(buf)
            }
        }
    }

    /// Parse the input as JSON
    pub fn read_json(&self) -> Result<serde_json::Value> {
        let raw = self.read_input()?;
        serde_json::from_str(&raw).context("Input is not valid JSON")
    }

    pub fn write_output(&self, content: &str) -> Result<()> {
        match &self.output {
            Some(path) => fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display())),
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
                Ok(())
            }
        }
    }

    /// Pretty-print a value tree as JSON
    pub fn write_value(&self, value: &DataValue) -> Result<()> {
        let rendered = serde_json::to_string_pretty(&value.to_json())?;
        self.write_output(&rendered)
    }
}

/// Engine overrides and mapping files
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// Salt for structure-preserving replacements (overrides configuration)
    #[arg(long, value_name = "SALT")]
    pub salt: Option<String>,

    /// Use sequential replacements (prefix-001, prefix-002, ...)
    #[arg(long)]
    pub sequential: bool,

    /// Load mappings exported by a previous run before anonymizing
    #[arg(long, value_name = "FILE")]
    pub mappings_in: Option<PathBuf>,

    /// Export the mapping store to this file after anonymizing
    #[arg(long, value_name = "FILE")]
    pub mappings_out: Option<PathBuf>,
}

impl EngineArgs {
    /// Build an engine from configuration plus command-line overrides
    pub fn build_engine(&self, config: &CloudMaskConfig) -> Result<AnonymizationEngine> {
        let mut anonymization = config.anonymization.clone();
        if let Some(salt) = &self.salt {
            anonymization.salt_value = salt.clone();
        }
        if self.sequential {
            anonymization.preserve_structure = false;
        }

        AnonymizationEngine::new(anonymization)
    }

    /// Import `--mappings-in`, if given
    pub fn import_mappings(&self, engine: &mut AnonymizationEngine) -> Result<()> {
        if let Some(path) = &self.mappings_in {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read mappings file: {}", path.display()))?;
            let count = engine.import_mappings(&raw)?;
            tracing::info!(path = %path.display(), count, "Loaded mappings");
        }
        Ok(())
    }

    /// Export to `--mappings-out`, if given
    pub fn export_mappings(&self, engine: &AnonymizationEngine) -> Result<()> {
        if let Some(path) = &self.mappings_out {
            let exported = engine.export_mappings()?;
            fs::write(path, exported)
                .with_context(|| format!("Failed to write mappings file: {}", path.display()))?;
            tracing::info!(path = %path.display(), "Saved mappings");
        }
        Ok(())
    }
}

/// Load the configuration file, or defaults when it does not exist
pub fn load_cli_config(path: &str) -> DomainResult<CloudMaskConfig> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        tracing::debug!(config_path = %path, "Configuration file not found, using defaults");
        load_config_str("")
    }
}

pub fn print_report(report: &AnonymizationReport) {
    eprint!("{}", report.format_console());
}
