//! Audit logger for anonymization operations

use crate::anonymization::config::AuditConfig;
use crate::anonymization::mapping::MappingSnapshot;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    operation: String,
    strategy: String,
    mappings_count: usize,
    mappings: Vec<AuditMapping>,
}

/// One mapping, with the original hashed
#[derive(Debug, Serialize)]
struct AuditMapping {
    /// SHA-256 hash of the original identifier (never log plaintext)
    original_hash: String,
    anonymized: String,
}

/// Append-only log of anonymization operations
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(config.log_path.clone(), config.json_format, config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record one operation together with the mappings it produced
    pub fn log_operation(
        &self,
        operation: &str,
        strategy: &str,
        mappings: &MappingSnapshot,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            operation: operation.to_string(),
            strategy: strategy.to_string(),
            mappings_count: mappings.len(),
            mappings: mappings
                .iter()
                .map(|(original, anonymized)| AuditMapping {
                    original_hash: hash_value(original),
                    anonymized: anonymized.clone(),
                })
                .collect(),
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Operation: {} | Strategy: {} | Mappings: {}",
                entry.timestamp, entry.operation, entry.strategy, entry.mappings_count
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    format!("{digest:x}")
}
