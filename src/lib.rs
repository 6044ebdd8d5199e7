// cloudmask - anonymization of cloud network identifiers
// Copyright (c) 2025 cloudmask Contributors
// Licensed under the MIT License

//! # cloudmask
//!
//! cloudmask rewrites sensitive infrastructure identifiers (IP addresses,
//! account IDs, resource IDs, IAM principal names) in free text and in nested
//! structured data, so logs, exports and screenshots can be shared without
//! leaking them. Replacements keep the shape of the original, so the result
//! stays useful for debugging.
//!
//! ## Architecture
//!
//! - [`anonymization`] - Detection, replacement, mapping store and value traversal
//! - [`cli`] - Command-line interface and argument parsing
//! - [`domain`] - Error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cloudmask::anonymization::{AnonymizationConfig, AnonymizationEngine};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//! let first = engine.anonymize_text("Connection from 192.168.1.100")?;
//! let second = engine.anonymize_text("Response to 192.168.1.100")?;
//! // Both calls use the same replacement for 192.168.1.100
//!
//! let exported = engine.export_mappings()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Replacement strategies
//!
//! - **Structure-preserving** (default): derived from `sha256(original + salt)`;
//!   `i-1234567890abcdef0` becomes `i-` plus 8 hex digits, IPv4 addresses land
//!   in `10.0.0.0/8`, account IDs stay 12 digits.
//! - **Sequential**: `instance-001`, `instance-002`, numbered per mapping store.
//!
//! ## Error Handling
//!
//! Domain errors use [`domain::CloudMaskError`]; engine operations return
//! `anyhow::Result` so caller-supplied replacement callbacks can fail with
//! their own error types.

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
