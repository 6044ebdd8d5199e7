//! Anonymization of cloud network identifiers
//!
//! This module rewrites IP addresses, account IDs, resource IDs and IAM
//! principal names found in free text or in nested value trees, while keeping
//! their shape recognizable.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Detection**: ordered regex categories ([`detector`])
//! - **Replacement**: structure-preserving or sequential strategies ([`anonymizer`])
//! - **Mapping store**: memoized original to replacement table ([`mapping`])
//! - **Value processing**: cycle-safe traversal of value trees ([`processor`])
//! - **Audit**: hashed record of applied mappings ([`audit`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use cloudmask::anonymization::{AnonymizationEngine, AnonymizationConfig};
//!
//! let mut engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//! let text = engine.anonymize_text("sg-0123abcd allows 10.1.2.3")?;
//! ```

pub mod anonymizer;
pub mod audit;
pub mod config;
pub mod detector;
pub mod engine;
pub mod mapping;
pub mod models;
pub mod processor;
pub mod report;

// Re-export main types
pub use config::{AnonymizationConfig, CustomRule, Replacement};
pub use detector::patterns::PatternCategory;
pub use engine::AnonymizationEngine;
pub use mapping::{MappingSnapshot, MappingState, MappingStore};
pub use models::{AnonymizedResult, DataValue, CIRCULAR_REFERENCE};
pub use report::AnonymizationReport;
