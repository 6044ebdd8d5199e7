//! CLI command implementations
//!
//! Anonymizing commands share [`common::IoArgs`] for input/output and
//! [`common::EngineArgs`] for engine overrides and mapping files.

pub mod common;
pub mod data;
pub mod flow_logs;
pub mod init;
pub mod text;
pub mod topology;
pub mod validate;

/// Successful run
pub const EXIT_OK: i32 = 0;
/// Configuration could not be loaded or is invalid
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Any other failure
pub const EXIT_FATAL: i32 = 5;
