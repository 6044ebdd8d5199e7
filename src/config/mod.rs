//! Configuration management for cloudmask.
//!
//! # Overview
//!
//! cloudmask reads an optional TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - `CLOUDMASK_*` environment overrides
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [anonymization]
//! anonymize_ips = true
//! anonymize_iam_user_names = true
//! preserve_structure = true
//! salt_value = "${CLOUDMASK_SALT_SECRET}"
//!
//! [[anonymization.custom_patterns]]
//! pattern = "corp-[a-z]+"
//! replacement = "corp-host"
//!
//! [anonymization.audit]
//! enabled = true
//! log_path = "./audit/cloudmask.log"
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! local_rotation = "daily"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{ApplicationConfig, CloudMaskConfig, LoggingConfig};
