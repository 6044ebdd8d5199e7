//! Domain error types
//!
//! Error hierarchy for cloudmask. Variants carry rendered messages rather than
//! third-party error types so they stay stable across dependency upgrades.

use thiserror::Error;

/// Main cloudmask error type
#[derive(Debug, Error)]
pub enum CloudMaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A configuration parsed but holds invalid values
    #[error("Validation error: {0}")]
    Validation(String),

    /// A mapping import could not be parsed; the store was left untouched
    #[error("Failed to import mappings: {0}")]
    Import(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CloudMaskError {
    fn from(err: std::io::Error) -> Self {
        CloudMaskError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CloudMaskError {
    fn from(err: serde_json::Error) -> Self {
        CloudMaskError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for CloudMaskError {
    fn from(err: toml::de::Error) -> Self {
        CloudMaskError::Configuration(format!("TOML parse error: {err}"))
    }
}
