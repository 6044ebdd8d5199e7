//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Console output on stderr
//! - Optional JSON file logging with rotation
//! - Level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use cloudmask::logging::init_logging;
//! use cloudmask::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the completion of an anonymization operation
///
/// # Example
///
/// ```no_run
/// use cloudmask::log_anonymization_complete;
/// use std::time::Duration;
///
/// log_anonymization_complete!("anonymize_data", 12, Duration::from_millis(3));
/// ```
#[macro_export]
macro_rules! log_anonymization_complete {
    ($operation:expr, $mappings:expr, $duration:expr) => {
        tracing::info!(
            operation = $operation,
            mappings = $mappings,
            duration_ms = $duration.as_millis() as u64,
            "Anonymization completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cloudmask::log_error_with_context;
/// use cloudmask::domain::CloudMaskError;
///
/// let error = CloudMaskError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
