//! Result type alias for cloudmask
//!
//! Convenience alias using [`CloudMaskError`](super::errors::CloudMaskError) as the error type.

use super::errors::CloudMaskError;

/// Result type alias for cloudmask operations
///
/// # Examples
///
/// ```
/// use cloudmask::domain::result::Result;
/// use cloudmask::domain::errors::CloudMaskError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CloudMaskError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CloudMaskError>;
