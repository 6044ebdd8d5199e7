//! Domain types shared across cloudmask.
//!
//! - **Error types** ([`CloudMaskError`])
//! - **Result type alias** ([`Result`])

pub mod errors;
pub mod result;

pub use errors::CloudMaskError;
pub use result::Result;
