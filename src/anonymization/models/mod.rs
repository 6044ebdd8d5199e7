//! Data models for structured anonymization

pub mod result;
pub mod value;

pub use result::AnonymizedResult;
pub use value::{ArrayRef, DataValue, ObjectRef, CIRCULAR_REFERENCE};
