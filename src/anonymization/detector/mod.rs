//! Identifier detection module
//!
//! Provides the trait-based detection interface and the regex implementation
//! used to locate cloud identifiers in text.

pub mod patterns;
pub mod regex;

use patterns::PatternCategory;
use std::ops::Range;

/// Trait for identifier detection implementations
pub trait IdentifierDetector: Send + Sync {
    /// Byte ranges of every match of `category` in `text`, ascending and non-overlapping
    fn detect(&self, category: PatternCategory, text: &str) -> Vec<Range<usize>>;

    /// Whether `text` contains a resource ID or an account ID
    fn looks_like_identifier(&self, text: &str) -> bool;
}
