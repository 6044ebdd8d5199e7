//! Sequential replacement strategy
//!
//! Produces `<prefix>-001`, `<prefix>-002`, ... numbered by how many values
//! with the same prefix the mapping store already holds.

use super::ReplacementStrategy;
use crate::anonymization::mapping::MappingStore;

/// Counter-based replacements
pub struct SequentialStrategy;

impl SequentialStrategy {
    /// Create a new sequential strategy
    pub fn new() -> Self {
        Self
    }
}

impl ReplacementStrategy for SequentialStrategy {
    fn generate(&self, _original: &str, prefix: &str, store: &MappingStore) -> String {
        let n = store.count_with_prefix(prefix) + 1;
        format!("{prefix}-{n:03}")
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

impl Default for SequentialStrategy {
    fn default() -> Self {
        Self::new()
    }
}
