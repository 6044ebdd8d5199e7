//! Result of a structured anonymization call

use super::value::DataValue;
use crate::anonymization::mapping::MappingSnapshot;
use serde::Serialize;

/// Input, output and the mappings applied by one structured call
#[derive(Debug, Clone, Serialize)]
pub struct AnonymizedResult {
    /// The value that was submitted, unchanged
    pub original: DataValue,
    /// Anonymized copy of `original`
    pub anonymized: DataValue,
    /// Mapping store contents at the end of the call
    pub mappings: MappingSnapshot,
}

impl AnonymizedResult {
    /// Number of mappings applied
    pub fn total_mappings(&self) -> usize {
        self.mappings.len()
    }

    /// Check if anything was rewritten
    pub fn has_mappings(&self) -> bool {
        !self.mappings.is_empty()
    }
}
