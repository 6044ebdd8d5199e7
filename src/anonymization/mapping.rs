//! Mapping store
//!
//! Remembers which replacement was handed out for each original substring so
//! that repeated occurrences stay consistent within one mapping lifetime. The
//! store can be exported as a JSON object and imported again later.

use crate::domain::{CloudMaskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Point-in-time copy of the mapping store (original -> anonymized)
pub type MappingSnapshot = BTreeMap<String, String>;

/// Whether the store currently holds any mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingState {
    Empty,
    Populated,
}

/// Original substring -> anonymized replacement table
#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    entries: HashMap<String, String>,
}

impl MappingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replacement previously recorded for `original`
    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// Record a replacement, overwriting any previous one for the same original
    pub fn insert(&mut self, original: impl Into<String>, anonymized: impl Into<String>) {
        self.entries.insert(original.into(), anonymized.into());
    }

    /// Number of replacements whose value starts with `"{prefix}-"`
    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        let needle = format!("{prefix}-");
        self.entries
            .values()
            .filter(|value| value.starts_with(&needle))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self) -> MappingState {
        if self.entries.is_empty() {
            MappingState::Empty
        } else {
            MappingState::Populated
        }
    }

    /// Iterate over the recorded originals
    pub fn originals(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Copy of the current contents, detached from the store
    pub fn snapshot(&self) -> MappingSnapshot {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Remove every mapping
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Serialize the store as a JSON object string
    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Replace the whole store with the mappings encoded in `text`.
    ///
    /// `text` must be a JSON object whose values are strings. Values are taken
    /// as-is. On any parse failure the current contents stay untouched.
    /// Returns the number of imported mappings.
    pub fn import(&mut self, text: &str) -> Result<usize> {
        let parsed: HashMap<String, String> =
            serde_json::from_str(text).map_err(|e| CloudMaskError::Import(e.to_string()))?;

        let count = parsed.len();
        self.entries = parsed;
        Ok(count)
    }
}
