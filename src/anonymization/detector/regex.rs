//! Regex-based identifier detector

use super::{
    patterns::{PatternCategory, PatternRegistry},
    IdentifierDetector,
};
use anyhow::Result;
use std::ops::Range;
use std::sync::Arc;

/// Regex-based identifier detector
pub struct RegexDetector {
    pattern_registry: Arc<PatternRegistry>,
}

impl RegexDetector {
    /// Create a new regex detector with the built-in patterns
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self::with_registry(registry))
    }

    /// Create a new regex detector over an existing registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.pattern_registry
    }
}

impl IdentifierDetector for RegexDetector {
    fn detect(&self, category: PatternCategory, text: &str) -> Vec<Range<usize>> {
        let Some(pattern) = self.pattern_registry.pattern_for(category) else {
            return Vec::new();
        };

        let mut spans = Vec::new();
        for found in pattern.regex.find_iter(text) {
            match found {
                Ok(m) => spans.push(m.start()..m.end()),
                Err(e) => {
                    // Backtracking limits only; keep what was found so far
                    tracing::warn!(category = %category, error = %e, "Pattern matching aborted");
                    break;
                }
            }
        }
        spans
    }

    fn looks_like_identifier(&self, text: &str) -> bool {
        self.pattern_registry.matches_identifier(text)
    }
}
