//! Per-call anonymization report
//!
//! Counts what the last engine call rewrote, per category, so the CLI can
//! print a summary without ever showing original values.

use crate::anonymization::detector::patterns::PatternCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics for the most recent engine call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationReport {
    /// Matches rewritten per built-in category
    pub matches_by_category: BTreeMap<PatternCategory, usize>,

    /// Matches rewritten by custom rules
    pub custom_rule_matches: usize,

    /// String leaves (and keys) run through the text pipeline
    pub strings_processed: usize,

    /// Back edges replaced by the circular-reference sentinel
    pub circular_references: usize,

    /// Object entries lost because a rewritten key matched another key
    #[serde(default)]
    pub key_collisions: usize,
}

impl AnonymizationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` matches for `category`
    pub fn record(&mut self, category: PatternCategory, count: usize) {
        if count == 0 {
            return;
        }
        *self.matches_by_category.entry(category).or_insert(0) += count;
    }

    pub fn record_custom(&mut self, count: usize) {
        self.custom_rule_matches += count;
    }

    /// Total matches rewritten, built-in and custom
    pub fn total_matches(&self) -> usize {
        self.matches_by_category.values().sum::<usize>() + self.custom_rule_matches
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push_str("Anonymization summary\n");
        output.push_str(&format!("  Strings processed:   {}\n", self.strings_processed));
        output.push_str(&format!("  Total matches:       {}\n", self.total_matches()));

        let mut categories: Vec<_> = self.matches_by_category.iter().collect();
        categories.sort_by(|a, b| b.1.cmp(a.1));
        for (category, count) in categories {
            output.push_str(&format!("    {:20} {:>6}\n", category.to_string(), count));
        }

        if self.custom_rule_matches > 0 {
            output.push_str(&format!(
                "    {:20} {:>6}\n",
                "custom_rules", self.custom_rule_matches
            ));
        }
        if self.circular_references > 0 {
            output.push_str(&format!(
                "  Circular references: {}\n",
                self.circular_references
            ));
        }
        if self.key_collisions > 0 {
            output.push_str(&format!("  Key collisions:      {}
", self.key_collisions));
        }

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
