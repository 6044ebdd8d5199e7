//! Recursive value processor
//!
//! Walks a [`DataValue`] tree and hands every string leaf (and every object
//! key that looks like a literal identifier) to a [`TextAnonymizer`]. The
//! output is built from fresh containers, so the input is never mutated.

use crate::anonymization::models::{DataValue, CIRCULAR_REFERENCE};
use crate::anonymization::models::value::OpenAncestors;
use anyhow::Result;
use regex::Regex;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::LazyLock;

static SENSITIVE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(id|key|token|secret|password|credential)$")
        .expect("sensitive key pattern is valid")
});

/// Text pipeline the processor delegates string leaves to
pub trait TextAnonymizer {
    /// Anonymize one string
    fn anonymize_str(&mut self, text: &str) -> Result<String>;

    /// Check if `text` matches a resource-ID or account-ID pattern
    fn looks_like_identifier(&self, text: &str) -> bool;
}

/// Check if a key name ends like a credential or identifier field
pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY.is_match(key)
}

/// Per-call traversal state
#[derive(Debug, Default)]
pub struct ValueProcessor {
    open: OpenAncestors,
    circular_references: usize,
    key_collisions: usize,
}

impl ValueProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of back edges replaced by the circular-reference sentinel
    pub fn circular_references(&self) -> usize {
        self.circular_references
    }

    /// Number of entries dropped because a rewritten key matched another key
    pub fn key_collisions(&self) -> usize {
        self.key_collisions
    }

    /// Produce an anonymized copy of `value`
    pub fn process(
        &mut self,
        value: &DataValue,
        anonymizer: &mut dyn TextAnonymizer,
    ) -> Result<DataValue> {
        match value {
            DataValue::Null | DataValue::Bool(_) | DataValue::Number(_) | DataValue::Date(_) => {
                Ok(value.clone())
            }
            DataValue::String(text) => Ok(DataValue::String(anonymizer.anonymize_str(text)?)),
            DataValue::Array(items) => {
                let id = Rc::as_ptr(items) as *const () as usize;
                if !self.open.enter(id) {
                    return Ok(self.circular());
                }

                // Rc clones only; keeps the borrow short while children recurse
                let children: Vec<DataValue> = items.borrow().clone();
                let mut out = Vec::with_capacity(children.len());
                for child in &children {
                    match self.process(child, anonymizer) {
                        Ok(processed) => out.push(processed),
                        Err(e) => {
                            self.open.leave(id);
                            return Err(e);
                        }
                    }
                }

                self.open.leave(id);
                Ok(DataValue::Array(Rc::new(RefCell::new(out))))
            }
            DataValue::Object(map) => {
                let id = Rc::as_ptr(map) as *const () as usize;
                if !self.open.enter(id) {
                    return Ok(self.circular());
                }

                let entries: Vec<(String, DataValue)> = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();

                let result = self.process_entries(&entries, anonymizer);
                self.open.leave(id);

                Ok(DataValue::Object(Rc::new(RefCell::new(result?))))
            }
        }
    }

    fn process_entries(
        &mut self,
        entries: &[(String, DataValue)],
        anonymizer: &mut dyn TextAnonymizer,
    ) -> Result<BTreeMap<String, DataValue>> {
        let mut out = BTreeMap::new();
        for (key, child) in entries {
            let new_key = if is_sensitive_key(key) && anonymizer.looks_like_identifier(key) {
                anonymizer.anonymize_str(key)?
            } else {
                key.clone()
            };
            let processed = self.process(child, anonymizer)?;
            // Later entries win; keys are visited in sorted order
            if out.insert(new_key, processed).is_some() {
                self.key_collisions += 1;
                tracing::warn!(
                    depth = self.open.depth(),
                    "Rewritten object key collided with an existing key, earlier entry dropped"
                );
            }
        }
        Ok(out)
    }

    fn circular(&mut self) -> DataValue {
        self.circular_references += 1;
        tracing::debug!(
            depth = self.open.depth(),
            "Circular reference replaced with sentinel"
        );
        DataValue::String(CIRCULAR_REFERENCE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    /// Upper-cases strings and treats anything starting with "vpc-" as an identifier
    struct Upper {
        calls: usize,
    }

    impl TextAnonymizer for Upper {
        fn anonymize_str(&mut self, text: &str) -> Result<String> {
            self.calls += 1;
            Ok(text.to_uppercase())
        }

        fn looks_like_identifier(&self, text: &str) -> bool {
            text.starts_with("vpc-")
        }
    }

    struct Failing;

    impl TextAnonymizer for Failing {
        fn anonymize_str(&mut self, _text: &str) -> Result<String> {
            anyhow::bail!("pipeline failed")
        }

        fn looks_like_identifier(&self, _text: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_sensitive_key_heuristic() {
        assert!(is_sensitive_key("instanceId"));
        assert!(is_sensitive_key("API_KEY"));
        assert!(is_sensitive_key("sessionToken"));
        assert!(is_sensitive_key("db_password"));
        assert!(!is_sensitive_key("cidr"));
        assert!(!is_sensitive_key("identity"));
    }

    #[test]
    fn test_scalars_pass_through() {
        let mut anonymizer = Upper { calls: 0 };
        let mut processor = ValueProcessor::new();
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let input = DataValue::array([
            DataValue::Null,
            DataValue::from(true),
            DataValue::from(42_i64),
            DataValue::from(date),
        ]);
        let output = processor.process(&input, &mut anonymizer).unwrap();

        assert_eq!(output.to_json(), input.to_json());
        assert_eq!(anonymizer.calls, 0);
    }

    #[test]
    fn test_strings_and_keys() {
        let mut anonymizer = Upper { calls: 0 };
        let mut processor = ValueProcessor::new();

        let input = DataValue::from(json!({
            "vpcId": "vpc-abc",
            "vpc-1234id": "x",
            "name": "web"
        }));
        let output = processor.process(&input, &mut anonymizer).unwrap();

        assert_eq!(
            output.to_json(),
            json!({"vpcId": "VPC-ABC", "VPC-1234ID": "X", "name": "WEB"})
        );
    }

    #[test]
    fn test_key_collision_is_counted() {
        let mut anonymizer = Upper { calls: 0 };
        let mut processor = ValueProcessor::new();

        let input = DataValue::from(json!({"VPC-1ID": 2, "vpc-1id": 1}));
        let output = processor.process(&input, &mut anonymizer).unwrap();

        assert_eq!(output.to_json(), json!({"VPC-1ID": 1}));
        assert_eq!(processor.key_collisions(), 1);
    }

    #[test]
    fn test_output_is_fresh() {
        let mut anonymizer = Upper { calls: 0 };
        let mut processor = ValueProcessor::new();

        let input = DataValue::from(json!({"a": ["b"]}));
        let output = processor.process(&input, &mut anonymizer).unwrap();

        assert_ne!(output.container_id(), input.container_id());
        assert_eq!(input.to_json(), json!({"a": ["b"]}));
    }

    #[test]
    fn test_cycle_is_replaced_with_sentinel() {
        let mut anonymizer = Upper { calls: 0 };
        let mut processor = ValueProcessor::new();

        let root = DataValue::from(json!({"name": "root"}));
        root.insert("self", root.clone());

        let output = processor.process(&root, &mut anonymizer).unwrap();
        assert_eq!(
            output.to_json(),
            json!({"name": "ROOT", "self": CIRCULAR_REFERENCE})
        );
        assert_eq!(processor.circular_references(), 1);

        // Break the cycle so the Rc graph can be dropped
        if let DataValue::Object(map) = &root {
            map.borrow_mut().remove("self");
        }
    }

    #[test]
    fn test_shared_subtree_is_not_a_cycle() {
        let mut anonymizer = Upper { calls: 0 };
        let mut processor = ValueProcessor::new();

        let shared = DataValue::from(json!({"v": "x"}));
        let root = DataValue::object([("a", shared.clone()), ("b", shared)]);

        let output = processor.process(&root, &mut anonymizer).unwrap();
        assert_eq!(output.to_json(), json!({"a": {"v": "X"}, "b": {"v": "X"}}));
        assert_eq!(processor.circular_references(), 0);
    }

    #[test]
    fn test_errors_propagate() {
        let mut processor = ValueProcessor::new();
        let input = DataValue::from(json!({"a": ["b"]}));

        let err = processor.process(&input, &mut Failing).unwrap_err();
        assert_eq!(err.to_string(), "pipeline failed");
    }
}
