//! Main anonymization engine
//!
//! This module provides the [`AnonymizationEngine`], which owns the mapping
//! store and ties the detector, the replacement strategy and the custom rules
//! together into one text pipeline.
//!
//! # Mapping lifetime
//!
//! [`anonymize_data`](AnonymizationEngine::anonymize_data) clears the mapping
//! store before it starts, so every structured call begins a fresh mapping
//! context. [`anonymize_text`](AnonymizationEngine::anonymize_text) never
//! clears it: successive text calls accumulate mappings and stay consistent
//! with each other. Callers mixing both APIs on one engine should keep this in
//! mind, or use [`clear_mappings`](AnonymizationEngine::clear_mappings)
//! explicitly.
//!
//! # Examples
//!
//! ```no_run
//! use cloudmask::anonymization::{AnonymizationEngine, AnonymizationConfig};
//! use serde_json::json;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//! let text = engine.anonymize_text("Connection from 192.168.1.100 to i-1234567890abcdef0")?;
//! println!("{text}");
//!
//! let result = engine.anonymize_json(json!({"vpc": {"id": "vpc-12345678"}}))?;
//! println!("{} mappings applied", result.total_mappings());
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    anonymizer::{
        create_mapping, sequential::SequentialStrategy, structure::StructurePreservingStrategy,
        ReplacementStrategy,
    },
    audit::AuditLogger,
    config::{AnonymizationConfig, CustomRule},
    detector::{
        patterns::{load_rule_library, PatternCategory},
        regex::RegexDetector,
        IdentifierDetector,
    },
    mapping::{MappingSnapshot, MappingState, MappingStore},
    models::{AnonymizedResult, DataValue},
    processor::{TextAnonymizer, ValueProcessor},
    report::AnonymizationReport,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

/// Main anonymization engine
///
/// Owns one [`MappingStore`]. The engine is single-threaded: callers sharing
/// an instance across threads must serialize access themselves (for example
/// with a `Mutex`), or construct one engine per unit of work.
pub struct AnonymizationEngine {
    config: AnonymizationConfig,
    detector: Arc<dyn IdentifierDetector>,
    strategy: Box<dyn ReplacementStrategy>,
    store: MappingStore,
    custom_rules: Vec<CustomRule>,
    audit_logger: Option<AuditLogger>,
    report: AnonymizationReport,
}

impl AnonymizationEngine {
    /// Create a new anonymization engine with the built-in regex detector
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - A custom pattern or the pattern library cannot be compiled
    /// - Audit logger initialization fails
    pub fn new(config: AnonymizationConfig) -> Result<Self> {
        let detector = Arc::new(RegexDetector::new()?);
        Self::with_detector(config, detector)
    }

    /// Create an engine around a caller-supplied detector
    pub fn with_detector(
        config: AnonymizationConfig,
        detector: Arc<dyn IdentifierDetector>,
    ) -> Result<Self> {
        config
            .validate()
            .context("Invalid anonymization configuration")?;

        let strategy: Box<dyn ReplacementStrategy> = if config.preserve_structure {
            Box::new(StructurePreservingStrategy::new(config.salt_value.clone()))
        } else {
            Box::new(SequentialStrategy::new())
        };

        let custom_rules = collect_custom_rules(&config)?;

        let audit_logger = if config.audit.enabled {
            Some(AuditLogger::from_config(&config.audit)?)
        } else {
            None
        };

        tracing::debug!(
            strategy = strategy.name(),
            custom_rules = custom_rules.len(),
            audit = audit_logger.is_some(),
            "Anonymization engine created"
        );

        Ok(Self {
            config,
            detector,
            strategy,
            store: MappingStore::new(),
            custom_rules,
            audit_logger,
            report: AnonymizationReport::new(),
        })
    }

    /// Anonymize free text.
    ///
    /// Does not clear the mapping store, so repeated identifiers map to the
    /// same replacement across calls.
    pub fn anonymize_text(&mut self, text: &str) -> Result<String> {
        self.report.reset();
        self.anonymize_str(text)
    }

    /// Anonymize a value tree, starting from an empty mapping store
    pub fn anonymize_data(&mut self, value: DataValue) -> Result<AnonymizedResult> {
        let start = Instant::now();
        self.store.clear();
        self.report.reset();

        let anonymized = self.process_value(&value)?;
        let mappings = self.store.snapshot();

        self.audit("anonymize_data", &mappings)?;
        crate::log_anonymization_complete!("anonymize_data", mappings.len(), start.elapsed());

        Ok(AnonymizedResult {
            original: value,
            anonymized,
            mappings,
        })
    }

    /// Convenience wrapper around [`anonymize_data`](Self::anonymize_data) for JSON input
    pub fn anonymize_json(&mut self, value: serde_json::Value) -> Result<AnonymizedResult> {
        self.anonymize_data(DataValue::from(value))
    }

    /// Anonymize each flow-log record.
    ///
    /// The mapping store is shared across records and is not cleared first.
    pub fn anonymize_flow_logs(&mut self, records: &[DataValue]) -> Result<Vec<DataValue>> {
        let start = Instant::now();
        self.report.reset();

        let anonymized = records
            .iter()
            .map(|record| self.process_value(record))
            .collect::<Result<Vec<_>>>()?;

        crate::log_anonymization_complete!("anonymize_flow_logs", self.store.len(), start.elapsed());
        Ok(anonymized)
    }

    /// Anonymize a network topology graph without clearing the mapping store
    pub fn anonymize_network_topology(&mut self, topology: &DataValue) -> Result<DataValue> {
        let start = Instant::now();
        self.report.reset();

        let anonymized = self.process_value(topology)?;

        crate::log_anonymization_complete!(
            "anonymize_network_topology",
            self.store.len(),
            start.elapsed()
        );
        Ok(anonymized)
    }

    /// Return the stored replacement for `original`, creating one if needed
    pub fn create_mapping(&mut self, original: &str, prefix: &str) -> String {
        create_mapping(self.strategy.as_ref(), &mut self.store, original, prefix)
    }

    /// Point-in-time copy of the mapping store
    pub fn get_mappings(&self) -> MappingSnapshot {
        self.store.snapshot()
    }

    pub fn clear_mappings(&mut self) {
        self.store.clear();
    }

    /// Serialize the mapping store as a JSON object string
    pub fn export_mappings(&self) -> Result<String> {
        Ok(self.store.export()?)
    }

    /// Replace the mapping store with the JSON object in `text`.
    ///
    /// On failure the store keeps its previous contents.
    pub fn import_mappings(&mut self, text: &str) -> Result<usize> {
        let count = match self.store.import(text) {
            Ok(count) => count,
            Err(e) => {
                crate::log_error_with_context!(&e, "Mapping import rejected");
                return Err(e.into());
            }
        };

        tracing::info!(count, "Imported mappings");
        let mappings = self.store.snapshot();
        self.audit("import_mappings", &mappings)?;
        Ok(count)
    }

    pub fn mapping_state(&self) -> MappingState {
        self.store.state()
    }

    pub fn config(&self) -> &AnonymizationConfig {
        &self.config
    }

    /// Statistics for the most recent call
    pub fn last_report(&self) -> &AnonymizationReport {
        &self.report
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    fn process_value(&mut self, value: &DataValue) -> Result<DataValue> {
        let mut processor = ValueProcessor::new();
        let anonymized = processor.process(value, self)?;
        self.report.circular_references += processor.circular_references();
        self.report.key_collisions += processor.key_collisions();
        Ok(anonymized)
    }

    /// Built-in categories in order, then custom rules in order
    fn run_pipeline(&mut self, text: &str) -> Result<String> {
        let mut current = text.to_string();

        for category in PatternCategory::ALL {
            if !self.config.is_enabled(category) {
                continue;
            }

            let spans = self.detector.detect(category, &current);
            if spans.is_empty() {
                continue;
            }

            let mut out = String::with_capacity(current.len());
            let mut last = 0;
            for span in &spans {
                out.push_str(&current[last..span.start]);
                let replacement = create_mapping(
                    self.strategy.as_ref(),
                    &mut self.store,
                    &current[span.clone()],
                    category.prefix(),
                );
                out.push_str(&replacement);
                last = span.end;
            }
            out.push_str(&current[last..]);

            self.report.record(category, spans.len());
            current = out;
        }

        for rule in &self.custom_rules {
            let (next, count) = rule.apply(&current)?;
            self.report.record_custom(count);
            current = next;
        }

        Ok(current)
    }

    fn audit(&self, operation: &str, mappings: &MappingSnapshot) -> Result<()> {
        if let Some(logger) = &self.audit_logger {
            logger.log_operation(operation, self.strategy.name(), mappings)?;
        }
        Ok(())
    }
}

impl TextAnonymizer for AnonymizationEngine {
    fn anonymize_str(&mut self, text: &str) -> Result<String> {
        self.report.strings_processed += 1;
        self.run_pipeline(text)
    }

    fn looks_like_identifier(&self, text: &str) -> bool {
        self.detector.looks_like_identifier(text)
    }
}

/// Programmatic rules, then `custom_patterns`, then the pattern library
fn collect_custom_rules(config: &AnonymizationConfig) -> Result<Vec<CustomRule>> {
    let mut rules = config.custom_rules.clone();

    for definition in &config.custom_patterns {
        rules.push(CustomRule::from_definition(definition)?);
    }

    if let Some(path) = &config.pattern_library {
        let definitions = load_rule_library(path)?;
        tracing::debug!(
            path = %path.display(),
            count = definitions.len(),
            "Loaded pattern library"
        );
        for definition in &definitions {
            rules.push(CustomRule::from_definition(definition)?);
        }
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::detector::patterns::CustomRuleDefinition;
    use crate::anonymization::models::CIRCULAR_REFERENCE;
    use regex::Regex;
    use serde_json::json;

    fn structure_engine() -> AnonymizationEngine {
        AnonymizationEngine::new(AnonymizationConfig::default()).unwrap()
    }

    fn sequential_engine() -> AnonymizationEngine {
        let config = AnonymizationConfig {
            preserve_structure: false,
            ..AnonymizationConfig::default()
        };
        AnonymizationEngine::new(config).unwrap()
    }

    fn token_after<'a>(text: &'a str, marker: &str) -> &'a str {
        let start = text.find(marker).unwrap() + marker.len();
        text[start..].split_whitespace().next().unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = structure_engine();
        assert_eq!(engine.strategy_name(), "structure_preserving");
        assert_eq!(engine.mapping_state(), MappingState::Empty);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnonymizationConfig {
            salt_value: String::new(),
            ..AnonymizationConfig::default()
        };
        let err = AnonymizationEngine::new(config).err().unwrap();
        assert!(err.to_string().contains("Invalid anonymization configuration"));
    }

    #[test]
    fn test_consistency_across_text_calls() {
        let mut engine = structure_engine();

        let first = engine
            .anonymize_text("Connection from 192.168.1.100")
            .unwrap();
        let second = engine.anonymize_text("Response to 192.168.1.100").unwrap();

        let a = token_after(&first, "Connection from ");
        let b = token_after(&second, "Response to ");
        assert_eq!(a, b);
        assert_ne!(a, "192.168.1.100");
    }

    #[test]
    fn test_format_preservation() {
        let mut engine = structure_engine();

        let instance = engine.anonymize_text("i-1234567890abcdef0").unwrap();
        assert!(Regex::new(r"^i-[0-9a-f]{8}$").unwrap().is_match(&instance));

        let account = engine.anonymize_text("123456789012").unwrap();
        assert!(Regex::new(r"^\d{12}$").unwrap().is_match(&account));

        let ip = engine.anonymize_text("192.168.1.1").unwrap();
        assert!(Regex::new(r"^10\.\d{1,3}\.\d{1,3}\.\d{1,3}$")
            .unwrap()
            .is_match(&ip));
    }

    #[test]
    fn test_selective_toggles() {
        let config = AnonymizationConfig {
            anonymize_ips: false,
            ..AnonymizationConfig::default()
        };
        let mut engine = AnonymizationEngine::new(config).unwrap();

        let output = engine
            .anonymize_text("host 192.168.1.1 in vpc-12345678")
            .unwrap();
        assert!(output.contains("192.168.1.1"));
        assert!(!output.contains("vpc-12345678"));
    }

    #[test]
    fn test_reapplication_can_differ() {
        let mut engine = structure_engine();

        let once = engine.anonymize_text("i-1234567890abcdef0").unwrap();
        let twice = engine.anonymize_text(&once).unwrap();
        assert_ne!(once, twice);
    }

    #[test]
    fn test_cycle_safety() {
        let mut engine = structure_engine();

        let root = DataValue::from(json!({"name": "a"}));
        root.insert("self", root.clone());

        let result = engine.anonymize_data(root.clone()).unwrap();
        assert_eq!(
            result.anonymized.get("self").unwrap().as_str(),
            Some(CIRCULAR_REFERENCE)
        );
        assert_eq!(engine.last_report().circular_references, 1);

        if let DataValue::Object(map) = &root {
            map.borrow_mut().remove("self");
        }
    }

    #[test]
    fn test_structural_preservation() {
        let mut engine = structure_engine();

        let result = engine
            .anonymize_json(json!({"vpc": {"id": "vpc-12345678", "cidr": "10.0.0.0/16"}}))
            .unwrap();

        let vpc = result.anonymized.get("vpc").unwrap();
        assert!(vpc.is_object());
        assert_eq!(vpc.get("cidr").unwrap().as_str(), Some("10.0.0.0/16"));
        let id = vpc.get("id").unwrap();
        assert_ne!(id.as_str(), Some("vpc-12345678"));
        assert!(id.as_str().unwrap().starts_with("vpc-"));

        // The submitted value is returned untouched
        assert_eq!(
            result.original.to_json(),
            json!({"vpc": {"id": "vpc-12345678", "cidr": "10.0.0.0/16"}})
        );
    }

    #[test]
    fn test_identifier_keys_are_rewritten() {
        let mut engine = sequential_engine();

        let result = engine
            .anonymize_json(json!({"instanceId": "x", "vpc-12345678-id": "y"}))
            .unwrap();

        let keys = result.anonymized.keys();
        assert!(keys.contains(&"instanceId".to_string()));
        assert!(keys.contains(&"vpc-001-id".to_string()));
    }

    #[test]
    fn test_round_trip_mapping() {
        let mut engine = structure_engine();
        engine
            .anonymize_text("10.1.2.3 123456789012 sg-0123abcd")
            .unwrap();
        let exported = engine.export_mappings().unwrap();

        let mut fresh = structure_engine();
        assert_eq!(fresh.import_mappings(&exported).unwrap(), 3);
        assert_eq!(fresh.get_mappings(), engine.get_mappings());

        let err = fresh.import_mappings("not json").unwrap_err();
        assert!(err.to_string().contains("Failed to import mappings"));
        assert_eq!(fresh.get_mappings(), engine.get_mappings());
    }

    #[test]
    fn test_sequential_numbering() {
        let mut engine = sequential_engine();

        let output = engine
            .anonymize_text("i-1234567890abcdef0 then i-0fedcba9876543210")
            .unwrap();
        assert_eq!(output, "instance-001 then instance-002");
    }

    #[test]
    fn test_data_clears_but_text_does_not() {
        let mut engine = sequential_engine();

        engine.anonymize_text("vpc-11111111").unwrap();
        assert_eq!(engine.anonymize_text("vpc-22222222").unwrap(), "vpc-002");

        let result = engine.anonymize_json(json!(["vpc-33333333"])).unwrap();
        assert_eq!(result.anonymized.to_json(), json!(["vpc-001"]));
        assert_eq!(result.total_mappings(), 1);
    }

    #[test]
    fn test_flow_logs_share_mappings() {
        let mut engine = sequential_engine();

        let records = vec![
            DataValue::from(json!({"srcaddr": "172.16.0.5", "action": "ACCEPT"})),
            DataValue::from(json!({"dstaddr": "172.16.0.5", "packets": 10})),
        ];
        let out = engine.anonymize_flow_logs(&records).unwrap();

        assert_eq!(out[0].get("srcaddr").unwrap().as_str(), Some("ip-001"));
        assert_eq!(out[1].get("dstaddr").unwrap().as_str(), Some("ip-001"));
        assert_eq!(out[1].get("packets").unwrap().to_json(), json!(10));
    }

    #[test]
    fn test_network_topology() {
        let mut engine = sequential_engine();

        let topology = DataValue::from(json!({
            "nodes": [{"id": "tgw-0123456789abcdef0"}, {"id": "vpc-12345678"}],
            "edges": [{"from": "tgw-0123456789abcdef0", "to": "vpc-12345678"}]
        }));
        let out = engine.anonymize_network_topology(&topology).unwrap();

        assert_eq!(
            out.to_json(),
            json!({
                "nodes": [{"id": "tgw-001"}, {"id": "vpc-001"}],
                "edges": [{"from": "tgw-001", "to": "vpc-001"}]
            })
        );
    }

    #[test]
    fn test_custom_rules_run_last() {
        let rule = CustomRule::literal(r"vpc-[0-9a-f]{8}", "[VPC]").unwrap();
        let config = AnonymizationConfig::default().with_custom_rule(rule);
        let mut engine = AnonymizationEngine::new(config).unwrap();

        // The built-in rewrite produces another vpc- id, which the rule then masks
        let output = engine.anonymize_text("in vpc-12345678").unwrap();
        assert_eq!(output, "in [VPC]");
        assert_eq!(engine.last_report().custom_rule_matches, 1);
    }

    #[test]
    fn test_custom_rule_failure_propagates() {
        let rule =
            CustomRule::computed("secret", |_| Err(anyhow::anyhow!("callback failed"))).unwrap();
        let config = AnonymizationConfig::default().with_custom_rule(rule);
        let mut engine = AnonymizationEngine::new(config).unwrap();

        let err = engine.anonymize_text("a secret").unwrap_err();
        assert_eq!(err.to_string(), "callback failed");

        let err = engine.anonymize_json(json!({"k": "secret"})).unwrap_err();
        assert_eq!(err.to_string(), "callback failed");
    }

    #[test]
    fn test_iam_names_keep_arn_prefix() {
        let config = AnonymizationConfig {
            anonymize_account_ids: false,
            anonymize_iam_user_names: true,
            anonymize_iam_role_names: true,
            preserve_structure: false,
            ..AnonymizationConfig::default()
        };
        let mut engine = AnonymizationEngine::new(config).unwrap();

        let output = engine
            .anonymize_text("arn:aws:iam::123456789012:user/alice and arn:aws:iam::123456789012:role/Admin")
            .unwrap();
        assert_eq!(
            output,
            "arn:aws:iam::123456789012:user/user-001 and arn:aws:iam::123456789012:role/role-001"
        );
    }

    #[test]
    fn test_configured_patterns_run_after_programmatic_rules() {
        let config = AnonymizationConfig {
            custom_patterns: vec![CustomRuleDefinition {
                name: None,
                pattern: "vpc-[0-9a-f]{8}".to_string(),
                replacement: "A".to_string(),
            }],
            ..AnonymizationConfig::default()
        }
        .with_custom_rule(CustomRule::literal("A", "B").unwrap());
        let mut engine = AnonymizationEngine::new(config).unwrap();

        // "A" only exists after the configured pattern ran, so "B" never appears
        assert_eq!(engine.anonymize_text("in vpc-12345678").unwrap(), "in A");
    }

    #[test]
    fn test_iam_names_with_default_account_rewrite() {
        let config = AnonymizationConfig {
            anonymize_iam_user_names: true,
            ..AnonymizationConfig::default()
        };
        let mut engine = AnonymizationEngine::new(config).unwrap();

        let output = engine
            .anonymize_text("arn:aws:iam::123456789012:user/alice")
            .unwrap();
        let shape = Regex::new(r"^arn:aws:iam::[0-9]{12}:user/user-[0-9a-f]{8}$").unwrap();
        assert!(shape.is_match(&output), "{output}");
        assert!(!output.contains("123456789012"));
        assert!(!output.contains("alice"));

        let mappings = engine.get_mappings();
        assert_eq!(mappings.len(), 2);
        assert!(output.contains(mappings["alice"].as_str()));
    }

    #[test]
    fn test_rewritten_key_collision_is_reported() {
        let mut engine = sequential_engine();

        let result = engine
            .anonymize_json(json!({"vpc-12345678-id": 1, "vpc-001-id": 2}))
            .unwrap();

        assert_eq!(result.anonymized.to_json(), json!({"vpc-001-id": 1}));
        assert_eq!(engine.last_report().key_collisions, 1);
    }

    #[test]
    fn test_create_mapping_and_clear() {
        let mut engine = sequential_engine();

        assert_eq!(engine.create_mapping("db-primary", "host"), "host-001");
        assert_eq!(engine.create_mapping("db-primary", "host"), "host-001");
        assert_eq!(engine.mapping_state(), MappingState::Populated);

        let mut snapshot = engine.get_mappings();
        snapshot.clear();
        assert_eq!(engine.get_mappings().len(), 1);

        engine.clear_mappings();
        assert_eq!(engine.mapping_state(), MappingState::Empty);
    }
}
