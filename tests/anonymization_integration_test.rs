//! Integration tests for the anonymization pipeline with synthetic AWS data

use cloudmask::anonymization::{
    config::{AuditConfig, CustomRule},
    detector::patterns::CustomRuleDefinition,
    AnonymizationConfig, AnonymizationEngine, DataValue, MappingState, PatternCategory,
};
use regex::Regex;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

/// A describe-instances style document with identifiers of every core category
fn synthetic_inventory() -> serde_json::Value {
    json!({
        "Reservations": [{
            "OwnerId": "123456789012",
            "Instances": [{
                "InstanceId": "i-0a1b2c3d4e5f60718",
                "PrivateIpAddress": "172.31.16.139",
                "PublicIpAddress": "54.183.22.10",
                "VpcId": "vpc-1a2b3c4d",
                "SubnetId": "subnet-6e7f829e",
                "SecurityGroups": [
                    {"GroupId": "sg-903004f8", "GroupName": "web"},
                    {"GroupId": "sg-0123abcd", "GroupName": "ssh"}
                ],
                "IamInstanceProfile": {
                    "Arn": "arn:aws:iam::123456789012:instance-profile/web"
                },
                "Ipv6Address": "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
                "Monitoring": {"State": "disabled"},
                "LaunchIndex": 0,
                "EbsOptimized": false
            }]
        }],
        "TransitGatewayId": "tgw-0262a0e521EXAMPLE"
    })
}

fn all_strings(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.push(s.clone()),
        serde_json::Value::Array(items) => items.iter().for_each(|v| all_strings(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| all_strings(v, out)),
        _ => {}
    }
}

#[test]
fn test_inventory_is_fully_anonymized() {
    let mut engine = AnonymizationEngine::new(AnonymizationConfig::default()).unwrap();

    let result = engine.anonymize_json(synthetic_inventory()).unwrap();
    let anonymized = result.anonymized.to_json();

    let mut strings = Vec::new();
    all_strings(&anonymized, &mut strings);
    for original in [
        "123456789012",
        "i-0a1b2c3d4e5f60718",
        "172.31.16.139",
        "54.183.22.10",
        "vpc-1a2b3c4d",
        "subnet-6e7f829e",
        "sg-903004f8",
        "sg-0123abcd",
        "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
    ] {
        assert!(
            !strings.iter().any(|s| s.contains(original)),
            "{original} leaked"
        );
    }

    // Non-identifier values survive
    let instance = &anonymized["Reservations"][0]["Instances"][0];
    assert_eq!(instance["Monitoring"]["State"], "disabled");
    assert_eq!(instance["LaunchIndex"], 0);
    assert_eq!(instance["EbsOptimized"], false);
    assert_eq!(instance["SecurityGroups"][0]["GroupName"], "web");

    // Mixed-case hex is not a resource ID
    assert_eq!(anonymized["TransitGatewayId"], "tgw-0262a0e521EXAMPLE");

    // The account ID inside the ARN and OwnerId share one replacement
    let owner = anonymized["Reservations"][0]["OwnerId"].as_str().unwrap();
    let arn = instance["IamInstanceProfile"]["Arn"].as_str().unwrap();
    assert_eq!(arn, format!("arn:aws:iam::{owner}:instance-profile/web"));

    assert_eq!(result.mappings.get("123456789012").map(String::as_str), Some(owner));
    assert_eq!(result.total_mappings(), 9);
}

#[test]
fn test_shapes_are_preserved() {
    let mut engine = AnonymizationEngine::new(AnonymizationConfig::default()).unwrap();
    let result = engine.anonymize_json(synthetic_inventory()).unwrap();
    let instance = result.anonymized.to_json()["Reservations"][0]["Instances"][0].clone();

    let checks = [
        ("InstanceId", r"^i-[0-9a-f]{8}$"),
        ("PrivateIpAddress", r"^10\.\d{1,3}\.\d{1,3}\.\d{1,3}$"),
        ("VpcId", r"^vpc-[0-9a-f]{8}$"),
        ("SubnetId", r"^subnet-[0-9a-f]{8}$"),
        ("Ipv6Address", r"^ipv6-[0-9a-f]{8}$"),
    ];
    for (field, shape) in checks {
        let value = instance[field].as_str().unwrap();
        assert!(Regex::new(shape).unwrap().is_match(value), "{field}: {value}");
    }
}

#[test]
fn test_same_salt_same_output_across_engines() {
    let text = "i-1234567890abcdef0 in vpc-12345678 from 192.168.1.100";

    let mut a = AnonymizationEngine::new(AnonymizationConfig::default()).unwrap();
    let mut b = AnonymizationEngine::new(AnonymizationConfig::default()).unwrap();
    assert_eq!(a.anonymize_text(text).unwrap(), b.anonymize_text(text).unwrap());

    let mut salted = AnonymizationEngine::new(AnonymizationConfig {
        salt_value: "another-salt".to_string(),
        ..AnonymizationConfig::default()
    })
    .unwrap();
    assert_ne!(a.anonymize_text(text).unwrap(), salted.anonymize_text(text).unwrap());
}

#[test]
fn test_sequential_flow_log_session() {
    let config = AnonymizationConfig {
        preserve_structure: false,
        ..AnonymizationConfig::default()
    };
    let mut engine = AnonymizationEngine::new(config).unwrap();

    let lines = [
        "2 123456789012 eni-1235b8ca 172.31.16.139 172.31.16.21 20641 22 6 20 4249 ACCEPT OK",
        "2 123456789012 eni-1235b8ca 172.31.16.21 172.31.16.139 22 20641 6 20 4249 ACCEPT OK",
    ];
    let first = engine.anonymize_text(lines[0]).unwrap();
    let second = engine.anonymize_text(lines[1]).unwrap();

    assert_eq!(
        first,
        "2 account-001 eni-1235b8ca ip-001 ip-002 20641 22 6 20 4249 ACCEPT OK"
    );
    assert_eq!(
        second,
        "2 account-001 eni-1235b8ca ip-002 ip-001 22 20641 6 20 4249 ACCEPT OK"
    );
}

#[test]
fn test_supplementary_categories() {
    let mut config = AnonymizationConfig {
        preserve_structure: false,
        ..AnonymizationConfig::default()
    };
    for category in [
        PatternCategory::RouteTable,
        PatternCategory::InternetGateway,
        PatternCategory::NatGateway,
        PatternCategory::VpnConnection,
        PatternCategory::VpnGateway,
        PatternCategory::Email,
    ] {
        config.set_enabled(category, true);
    }
    let mut engine = AnonymizationEngine::new(config).unwrap();

    let output = engine
        .anonymize_text(
            "rtb-0a1b2c3d igw-0a1b2c3d nat-0a1b2c3d4e5f60718 vpn-0a1b2c3d vgw-0a1b2c3d ops@example.com",
        )
        .unwrap();
    assert_eq!(output, "rtb-001 igw-001 nat-001 vpn-001 vgw-001 email-001");
}

#[test]
fn test_custom_rules_from_all_sources() {
    let dir = tempdir().unwrap();
    let library = dir.path().join("rules.toml");
    fs::write(
        &library,
        r#"
[[rules]]
name = "hostnames"
pattern = "(db|cache)-[a-z]+\\.corp"
replacement = "$1-host.corp"
"#,
    )
    .unwrap();

    let config = AnonymizationConfig {
        custom_patterns: vec![CustomRuleDefinition {
            name: Some("tickets".to_string()),
            pattern: r"OPS-\d+".to_string(),
            replacement: "OPS-XXXX".to_string(),
        }],
        pattern_library: Some(library),
        ..AnonymizationConfig::default()
    }
    .with_custom_rule(
        CustomRule::computed(r"user=\w+", |m| Ok(format!("user=<{}>", m.len()))).unwrap(),
    );
    let mut engine = AnonymizationEngine::new(config).unwrap();

    let output = engine
        .anonymize_text("OPS-4411 db-orders.corp user=alice")
        .unwrap();
    assert_eq!(output, "OPS-XXXX db-host.corp user=<10>");
    assert_eq!(engine.last_report().custom_rule_matches, 3);
    // Custom rule results are not recorded as mappings
    assert_eq!(engine.mapping_state(), MappingState::Empty);
}

#[test]
fn test_audit_log_hashes_originals() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("audit").join("cloudmask.log");

    let config = AnonymizationConfig {
        audit: AuditConfig {
            enabled: true,
            log_path: log_path.clone(),
            json_format: true,
        },
        ..AnonymizationConfig::default()
    };
    let mut engine = AnonymizationEngine::new(config).unwrap();

    engine.anonymize_json(synthetic_inventory()).unwrap();
    let exported = engine.export_mappings().unwrap();
    engine.import_mappings(&exported).unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    let entries: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["operation"], "anonymize_data");
    assert_eq!(entries[1]["operation"], "import_mappings");
    assert_eq!(entries[0]["strategy"], "structure_preserving");
    assert!(!content.contains("i-0a1b2c3d4e5f60718"));
    assert!(!content.contains("172.31.16.139"));
}

#[test]
fn test_report_counts_per_category() {
    let mut engine = AnonymizationEngine::new(AnonymizationConfig::default()).unwrap();
    engine
        .anonymize_text("10.1.1.1 10.1.1.1 10.2.2.2 sg-0123abcd")
        .unwrap();

    let report = engine.last_report();
    assert_eq!(report.matches_by_category.get(&PatternCategory::Ipv4), Some(&3));
    assert_eq!(
        report.matches_by_category.get(&PatternCategory::SecurityGroup),
        Some(&1)
    );
    assert_eq!(report.strings_processed, 1);
    assert_eq!(engine.get_mappings().len(), 3);
}

#[test]
fn test_original_tree_is_not_mutated() {
    let mut engine = AnonymizationEngine::new(AnonymizationConfig::default()).unwrap();

    let input = DataValue::from(synthetic_inventory());
    let result = engine.anonymize_data(input.clone()).unwrap();

    assert_eq!(input.to_json(), synthetic_inventory());
    assert_eq!(result.original.to_json(), synthetic_inventory());
}
