//! Anonymization configuration

use crate::anonymization::detector::patterns::{CustomRuleDefinition, PatternCategory};
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Salt used when none is configured
pub const DEFAULT_SALT: &str = "cloudmask-default-salt";

/// Callable computing a replacement from the matched text
pub type ReplacementFn = Arc<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// Replacement of a custom rule
#[derive(Clone)]
pub enum Replacement {
    /// Fixed text; `$1` / `${name}` expand capture groups
    Literal(String),
    /// Computed from the whole matched text. Errors propagate to the caller.
    Computed(ReplacementFn),
}

impl Replacement {
    /// Render the replacement for one match
    pub fn render(&self, caps: &Captures<'_>) -> Result<String> {
        match self {
            Self::Literal(template) => {
                let mut out = String::new();
                caps.expand(template, &mut out);
                Ok(out)
            }
            Self::Computed(f) => {
                let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                f(matched)
            }
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Caller-supplied rule applied after every built-in category
#[derive(Debug, Clone)]
pub struct CustomRule {
    pub matcher: Regex,
    pub replacement: Replacement,
}

impl CustomRule {
    /// Rule replacing every match with fixed text
    pub fn literal(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let matcher = Regex::new(pattern)
            .with_context(|| format!("Invalid custom rule pattern: {pattern}"))?;
        Ok(Self {
            matcher,
            replacement: Replacement::Literal(replacement.into()),
        })
    }

    /// Rule replacing every match with the result of `f`
    pub fn computed<F>(pattern: &str, f: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        let matcher = Regex::new(pattern)
            .with_context(|| format!("Invalid custom rule pattern: {pattern}"))?;
        Ok(Self {
            matcher,
            replacement: Replacement::Computed(Arc::new(f)),
        })
    }

    /// Compile a rule definition loaded from configuration
    pub fn from_definition(definition: &CustomRuleDefinition) -> Result<Self> {
        Self::literal(&definition.pattern, definition.replacement.clone()).with_context(|| {
            format!(
                "Invalid custom rule '{}'",
                definition.name.as_deref().unwrap_or(&definition.pattern)
            )
        })
    }

    /// Apply the rule to `text`. Returns the rewritten text and the match count.
    pub fn apply(&self, text: &str) -> Result<(String, usize)> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut count = 0;

        for caps in self.matcher.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            out.push_str(&text[last..m.start()]);
            out.push_str(&self.replacement.render(&caps)?);
            last = m.end();
            count += 1;
        }

        if count == 0 {
            return Ok((text.to_string(), 0));
        }
        out.push_str(&text[last..]);
        Ok((out, count))
    }
}

/// Anonymization configuration
///
/// One toggle per built-in category. Categories added on top of the core
/// network identifiers (route tables, gateways, VPN, email, domain) default to
/// disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// IPv4 and IPv6 addresses
    #[serde(default = "default_true")]
    pub anonymize_ips: bool,

    /// 12-digit account IDs
    #[serde(default = "default_true")]
    pub anonymize_account_ids: bool,

    #[serde(default = "default_true")]
    pub anonymize_instance_ids: bool,

    #[serde(default = "default_true")]
    pub anonymize_vpc_ids: bool,

    #[serde(default = "default_true")]
    pub anonymize_subnet_ids: bool,

    #[serde(default = "default_true")]
    pub anonymize_security_group_ids: bool,

    #[serde(default = "default_true")]
    pub anonymize_transit_gateway_ids: bool,

    /// Name segment after `:user/` in IAM ARNs
    #[serde(default)]
    pub anonymize_iam_user_names: bool,

    /// Name segment after `:role/` in IAM ARNs
    #[serde(default)]
    pub anonymize_iam_role_names: bool,

    #[serde(default)]
    pub anonymize_route_table_ids: bool,

    #[serde(default)]
    pub anonymize_internet_gateway_ids: bool,

    #[serde(default)]
    pub anonymize_nat_gateway_ids: bool,

    #[serde(default)]
    pub anonymize_vpn_connection_ids: bool,

    #[serde(default)]
    pub anonymize_vpn_gateway_ids: bool,

    #[serde(default)]
    pub anonymize_emails: bool,

    #[serde(default)]
    pub anonymize_domains: bool,

    /// Hash-derived, format-preserving replacements; sequential counters otherwise
    #[serde(default = "default_true")]
    pub preserve_structure: bool,

    /// Salt mixed into structure-preserving hashes
    #[serde(default = "default_salt")]
    pub salt_value: String,

    /// Literal custom rules, applied after `custom_rules`
    #[serde(default)]
    pub custom_patterns: Vec<CustomRuleDefinition>,

    /// Path to a TOML file with additional `[[rules]]`, applied after `custom_patterns`
    pub pattern_library: Option<PathBuf>,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Programmatic custom rules, applied first among custom rules
    #[serde(skip)]
    pub custom_rules: Vec<CustomRule>,
}

fn default_true() -> bool {
    true
}

fn default_salt() -> String {
    DEFAULT_SALT.to_string()
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            anonymize_ips: true,
            anonymize_account_ids: true,
            anonymize_instance_ids: true,
            anonymize_vpc_ids: true,
            anonymize_subnet_ids: true,
            anonymize_security_group_ids: true,
            anonymize_transit_gateway_ids: true,
            anonymize_iam_user_names: false,
            anonymize_iam_role_names: false,
            anonymize_route_table_ids: false,
            anonymize_internet_gateway_ids: false,
            anonymize_nat_gateway_ids: false,
            anonymize_vpn_connection_ids: false,
            anonymize_vpn_gateway_ids: false,
            anonymize_emails: false,
            anonymize_domains: false,
            preserve_structure: true,
            salt_value: default_salt(),
            custom_patterns: Vec::new(),
            pattern_library: None,
            audit: AuditConfig::default(),
            custom_rules: Vec::new(),
        }
    }
}

impl AnonymizationConfig {
    /// Whether a built-in category is enabled
    pub fn is_enabled(&self, category: PatternCategory) -> bool {
        match category {
            PatternCategory::Ipv4 | PatternCategory::Ipv6 => self.anonymize_ips,
            PatternCategory::Account => self.anonymize_account_ids,
            PatternCategory::Instance => self.anonymize_instance_ids,
            PatternCategory::Vpc => self.anonymize_vpc_ids,
            PatternCategory::Subnet => self.anonymize_subnet_ids,
            PatternCategory::SecurityGroup => self.anonymize_security_group_ids,
            PatternCategory::TransitGateway => self.anonymize_transit_gateway_ids,
            PatternCategory::IamUser => self.anonymize_iam_user_names,
            PatternCategory::IamRole => self.anonymize_iam_role_names,
            PatternCategory::RouteTable => self.anonymize_route_table_ids,
            PatternCategory::InternetGateway => self.anonymize_internet_gateway_ids,
            PatternCategory::NatGateway => self.anonymize_nat_gateway_ids,
            PatternCategory::VpnConnection => self.anonymize_vpn_connection_ids,
            PatternCategory::VpnGateway => self.anonymize_vpn_gateway_ids,
            PatternCategory::Email => self.anonymize_emails,
            PatternCategory::Domain => self.anonymize_domains,
        }
    }

    /// Enable or disable a built-in category
    pub fn set_enabled(&mut self, category: PatternCategory, enabled: bool) {
        let toggle = match category {
            PatternCategory::Ipv4 | PatternCategory::Ipv6 => &mut self.anonymize_ips,
            PatternCategory::Account => &mut self.anonymize_account_ids,
            PatternCategory::Instance => &mut self.anonymize_instance_ids,
            PatternCategory::Vpc => &mut self.anonymize_vpc_ids,
            PatternCategory::Subnet => &mut self.anonymize_subnet_ids,
            PatternCategory::SecurityGroup => &mut self.anonymize_security_group_ids,
            PatternCategory::TransitGateway => &mut self.anonymize_transit_gateway_ids,
            PatternCategory::IamUser => &mut self.anonymize_iam_user_names,
            PatternCategory::IamRole => &mut self.anonymize_iam_role_names,
            PatternCategory::RouteTable => &mut self.anonymize_route_table_ids,
            PatternCategory::InternetGateway => &mut self.anonymize_internet_gateway_ids,
            PatternCategory::NatGateway => &mut self.anonymize_nat_gateway_ids,
            PatternCategory::VpnConnection => &mut self.anonymize_vpn_connection_ids,
            PatternCategory::VpnGateway => &mut self.anonymize_vpn_gateway_ids,
            PatternCategory::Email => &mut self.anonymize_emails,
            PatternCategory::Domain => &mut self.anonymize_domains,
        };
        *toggle = enabled;
    }

    /// Append a programmatic custom rule
    pub fn with_custom_rule(mut self, rule: CustomRule) -> Self {
        self.custom_rules.push(rule);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.preserve_structure && self.salt_value.is_empty() {
            anyhow::bail!("salt_value must not be empty when preserve_structure is enabled");
        }

        for definition in &self.custom_patterns {
            CustomRule::from_definition(definition)?;
        }

        // Validate pattern library path if specified
        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }

        self.audit
            .validate()
            .context("Invalid audit configuration")?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        let toggles: [(&str, &mut bool); 17] = [
            ("CLOUDMASK_ANONYMIZE_IPS", &mut self.anonymize_ips),
            ("CLOUDMASK_ANONYMIZE_ACCOUNT_IDS", &mut self.anonymize_account_ids),
            ("CLOUDMASK_ANONYMIZE_INSTANCE_IDS", &mut self.anonymize_instance_ids),
            ("CLOUDMASK_ANONYMIZE_VPC_IDS", &mut self.anonymize_vpc_ids),
            ("CLOUDMASK_ANONYMIZE_SUBNET_IDS", &mut self.anonymize_subnet_ids),
            (
                "CLOUDMASK_ANONYMIZE_SECURITY_GROUP_IDS",
                &mut self.anonymize_security_group_ids,
            ),
            (
                "CLOUDMASK_ANONYMIZE_TRANSIT_GATEWAY_IDS",
                &mut self.anonymize_transit_gateway_ids,
            ),
            ("CLOUDMASK_ANONYMIZE_IAM_USER_NAMES", &mut self.anonymize_iam_user_names),
            ("CLOUDMASK_ANONYMIZE_IAM_ROLE_NAMES", &mut self.anonymize_iam_role_names),
            ("CLOUDMASK_ANONYMIZE_ROUTE_TABLE_IDS", &mut self.anonymize_route_table_ids),
            (
                "CLOUDMASK_ANONYMIZE_INTERNET_GATEWAY_IDS",
                &mut self.anonymize_internet_gateway_ids,
            ),
            ("CLOUDMASK_ANONYMIZE_NAT_GATEWAY_IDS", &mut self.anonymize_nat_gateway_ids),
            (
                "CLOUDMASK_ANONYMIZE_VPN_CONNECTION_IDS",
                &mut self.anonymize_vpn_connection_ids,
            ),
            ("CLOUDMASK_ANONYMIZE_VPN_GATEWAY_IDS", &mut self.anonymize_vpn_gateway_ids),
            ("CLOUDMASK_ANONYMIZE_EMAILS", &mut self.anonymize_emails),
            ("CLOUDMASK_ANONYMIZE_DOMAINS", &mut self.anonymize_domains),
            ("CLOUDMASK_PRESERVE_STRUCTURE", &mut self.preserve_structure),
        ];

        for (name, toggle) in toggles {
            if let Ok(val) = std::env::var(name) {
                *toggle = val
                    .parse()
                    .with_context(|| format!("Invalid {name} value"))?;
            }
        }

        if let Ok(val) = std::env::var("CLOUDMASK_SALT") {
            self.salt_value = val;
        }

        if let Ok(val) = std::env::var("CLOUDMASK_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_true")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/cloudmask.log")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled {
            if let Some(parent) = self.log_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create audit log directory: {}", parent.display())
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CLOUDMASK_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid CLOUDMASK_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("CLOUDMASK_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("CLOUDMASK_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid CLOUDMASK_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}
