//! Pattern library for identifier detection
//!
//! Built-in categories are kept in the order they are applied. Custom rule
//! libraries can be loaded from TOML files.

use anyhow::{Context, Result};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Built-in identifier category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Ipv4,
    Ipv6,
    Account,
    Instance,
    Vpc,
    Subnet,
    SecurityGroup,
    TransitGateway,
    IamUser,
    IamRole,
    RouteTable,
    InternetGateway,
    NatGateway,
    VpnConnection,
    VpnGateway,
    Email,
    Domain,
}

impl PatternCategory {
    /// Every built-in category, in application order.
    ///
    /// Addresses and account IDs run before resource IDs and ARN-scoped names,
    /// so digits inside one identifier are not claimed by a later pattern.
    pub const ALL: [PatternCategory; 17] = [
        Self::Ipv4,
        Self::Ipv6,
        Self::Account,
        Self::Instance,
        Self::Vpc,
        Self::Subnet,
        Self::SecurityGroup,
        Self::TransitGateway,
        Self::IamUser,
        Self::IamRole,
        Self::RouteTable,
        Self::InternetGateway,
        Self::NatGateway,
        Self::VpnConnection,
        Self::VpnGateway,
        Self::Email,
        Self::Domain,
    ];

    /// Prefix used for sequential and fallback replacements
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ipv4 => "ip",
            Self::Ipv6 => "ipv6",
            Self::Account => "account",
            Self::Instance => "instance",
            Self::Vpc => "vpc",
            Self::Subnet => "subnet",
            Self::SecurityGroup => "sg",
            Self::TransitGateway => "tgw",
            Self::IamUser => "user",
            Self::IamRole => "role",
            Self::RouteTable => "rtb",
            Self::InternetGateway => "igw",
            Self::NatGateway => "nat",
            Self::VpnConnection => "vpn",
            Self::VpnGateway => "vgw",
            Self::Email => "email",
            Self::Domain => "domain",
        }
    }

    /// Whether the category is a resource ID (`<prefix>-<hex>`)
    pub fn is_resource_id(&self) -> bool {
        matches!(
            self,
            Self::Instance
                | Self::Vpc
                | Self::Subnet
                | Self::SecurityGroup
                | Self::TransitGateway
                | Self::RouteTable
                | Self::InternetGateway
                | Self::NatGateway
                | Self::VpnConnection
                | Self::VpnGateway
        )
    }

    fn regex_source(&self) -> &'static str {
        // Word boundaries are spelled out as ASCII lookarounds so that
        // non-ASCII digits and letters never count as part of an identifier
        match self {
            // A trailing "/<digit>" marks a CIDR block, which is left alone
            Self::Ipv4 => {
                r"(?<![0-9A-Za-z_])(?:(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])(?![0-9A-Za-z_])(?!/[0-9])"
            }
            Self::Ipv6 => {
                r"(?<![0-9A-Za-z_])(?:[0-9A-Fa-f]{1,4}:){7}[0-9A-Fa-f]{1,4}(?![0-9A-Za-z_])"
            }
            Self::Account => r"(?<![0-9A-Za-z_])[0-9]{12}(?![0-9A-Za-z_])",
            Self::Instance => r"(?<![0-9A-Za-z_])i-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::Vpc => r"(?<![0-9A-Za-z_])vpc-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::Subnet => r"(?<![0-9A-Za-z_])subnet-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::SecurityGroup => r"(?<![0-9A-Za-z_])sg-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::TransitGateway => r"(?<![0-9A-Za-z_])tgw-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::IamUser => r"(?<=arn:aws:iam::[0-9]{12}:user/)[A-Za-z0-9_+=,.@-]+",
            Self::IamRole => r"(?<=arn:aws:iam::[0-9]{12}:role/)[A-Za-z0-9_+=,.@-]+",
            Self::RouteTable => r"(?<![0-9A-Za-z_])rtb-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::InternetGateway => r"(?<![0-9A-Za-z_])igw-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::NatGateway => r"(?<![0-9A-Za-z_])nat-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::VpnConnection => r"(?<![0-9A-Za-z_])vpn-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::VpnGateway => r"(?<![0-9A-Za-z_])vgw-[0-9a-f]{8,17}(?![0-9A-Za-z_])",
            Self::Email => {
                r"(?<![0-9A-Za-z_])[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}(?![0-9A-Za-z_])"
            }
            Self::Domain => {
                r"(?<![0-9A-Za-z_])(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,}(?![0-9A-Za-z_])"
            }
        }
    }
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Account => "account",
            Self::Instance => "instance",
            Self::Vpc => "vpc",
            Self::Subnet => "subnet",
            Self::SecurityGroup => "security_group",
            Self::TransitGateway => "transit_gateway",
            Self::IamUser => "iam_user",
            Self::IamRole => "iam_role",
            Self::RouteTable => "route_table",
            Self::InternetGateway => "internet_gateway",
            Self::NatGateway => "nat_gateway",
            Self::VpnConnection => "vpn_connection",
            Self::VpnGateway => "vpn_gateway",
            Self::Email => "email",
            Self::Domain => "domain",
        };
        f.write_str(name)
    }
}

/// Compiled pattern with its category
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Compiled regex
    pub regex: Regex,
    /// Identifier category
    pub category: PatternCategory,
}

/// Custom rule definition as written in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRuleDefinition {
    /// Optional label, used in error messages
    #[serde(default)]
    pub name: Option<String>,
    /// Regex matched against the (already anonymized) text
    pub pattern: String,
    /// Literal replacement; `$1` / `${name}` expand capture groups
    pub replacement: String,
}

/// Custom rule library container
#[derive(Debug, Deserialize)]
struct RuleLibrary {
    #[serde(default)]
    rules: Vec<CustomRuleDefinition>,
}

/// Load custom rule definitions from a TOML file
pub fn load_rule_library<P: AsRef<Path>>(path: P) -> Result<Vec<CustomRuleDefinition>> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read rule library: {}", path.as_ref().display()))?;

    rules_from_toml(&content)
}

/// Parse custom rule definitions from TOML content (`[[rules]]` tables)
pub fn rules_from_toml(content: &str) -> Result<Vec<CustomRuleDefinition>> {
    let library: RuleLibrary =
        toml::from_str(content).context("Failed to parse rule library TOML")?;
    Ok(library.rules)
}

/// Ordered registry of the built-in identifier patterns
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
}

impl PatternRegistry {
    /// Compile every built-in category, in application order
    pub fn default_patterns() -> Result<Self> {
        let patterns = PatternCategory::ALL
            .iter()
            .map(|&category| {
                let regex = Regex::new(category.regex_source())
                    .with_context(|| format!("Invalid built-in pattern for '{category}'"))?;
                Ok(CompiledPattern { regex, category })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// All patterns, in application order
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Pattern for a specific category
    pub fn pattern_for(&self, category: PatternCategory) -> Option<&CompiledPattern> {
        self.patterns.iter().find(|p| p.category == category)
    }

    /// Whether `text` contains a resource ID or an account ID
    pub fn matches_identifier(&self, text: &str) -> bool {
        self.patterns
            .iter()
            .filter(|p| p.category.is_resource_id() || p.category == PatternCategory::Account)
            .any(|p| p.regex.is_match(text).unwrap_or(false))
    }
}
