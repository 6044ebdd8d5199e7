//! Structure-preserving replacement strategy
//!
//! Replacements are derived from `sha256(original + salt)`, so they only
//! depend on the original and the salt. The shape of the original decides the
//! shape of the output:
//!
//! | original              | replacement                          |
//! |-----------------------|--------------------------------------|
//! | `vpc-0a1b2c3d...`     | `vpc-<8 hex>`                        |
//! | `192.168.1.100`       | `10.<b1>.<b2>.<b3>`                  |
//! | `123456789012`        | 12 digits                            |
//! | anything else         | `<prefix>-<8 hex>`                   |

use super::ReplacementStrategy;
use crate::anonymization::mapping::MappingStore;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static RESOURCE_ID_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(i|vpc|subnet|sg|rtb|igw|nat|tgw|vpn|vgw)-[0-9a-f]+$")
        .expect("resource id shape regex is valid")
});

static IPV4_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$")
        .expect("ipv4 shape regex is valid")
});

static ACCOUNT_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{12}$").expect("account shape regex is valid"));

/// Hash-derived, format-preserving replacements
pub struct StructurePreservingStrategy {
    salt: String,
}

impl StructurePreservingStrategy {
    /// Create a new strategy with the given salt
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    fn digest(&self, original: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(original.as_bytes());
        hasher.update(self.salt.as_bytes());
        hasher.finalize().into()
    }
}

/// First 8 lowercase hex characters of the digest
fn short_hash(digest: &[u8; 32]) -> String {
    digest[..4].iter().map(|b| format!("{b:02x}")).collect()
}

impl ReplacementStrategy for StructurePreservingStrategy {
    fn generate(&self, original: &str, prefix: &str, _store: &MappingStore) -> String {
        let digest = self.digest(original);
        let hash = short_hash(&digest);

        if let Some(caps) = RESOURCE_ID_SHAPE.captures(original) {
            return format!("{}-{hash}", &caps[1]);
        }

        if IPV4_SHAPE.is_match(original) {
            // The first 6 hex characters are the first 3 digest bytes
            return format!("10.{}.{}.{}", digest[0], digest[1], digest[2]);
        }

        if ACCOUNT_SHAPE.is_match(original) {
            let value = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
            let mut digits = format!("{value:0<12}");
            digits.truncate(12);
            return digits;
        }

        format!("{prefix}-{hash}")
    }

    fn name(&self) -> &'static str {
        "structure_preserving"
    }
}
