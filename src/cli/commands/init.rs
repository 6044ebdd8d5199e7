//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cloudmask.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} to choose which identifiers to rewrite", self.output);
                println!("  2. Set CLOUDMASK_SALT_SECRET or replace salt_value");
                println!("  3. Validate configuration: cloudmask validate-config");
                println!("  4. Anonymize: cloudmask text -i app.log -o app.masked.log");
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    fn sample_config() -> &'static str {
        r#"# cloudmask configuration

[application]
log_level = "info"

[anonymization]
# Built-in categories, applied in this order
anonymize_ips = true
anonymize_account_ids = true
anonymize_instance_ids = true
anonymize_vpc_ids = true
anonymize_subnet_ids = true
anonymize_security_group_ids = true
anonymize_transit_gateway_ids = true
anonymize_iam_user_names = false
anonymize_iam_role_names = false

# Additional categories
anonymize_route_table_ids = false
anonymize_internet_gateway_ids = false
anonymize_nat_gateway_ids = false
anonymize_vpn_connection_ids = false
anonymize_vpn_gateway_ids = false
anonymize_emails = false
anonymize_domains = false

# true: hash-derived, format-preserving replacements
# false: sequential replacements (vpc-001, vpc-002, ...)
preserve_structure = true
salt_value = "change-me"
# salt_value = "${CLOUDMASK_SALT_SECRET}"

# Rules applied after the built-in categories
# [[anonymization.custom_patterns]]
# name = "internal hosts"
# pattern = "db-[a-z0-9]+\\.corp"
# replacement = "db-host.corp"

# pattern_library = "./rules.toml"

[anonymization.audit]
enabled = false
log_path = "./audit/cloudmask.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
"#
    }
}
