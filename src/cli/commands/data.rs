//! Data command implementation
//!
//! Anonymizes one JSON document. Each run starts from an empty mapping store,
//! so `--mappings-in` has no effect here.

use super::common::{print_report, EngineArgs, IoArgs};
use super::EXIT_OK;
use crate::config::CloudMaskConfig;
use clap::Args;

/// Arguments for the data command
#[derive(Args, Debug)]
pub struct DataArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Emit `{original, anonymized, mappings}` instead of the anonymized document only
    #[arg(long)]
    pub with_mappings: bool,
}

impl DataArgs {
    /// Execute the data command
    pub fn execute(&self, config: &CloudMaskConfig, report: bool) -> anyhow::Result<i32> {
        let mut engine = self.engine.build_engine(config)?;
        if self.engine.mappings_in.is_some() {
            tracing::warn!("--mappings-in is ignored: data starts from an empty mapping store");
        }

        let input = self.io.read_json()?;
        let result = engine.anonymize_json(input)?;

        if self.with_mappings {
            self.io.write_output(&serde_json::to_string_pretty(&result)?)?;
        } else {
            self.io.write_value(&result.anonymized)?;
        }

        self.engine.export_mappings(&engine)?;
        if report {
            print_report(engine.last_report());
        }
        Ok(EXIT_OK)
    }
}
