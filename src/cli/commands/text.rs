//! Text command implementation
//!
//! Anonymizes free text such as log excerpts or CLI output. Mappings
//! accumulate across the whole input.

use super::common::{print_report, EngineArgs, IoArgs};
use super::EXIT_OK;
use crate::config::CloudMaskConfig;
use clap::Args;

/// Arguments for the text command
#[derive(Args, Debug)]
pub struct TextArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl TextArgs {
    /// Execute the text command
    pub fn execute(&self, config: &CloudMaskConfig, report: bool) -> anyhow::Result<i32> {
        let mut engine = self.engine.build_engine(config)?;
        self.engine.import_mappings(&mut engine)?;

        let input = self.io.read_input()?;
        let output = engine.anonymize_text(&input)?;
        self.io.write_output(&output)?;

        self.engine.export_mappings(&engine)?;
        if report {
            print_report(engine.last_report());
        }
        Ok(EXIT_OK)
    }
}
