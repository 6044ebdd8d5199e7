//! Topology command implementation

use super::common::{print_report, EngineArgs, IoArgs};
use super::EXIT_OK;
use crate::anonymization::DataValue;
use crate::config::CloudMaskConfig;
use clap::Args;

/// Arguments for the topology command
#[derive(Args, Debug)]
pub struct TopologyArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl TopologyArgs {
    /// Execute the topology command
    pub fn execute(&self, config: &CloudMaskConfig, report: bool) -> anyhow::Result<i32> {
        let mut engine = self.engine.build_engine(config)?;
        self.engine.import_mappings(&mut engine)?;

        let topology = DataValue::from(self.io.read_json()?);
        let anonymized = engine.anonymize_network_topology(&topology)?;
        self.io.write_value(&anonymized)?;

        self.engine.export_mappings(&engine)?;
        if report {
            print_report(engine.last_report());
        }
        Ok(EXIT_OK)
    }
}
