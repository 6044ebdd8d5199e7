//! Flow-logs command implementation
//!
//! Input is a JSON array of flow-log records. The mapping store is shared by
//! all records, so the same address gets the same replacement everywhere.

use super::common::{print_report, EngineArgs, IoArgs};
use super::EXIT_OK;
use crate::anonymization::DataValue;
use crate::config::CloudMaskConfig;
use anyhow::bail;
use clap::Args;

/// Arguments for the flow-logs command
#[derive(Args, Debug)]
pub struct FlowLogsArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl FlowLogsArgs {
    /// Execute the flow-logs command
    pub fn execute(&self, config: &CloudMaskConfig, report: bool) -> anyhow::Result<i32> {
        let mut engine = self.engine.build_engine(config)?;
        self.engine.import_mappings(&mut engine)?;

        let serde_json::Value::Array(items) = self.io.read_json()? else {
            bail!("Flow-log input must be a JSON array of records");
        };
        let records: Vec<DataValue> = items.into_iter().map(DataValue::from).collect();
        tracing::debug!(records = records.len(), "Anonymizing flow logs");

        let anonymized = engine.anonymize_flow_logs(&records)?;
        self.io.write_value(&DataValue::array(anonymized))?;

        self.engine.export_mappings(&engine)?;
        if report {
            print_report(engine.last_report());
        }
        Ok(EXIT_OK)
    }
}
