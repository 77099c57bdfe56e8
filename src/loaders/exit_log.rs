//! Exit log loader -- historical task runs with classified exit codes.

use serde::{Deserialize, Serialize};

use crate::source::{fetch_json, LoadError, ResourceSource, EXIT_LOG_PATH};
use crate::status::{classify, StatusDescriptor};
use crate::time::DisplayInstant;

/// One task run as written by the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub project_name: String,
    pub script_name: String,
    pub exit_code: i64,
}

/// A log record ready for the exit log table.
#[derive(Debug, Clone, Serialize)]
pub struct ExitLogRow {
    pub timestamp: DisplayInstant,
    pub project_name: String,
    pub script_name: String,
    pub exit_code: i64,
    pub status: StatusDescriptor,
}

impl ExitLogRow {
    pub fn from_record(record: LogRecord) -> Result<Self, LoadError> {
        let timestamp = DisplayInstant::parse(&record.timestamp).map_err(|e| LoadError::Time {
            path: EXIT_LOG_PATH.to_string(),
            source: e,
        })?;
        Ok(Self {
            timestamp,
            project_name: record.project_name,
            script_name: record.script_name,
            exit_code: record.exit_code,
            status: classify(record.exit_code),
        })
    }
}

/// Any record with a bad timestamp fails the whole log.
pub async fn load_exit_log(source: &dyn ResourceSource) -> Result<Vec<ExitLogRow>, LoadError> {
    let records: Vec<LogRecord> = fetch_json(source, EXIT_LOG_PATH).await?;
    records.into_iter().map(ExitLogRow::from_record).collect()
}
