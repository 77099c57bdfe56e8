//! Region loaders and the dashboard they populate.
//!
//! Each loader owns one resource and one region of the page. The three run
//! concurrently, and a failure only empties its own region.

pub mod exit_log;
pub mod last_updated;
pub mod next_executions;

use serde::Serialize;
use tracing::{error, info};

use crate::source::{LoadError, ResourceSource, EXIT_LOG_PATH, LAST_UPDATED_PATH, NEXT_EXECUTIONS_PATH};

pub use exit_log::{load_exit_log, ExitLogRow, LogRecord};
pub use last_updated::{load_last_updated, LastUpdatedView};
pub use next_executions::{load_next_executions, NextExecution};

/// One page load worth of data. `None` means that region failed to load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub last_updated: Option<LastUpdatedView>,
    pub exit_log: Option<Vec<ExitLogRow>>,
    pub next_executions: Option<Vec<NextExecution>>,
}

impl Dashboard {
    /// Run all three loaders once against `source`.
    pub async fn load(source: &dyn ResourceSource) -> Self {
        let (last_updated, exit_log, next_executions) = tokio::join!(
            load_last_updated(source),
            load_exit_log(source),
            load_next_executions(source),
        );

        let dashboard = Self {
            last_updated: settle(source, LAST_UPDATED_PATH, last_updated),
            exit_log: settle(source, EXIT_LOG_PATH, exit_log),
            next_executions: settle(source, NEXT_EXECUTIONS_PATH, next_executions),
        };

        info!(
            source = %source.describe(),
            rows = dashboard.exit_log.as_ref().map_or(0, Vec::len),
            upcoming = dashboard.next_executions.as_ref().map_or(0, Vec::len),
            failed = dashboard.failed_regions(),
            "Dashboard loaded"
        );
        dashboard
    }

    pub fn failed_regions(&self) -> usize {
        [
            self.last_updated.is_none(),
            self.exit_log.is_none(),
            self.next_executions.is_none(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

fn settle<T>(source: &dyn ResourceSource, resource: &str, result: Result<T, LoadError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(
                source = %source.describe(),
                %resource,
                error = %e,
                "Failed to load dashboard resource"
            );
            None
        }
    }
}
