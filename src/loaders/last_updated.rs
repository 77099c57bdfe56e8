//! Timestamp loader -- when the data files were generated.

use serde::{Deserialize, Serialize};

use crate::source::{fetch_json, LoadError, ResourceSource, LAST_UPDATED_PATH};
use crate::time::DisplayInstant;

#[derive(Debug, Deserialize)]
struct LastUpdatedRecord {
    last_updated: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastUpdatedView {
    pub generated_at: DisplayInstant,
}

impl LastUpdatedView {
    /// Text for the `last-updated` node.
    pub fn text(&self) -> String {
        self.generated_at.long()
    }
}

pub async fn load_last_updated(source: &dyn ResourceSource) -> Result<LastUpdatedView, LoadError> {
    let record: LastUpdatedRecord = fetch_json(source, LAST_UPDATED_PATH).await?;
    let generated_at =
        DisplayInstant::parse(&record.last_updated).map_err(|e| LoadError::Time {
            path: LAST_UPDATED_PATH.to_string(),
            source: e,
        })?;
    Ok(LastUpdatedView { generated_at })
}
