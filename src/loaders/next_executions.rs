//! Next-execution loader -- upcoming scheduled run per project.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::source::{fetch_json, LoadError, ResourceSource, NEXT_EXECUTIONS_PATH};
use crate::time::DisplayInstant;

#[derive(Debug, Clone, Serialize)]
pub struct NextExecution {
    pub project_name: String,
    pub next_run: DisplayInstant,
}

/// Project → instant pairs in the order the file lists them.
struct ScheduleEntries(Vec<(String, String)>);

impl<'de> Deserialize<'de> for ScheduleEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ScheduleEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of project name to timestamp")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(ScheduleEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Entries keep the file's order.
pub async fn load_next_executions(
    source: &dyn ResourceSource,
) -> Result<Vec<NextExecution>, LoadError> {
    let ScheduleEntries(entries): ScheduleEntries = fetch_json(source, NEXT_EXECUTIONS_PATH).await?;
    entries
        .into_iter()
        .map(|(project_name, when)| {
            let next_run = DisplayInstant::parse(&when).map_err(|e| LoadError::Time {
                path: NEXT_EXECUTIONS_PATH.to_string(),
                source: e,
            })?;
            Ok(NextExecution {
                project_name,
                next_run,
            })
        })
        .collect()
}
