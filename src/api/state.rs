use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DisplayConfig;
use crate::source::ResourceSource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ResourceSource>,
    pub display: DisplayConfig,
    /// Set when the source is a local directory; its `data/` is served as-is.
    pub data_dir: Option<PathBuf>,
}
