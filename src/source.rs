//! Data sources -- where the pre-generated JSON resources are read from.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::time::TimeError;

pub const LAST_UPDATED_PATH: &str = "data/last_updated.json";
pub const EXIT_LOG_PATH: &str = "data/exit_log.json";
pub const NEXT_EXECUTIONS_PATH: &str = "data/next_task_executions.json";

/// Why a resource could not be turned into a display region.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request for {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad timestamp in {path}: {source}")]
    Time {
        path: String,
        #[source]
        source: TimeError,
    },
}

/// A place the three dashboard resources can be fetched from.
#[async_trait::async_trait]
pub trait ResourceSource: Send + Sync {
    /// Fetch the raw bytes of the resource at `path`, relative to the source root.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Resources read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait::async_trait]
impl ResourceSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let full = self.root.join(path);
        debug!(path = %full.display(), "Reading resource");
        tokio::fs::read(&full)
            .await
            .map_err(|source| LoadError::Io { path: full, source })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Resources fetched over HTTP relative to a base URL. One attempt, no timeout.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl ResourceSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.url_for(path);
        debug!(%url, "Fetching resource");
        let transport = |source| LoadError::Transport {
            path: path.to_string(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Pick a source for `location`: http(s) URLs are fetched, anything else is a directory.
pub fn open_source(location: &str) -> Arc<dyn ResourceSource> {
    if is_remote(location) {
        Arc::new(HttpSource::new(location))
    } else {
        Arc::new(DirSource::new(location))
    }
}

/// Fetch `path` and decode it as JSON.
pub async fn fetch_json<T: DeserializeOwned>(
    source: &dyn ResourceSource,
    path: &str,
) -> Result<T, LoadError> {
    let bytes = source.fetch(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Decode {
        path: path.to_string(),
        source,
    })
}
