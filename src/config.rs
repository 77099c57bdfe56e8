//! TOML configuration for taskdash.
//!
//! Every section has compiled-in defaults. The file is looked up from, in
//! order: an explicit path, `TASKDASH_CONFIG`, then `./taskdash.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::table::DEFAULT_PAGE_SIZE;

pub const CONFIG_ENV: &str = "TASKDASH_CONFIG";
pub const LOCAL_CONFIG: &str = "taskdash.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DashConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.display.page_size == 0 {
            anyhow::bail!("display.page_size must be at least 1");
        }
        if self.source.location.trim().is_empty() {
            anyhow::bail!("source.location must not be empty");
        }
        Ok(())
    }

    /// Pick the configuration to run with.
    ///
    /// `--config` is authoritative and its errors are returned. Otherwise the
    /// `TASKDASH_CONFIG` file and then `./taskdash.toml` are tried; a candidate
    /// that fails is logged and the next one is tried, ending at the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let from_env = std::env::var_os(CONFIG_ENV).map(|p| ("env", PathBuf::from(p)));
        let local = Some(("local", PathBuf::from(LOCAL_CONFIG))).filter(|(_, p)| p.exists());

        for (origin, path) in from_env.into_iter().chain(local) {
            match Self::load(&path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => warn!(
                    origin,
                    path = %path.display(),
                    error = %e,
                    "Skipping unusable config file"
                ),
            }
        }

        debug!("No config file found, running on built-in defaults");
        Ok(Self::default())
    }
}

/// Where the JSON resources live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory root, or an `http(s)://` base URL.
    pub location: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    /// Exit log rows per page.
    pub page_size: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Task Dashboard".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = DashConfig::default();
        assert_eq!(cfg.source.location, ".");
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.display.title, "Task Dashboard");
        assert_eq!(cfg.display.page_size, 25);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_partial_toml() {
        let cfg = DashConfig::from_toml(
            r#"
[source]
location = "https://status.example.com/dash/"

[display]
page_size = 50

[logging]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(cfg.source.location, "https://status.example.com/dash/");
        assert_eq!(cfg.display.page_size, 50);
        assert_eq!(cfg.display.title, "Task Dashboard");
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let cfg = DashConfig::from_toml("").unwrap();
        assert_eq!(cfg.display.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let err = DashConfig::from_toml("[display]\npage_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(DashConfig::from_toml("[logging]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskdash.toml");
        std::fs::write(&path, "[server]\nbind = \"127.0.0.1:9000\"\n").unwrap();
        let cfg = DashConfig::resolve(Some(&path)).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DashConfig::resolve(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
