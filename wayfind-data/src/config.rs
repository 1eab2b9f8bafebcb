//! Engine configuration documents.
//!
//! An engine is configured by a JSON document whose `service` section says
//! where and how to reach it. Other top-level sections belong to the engine
//! itself; they are kept verbatim in [`EngineConfig::extra`].

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use wayfind_fs::{DEFAULT_CONFIG_FILE, file_is_file, read_utf8_to_string, resolve_config_file};

use crate::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpEngineConfig};

/// Errors raised while locating or reading an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The resolved configuration file does not exist.
    #[error("engine configuration not found at {path}")]
    NotFound {
        /// Resolved file path.
        path: Utf8PathBuf,
    },
    /// The configuration file could not be read.
    #[error("failed to read engine configuration {path}: {source}")]
    Read {
        /// Resolved file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not a valid document.
    #[error("invalid engine configuration {path}: {source}")]
    Parse {
        /// Resolved file path, or `<inline>` for in-memory documents.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Where the engine service lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the engine service.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl From<&ServiceConfig> for HttpEngineConfig {
    fn from(value: &ServiceConfig) -> Self {
        Self::new(value.base_url.clone())
            .with_timeout(Duration::from_secs(value.timeout_secs))
            .with_user_agent(value.user_agent.clone())
    }
}

/// A parsed engine configuration document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Transport settings.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Engine-specific sections, preserved and otherwise ignored.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the text is not a valid document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: Utf8PathBuf::from("<inline>"),
            source,
        })
    }

    /// Transport configuration for [`crate::HttpEngine`].
    #[must_use]
    pub fn http_config(&self) -> HttpEngineConfig {
        HttpEngineConfig::from(&self.service)
    }
}

/// Resolve a configuration argument to the file that will be read.
///
/// Paths ending in `.json` are used as given; anything else is a directory
/// holding `valhalla.json`.
#[must_use]
pub fn config_file_for(path: &Utf8Path) -> Utf8PathBuf {
    resolve_config_file(path, DEFAULT_CONFIG_FILE)
}

/// Read and parse the configuration file at an already resolved `path`.
///
/// # Errors
///
/// [`ConfigError::NotFound`] when the file is absent, [`ConfigError::Read`]
/// when it cannot be read and [`ConfigError::Parse`] when it is malformed.
pub fn load_engine_config(path: &Utf8Path) -> Result<EngineConfig, ConfigError> {
    let read_error = |source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    };
    let is_file = match file_is_file(path) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => false,
        other => other.map_err(read_error)?,
    };
    if !is_file {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = read_utf8_to_string(path).map_err(read_error)?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
