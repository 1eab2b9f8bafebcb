//! Error types emitted by the wayfind CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wayfind_core::{RoutingError, STATUS_FAILED};
use wayfind_data::EngineLoadError;

/// Errors emitted by the wayfind CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option was present but could not be interpreted.
    #[error("invalid --{field} {value:?}: {reason}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// The engine configuration path does not exist.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The engine configuration path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The engine configuration path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The engine could not be loaded from its configuration.
    #[error("failed to load routing engine: {0}")]
    LoadEngine(#[from] EngineLoadError),
    /// The routing operation failed.
    #[error("{source} (status {status})", status = .source.status_code())]
    Routing {
        #[from]
        source: RoutingError,
    },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Integer status in the boundary convention: `-2` when no engine is
    /// loaded, otherwise `-1`.
    #[must_use]
    pub const fn status(&self) -> i32 {
        match self {
            Self::Routing { source } => source.status_code(),
            _ => STATUS_FAILED,
        }
    }
}
