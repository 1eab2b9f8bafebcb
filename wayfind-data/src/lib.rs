//! Engine adapters for wayfind.
//!
//! Responsibilities:
//! - Reach the routing engine over HTTP using its JSON action protocol.
//! - Locate, read and parse engine configuration files.
//! - Load configured engines into a [`RoutingContext`].
//!
//! Boundaries:
//! - Do not encode routing rules (these live in `wayfind-core`).
//! - Keep blocking calls behind the synchronous [`RoutingEngine`] trait.
//!
//! Invariants:
//! - No global mutable state.
//!
//! [`RoutingEngine`]: wayfind_core::RoutingEngine

mod config;
mod http;

use camino::Utf8Path;
use log::debug;
use thiserror::Error;
use wayfind_core::{LoadOutcome, RoutingContext};

pub use config::{ConfigError, EngineConfig, ServiceConfig, config_file_for, load_engine_config};
pub use http::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, EngineBuildError, HttpEngine,
    HttpEngineConfig, interpret_response,
};

/// Errors raised while loading an engine into a context.
#[derive(Debug, Error)]
pub enum EngineLoadError {
    /// The configuration could not be located or read.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The engine could not be built from the configuration.
    #[error(transparent)]
    Build(#[from] EngineBuildError),
}

impl From<HttpEngine> for Box<dyn wayfind_core::RoutingEngine> {
    fn from(value: HttpEngine) -> Self {
        Box::new(value)
    }
}

/// Load the HTTP engine configured at `path` into `context`.
///
/// `path` is resolved with [`config_file_for`]. Loading the path that is
/// already loaded is a no-op; loading another path replaces the engine only
/// when the new configuration loads.
///
/// # Errors
///
/// Returns [`EngineLoadError`] when the configuration is missing or invalid
/// or the engine cannot be built.
pub fn load_http_engine<E>(
    context: &RoutingContext<E>,
    path: &Utf8Path,
) -> Result<LoadOutcome, EngineLoadError>
where
    E: From<HttpEngine>,
{
    let resolved = config_file_for(path);
    debug!("engine configuration resolved to {resolved}");
    context.load_with(resolved.as_str(), || {
        let config = load_engine_config(&resolved)?;
        let engine = HttpEngine::with_config(config.http_config())?;
        Ok(E::from(engine))
    })
}
