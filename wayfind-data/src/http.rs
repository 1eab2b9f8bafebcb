//! HTTP transport for the engine's JSON action protocol.
//!
//! [`HttpEngine`] implements the synchronous [`RoutingEngine`] trait by
//! posting each request document to `{base_url}/{action}` and blocking on
//! the response with a Tokio runtime it owns.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use serde_json::json;
//! use wayfind_core::engine::{EngineAction, RoutingEngine};
//! use wayfind_data::{HttpEngine, HttpEngineConfig};
//!
//! let config = HttpEngineConfig::new("http://localhost:8002")
//!     .with_timeout(Duration::from_secs(10));
//! let mut engine = HttpEngine::with_config(config)?;
//! let status = engine.execute(EngineAction::Status, &json!({}))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use log::debug;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;
use wayfind_core::engine::{EngineAction, EngineError, RoutingEngine};

/// Default user agent for engine requests.
pub const DEFAULT_USER_AGENT: &str = "wayfind/0.1";

/// Default engine service address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8002";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for [`HttpEngine`] construction failures.
#[derive(Debug, Error)]
pub enum EngineBuildError {
    /// The base URL is not an absolute HTTP(S) URL.
    #[error("invalid engine base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`HttpEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEngineConfig {
    /// Base URL of the engine service (e.g., `"http://localhost:8002"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpEngineConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Routing engine reached over HTTP.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the engine blocks on its own stored runtime.
/// Inside a multi-threaded runtime it blocks on that runtime's handle via
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it
/// falls back to its own runtime, which may deadlock if the caller's runtime
/// drives IO this request depends on.
pub struct HttpEngine {
    client: Client,
    config: HttpEngineConfig,
    base: String,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEngine")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpEngine {
    /// Create an engine with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, EngineBuildError> {
        Self::with_config(HttpEngineConfig::new(base_url))
    }

    /// Create an engine with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: HttpEngineConfig) -> Result<Self, EngineBuildError> {
        let base = validate_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(EngineBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EngineBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base,
            runtime,
        })
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub const fn config(&self) -> &HttpEngineConfig {
        &self.config
    }

    /// URL an action is posted to.
    #[must_use]
    pub fn action_url(&self, action: EngineAction) -> String {
        format!("{}/{}", self.base, action.as_str())
    }

    async fn post(&self, url: &str, request: &Value) -> Result<Value, EngineError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| convert_reqwest_error(&err))?;
        interpret_response(status, &body)
    }
}

impl RoutingEngine for HttpEngine {
    /// Post `request` to the action endpoint and return the response document.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded for the request to run on it; see [`HttpEngine`].
    fn execute(&mut self, action: EngineAction, request: &Value) -> Result<Value, EngineError> {
        let url = self.action_url(action);
        debug!("posting {action} request to {url}");
        let future = self.post(&url, request);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

fn validate_base_url(raw: &str) -> Result<String, EngineBuildError> {
    let invalid = |reason: String| EngineBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason,
    };
    let parsed = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

fn convert_reqwest_error(error: &reqwest::Error) -> EngineError {
    if error.is_timeout() {
        return EngineError::Timeout;
    }
    error.status().map_or_else(
        || EngineError::Transport {
            message: error.to_string(),
        },
        |status| EngineError::HttpStatus {
            status: status.as_u16(),
        },
    )
}

/// Turn an HTTP status and body into a response document.
///
/// Successful responses must be JSON. Failed responses carrying an engine
/// error document are returned as documents so the protocol layer can report
/// the engine's own code and message; any other failure becomes
/// [`EngineError::HttpStatus`].
///
/// # Errors
///
/// [`EngineError::Parse`] for a successful response that is not JSON, and
/// [`EngineError::HttpStatus`] for a failed response without an error
/// document.
pub fn interpret_response(status: u16, body: &str) -> Result<Value, EngineError> {
    let success = (200..300).contains(&status);
    let parsed = serde_json::from_str::<Value>(body);
    if success {
        return Ok(parsed?);
    }
    parsed
        .ok()
        .filter(|doc| doc.get("error").is_some() || doc.get("error_code").is_some())
        .ok_or(EngineError::HttpStatus { status })
}
