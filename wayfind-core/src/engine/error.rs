use thiserror::Error;

/// Failures reported by, or while talking to, the routing engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine could not be reached.
    #[error("engine transport failed: {message}")]
    Transport {
        /// Underlying transport error.
        message: String,
    },
    /// The engine did not answer within the configured timeout.
    #[error("engine request timed out")]
    Timeout,
    /// The transport returned a non-success status without an error document.
    #[error("engine returned HTTP status {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },
    /// The engine reported a domain error, such as no path between locations.
    #[error("engine error {code}: {message}")]
    Service {
        /// Engine-specific error code.
        code: i64,
        /// Human-readable description.
        message: String,
    },
    /// The response could not be interpreted.
    #[error("failed to parse engine response: {message}")]
    Parse {
        /// What went wrong.
        message: String,
    },
    /// The requested action is not part of the engine protocol.
    #[error("unknown engine action '{name}'")]
    UnknownAction {
        /// Name supplied by the caller.
        name: String,
    },
    /// A response lacked a field the operation depends on.
    #[error("engine response is missing `{field}`")]
    MissingField {
        /// Name or path of the missing field.
        field: &'static str,
    },
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse {
            message: value.to_string(),
        }
    }
}
