//! Error taxonomy for routing operations.
//!
//! The variants keep the full cause; boundary adapters flatten them to
//! integer status codes with [`RoutingError::status_code`].

use thiserror::Error;

use crate::engine::EngineError;
use crate::geometry::GeometryDecodeError;

/// Status reported across integer boundaries for success.
pub const STATUS_OK: i32 = 0;
/// Status for any failure other than a missing engine.
pub const STATUS_FAILED: i32 = -1;
/// Status when no engine is loaded.
pub const STATUS_NOT_LOADED: i32 = -2;

/// Errors from [`crate::RoutingContext`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// No engine is loaded, or the loaded engine is not ready.
    #[error("routing engine is not loaded")]
    EngineNotLoaded,
    /// An endpoint geometry yielded no usable coordinate.
    #[error("failed to decode endpoint geometry: {0}")]
    GeometryDecode(#[from] GeometryDecodeError),
    /// The engine rejected or failed the request.
    #[error("engine request failed: {0}")]
    EngineRequest(#[from] EngineError),
    /// Caller input was rejected before reaching the engine.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected input.
        message: String,
    },
}

impl RoutingError {
    /// Build an [`RoutingError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Flatten to the integer sentinel convention.
    ///
    /// # Examples
    /// ```
    /// use wayfind_core::{RoutingError, STATUS_FAILED, STATUS_NOT_LOADED};
    ///
    /// assert_eq!(RoutingError::EngineNotLoaded.status_code(), STATUS_NOT_LOADED);
    /// assert_eq!(RoutingError::invalid("bad costing").status_code(), STATUS_FAILED);
    /// ```
    #[must_use]
    pub const fn status_code(&self) -> i32 {
        match self {
            Self::EngineNotLoaded => STATUS_NOT_LOADED,
            Self::GeometryDecode(_) | Self::EngineRequest(_) | Self::InvalidArgument { .. } => {
                STATUS_FAILED
            }
        }
    }
}
