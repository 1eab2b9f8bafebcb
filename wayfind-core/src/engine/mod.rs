//! The contract between this crate and the external routing engine.
//!
//! The engine is a black box that accepts a named [`EngineAction`] with a
//! JSON request document and answers with a JSON response document. Tile
//! loading, graph search and cost models all live on the far side of
//! [`RoutingEngine::execute`]. [`protocol`] builds the requests and
//! normalizes the responses this crate relies on.

mod action;
mod error;
pub mod polyline;
pub mod protocol;

pub use action::EngineAction;
pub use error::EngineError;

use serde_json::Value;

/// A routing engine reachable through the JSON action protocol.
///
/// Implementations are driven by [`crate::RoutingContext`], which holds an
/// exclusive lock around every call, so `execute` takes `&mut self` and need
/// not be thread-safe beyond `Send`.
///
/// # Examples
///
/// ```rust
/// use serde_json::{json, Value};
/// use wayfind_core::engine::{EngineAction, EngineError, RoutingEngine};
///
/// struct Fixed;
///
/// impl RoutingEngine for Fixed {
///     fn execute(&mut self, action: EngineAction, _request: &Value) -> Result<Value, EngineError> {
///         match action {
///             EngineAction::Status => Ok(json!({ "node_count": 7 })),
///             other => Err(EngineError::UnknownAction { name: other.to_string() }),
///         }
///     }
/// }
///
/// let mut engine = Fixed;
/// let status = engine.execute(EngineAction::Status, &json!({}))?;
/// assert_eq!(status["node_count"], 7);
/// # Ok::<(), EngineError>(())
/// ```
pub trait RoutingEngine: Send {
    /// Whether the engine can serve requests.
    ///
    /// Checked before every operation; a loaded but unready engine is
    /// reported as not loaded.
    fn is_ready(&self) -> bool {
        true
    }

    /// Run `action` with `request` and return the raw response document.
    ///
    /// Engine error documents may be returned as `Ok`; callers inspect them
    /// with [`protocol::check_error`].
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the engine cannot be reached or its
    /// answer cannot be read as JSON.
    fn execute(&mut self, action: EngineAction, request: &Value) -> Result<Value, EngineError>;
}

impl<E: RoutingEngine + ?Sized> RoutingEngine for Box<E> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn execute(&mut self, action: EngineAction, request: &Value) -> Result<Value, EngineError> {
        (**self).execute(action, request)
    }
}
