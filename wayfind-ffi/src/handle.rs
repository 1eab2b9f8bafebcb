//! The opaque context handed to C callers.

use wayfind_core::{RoutingContext, RoutingEngine};

use crate::error::{BoundaryError, FfiError};

/// Engine slot shared by every call made with one handle.
///
/// C callers only see a pointer. Rust embedders can construct one around
/// their own engine with [`WayfindContext::with_engine`].
#[derive(Debug, Default)]
pub struct WayfindContext {
    routing: RoutingContext<Box<dyn RoutingEngine>>,
}

impl WayfindContext {
    /// A context with no engine loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context around an already constructed engine.
    #[must_use]
    pub fn with_engine(engine: Box<dyn RoutingEngine>) -> Self {
        Self {
            routing: RoutingContext::with_engine(engine),
        }
    }

    /// The routing context behind the handle.
    #[must_use]
    pub const fn routing(&self) -> &RoutingContext<Box<dyn RoutingEngine>> {
        &self.routing
    }
}

/// Borrow the context behind a handle.
///
/// # Safety
///
/// A non-null `ptr` must come from [`crate::wayfind_context_new`] and not
/// have been freed.
pub(crate) unsafe fn context<'a>(ptr: *const WayfindContext) -> Result<&'a WayfindContext, FfiError> {
    // SAFETY: `as_ref` checks for null; liveness is the caller's contract.
    unsafe { ptr.as_ref() }.ok_or_else(|| BoundaryError::NullPointer { name: "ctx" }.into())
}
