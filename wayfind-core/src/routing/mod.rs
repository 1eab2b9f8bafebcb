//! Request orchestration over a shared engine handle.

mod context;
mod endpoints;
mod matrix;

pub use context::{FAILED_TRAVEL_TIME, LoadOutcome, RoutingContext, UNLIMITED_POINTS};
pub use endpoints::{RequestPath, ResolvedEndpoints, request_path, resolve_endpoints};
pub use matrix::{DEFAULT_PAGE_SIZE, MatrixBind, MatrixRunner};
