//! Core routing types and orchestration for wayfind.
//!
//! The crate turns caller input (raw coordinates, or geometry in WKT, WKB or
//! a columnar engine's internal encoding) into routing endpoints, drives an
//! external routing engine through [`RoutingContext`], and normalizes and
//! re-encodes what the engine returns.
//!
//! Geometry handling in [`geometry`] is pure and lock-free. Everything that
//! touches the engine goes through the context's lock.

mod coordinate;
mod costing;
pub mod engine;
mod error;
pub mod geometry;
mod route;
pub mod routing;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use coordinate::{Coordinate, CoordinateError, LATITUDE_RANGE, LONGITUDE_RANGE, is_plausible};
pub use costing::Costing;
pub use engine::{EngineAction, EngineError, RoutingEngine};
pub use error::{RoutingError, STATUS_FAILED, STATUS_NOT_LOADED, STATUS_OK};
pub use geometry::{GeometryDecodeError, GeometryInput};
pub use route::{
    BatchTravelTimes, IsochroneContour, MatrixEntry, RouteSummary, SnappedLocation, UNREACHABLE,
};
pub use routing::{
    DEFAULT_PAGE_SIZE, LoadOutcome, MatrixBind, MatrixRunner, RoutingContext, UNLIMITED_POINTS,
};
