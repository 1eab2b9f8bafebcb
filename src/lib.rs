//! Facade crate for the wayfind routing layer.
//!
//! This crate re-exports the core routing types and exposes the HTTP engine
//! adapter behind the `http-engine` feature flag.

#![forbid(unsafe_code)]

pub use wayfind_core::{
    BatchTravelTimes, Coordinate, Costing, EngineAction, EngineError, GeometryDecodeError,
    GeometryInput, IsochroneContour, LoadOutcome, MatrixBind, MatrixEntry, MatrixRunner,
    RouteSummary, RoutingContext, RoutingEngine, RoutingError, SnappedLocation, geometry,
};

#[cfg(feature = "http-engine")]
pub use wayfind_data::{
    EngineConfig, EngineLoadError, HttpEngine, HttpEngineConfig, load_engine_config,
    load_http_engine,
};
