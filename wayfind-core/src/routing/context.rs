//! The routing context: one engine handle behind one lock.
//!
//! Every operation locks the slot, checks that an engine is loaded and
//! ready, builds the request, calls the engine and normalizes the response
//! before releasing the lock. Operations are therefore fully serialized.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use serde_json::Value;

use super::endpoints::resolve_endpoints;
use crate::coordinate::Coordinate;
use crate::costing::Costing;
use crate::engine::{EngineAction, EngineError, RoutingEngine, protocol};
use crate::error::RoutingError;
use crate::geometry::GeometryInput;
use crate::route::{
    BatchTravelTimes, IsochroneContour, MatrixEntry, RouteSummary, SnappedLocation,
};

/// Point limit meaning "keep the whole path".
pub const UNLIMITED_POINTS: usize = usize::MAX;
/// Travel time recorded for a batch pair that could not be routed.
pub const FAILED_TRAVEL_TIME: f64 = -1.0;

/// What [`RoutingContext::load_with`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No engine was loaded; one is now.
    Loaded,
    /// The same source was already loaded; nothing changed.
    AlreadyLoaded,
    /// An engine from another source was replaced.
    Replaced,
}

struct LoadedEngine<E> {
    source: Option<String>,
    engine: E,
}

/// Owner of the engine handle and the lock serializing access to it.
///
/// # Examples
///
/// ```
/// use wayfind_core::{Coordinate, Costing, RoutingContext, RoutingError};
/// use wayfind_core::test_support::StubEngine;
///
/// let context: RoutingContext<StubEngine> = RoutingContext::new();
/// let from = Coordinate { lat: 43.94, lon: 12.45 };
/// let to = Coordinate { lat: 43.93, lon: 12.44 };
/// assert_eq!(
///     context.travel_time(from, to, Costing::Auto),
///     Err(RoutingError::EngineNotLoaded)
/// );
/// ```
pub struct RoutingContext<E> {
    slot: Mutex<Option<LoadedEngine<E>>>,
}

impl<E> Default for RoutingContext<E> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<E> std::fmt::Debug for RoutingContext<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.lock();
        f.debug_struct("RoutingContext")
            .field("loaded", &slot.is_some())
            .field("source", &slot.as_ref().and_then(|l| l.source.as_deref()))
            .finish()
    }
}

impl<E> RoutingContext<E> {
    /// Create a context with no engine loaded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Create a context around an already constructed engine.
    #[must_use]
    pub fn with_engine(engine: E) -> Self {
        Self {
            slot: Mutex::new(Some(LoadedEngine {
                source: None,
                engine,
            })),
        }
    }

    /// Install `engine`, replacing any loaded engine.
    pub fn install(&self, engine: E) {
        *self.lock() = Some(LoadedEngine {
            source: None,
            engine,
        });
        info!("routing engine installed");
    }

    /// Load an engine identified by `source`.
    ///
    /// Loading the source that is already loaded does nothing and does not
    /// call `loader`. Loading a different source replaces the engine only if
    /// `loader` succeeds.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `loader`.
    pub fn load_with<F, Err>(&self, source: &str, loader: F) -> Result<LoadOutcome, Err>
    where
        F: FnOnce() -> Result<E, Err>,
    {
        let mut slot = self.lock();
        let replacing = match slot.as_ref() {
            Some(loaded) if loaded.source.as_deref() == Some(source) => {
                debug!("routing engine for {source} already loaded");
                return Ok(LoadOutcome::AlreadyLoaded);
            }
            Some(_) => true,
            None => false,
        };
        let engine = loader()?;
        *slot = Some(LoadedEngine {
            source: Some(source.to_owned()),
            engine,
        });
        info!("routing engine loaded from {source}");
        Ok(if replacing {
            LoadOutcome::Replaced
        } else {
            LoadOutcome::Loaded
        })
    }

    /// Drop the loaded engine. Returns whether one was loaded.
    pub fn unload(&self) -> bool {
        let unloaded = self.lock().take().is_some();
        if unloaded {
            info!("routing engine unloaded");
        }
        unloaded
    }

    /// The source of the loaded engine, if it was loaded from one.
    #[must_use]
    pub fn loaded_source(&self) -> Option<String> {
        self.lock().as_ref().and_then(|l| l.source.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<LoadedEngine<E>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: RoutingEngine> RoutingContext<E> {
    /// Whether an engine is loaded and ready.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.lock().as_ref().is_some_and(|l| l.engine.is_ready())
    }

    /// Run `op` against the ready engine while holding the lock.
    fn with_ready_engine<T>(
        &self,
        op: impl FnOnce(&mut E) -> Result<T, RoutingError>,
    ) -> Result<T, RoutingError> {
        let mut slot = self.lock();
        let loaded = slot
            .as_mut()
            .filter(|l| l.engine.is_ready())
            .ok_or(RoutingError::EngineNotLoaded)?;
        op(&mut loaded.engine)
    }

    /// Travel time in seconds between two coordinates.
    ///
    /// # Errors
    ///
    /// [`RoutingError::EngineNotLoaded`], invalid coordinates, or the
    /// engine's failure (including "no route").
    pub fn travel_time(
        &self,
        from: Coordinate,
        to: Coordinate,
        costing: Costing,
    ) -> Result<f64, RoutingError> {
        self.with_ready_engine(|engine| {
            ensure_valid(&[from, to])?;
            Ok(route_once(engine, from, to, costing, 0)?.duration_s)
        })
    }

    /// Travel times for parallel origin and destination lists.
    ///
    /// All pairs are routed under one lock acquisition. A pair that fails
    /// yields `-1` in its slot instead of failing the batch.
    ///
    /// # Errors
    ///
    /// [`RoutingError::EngineNotLoaded`], or
    /// [`RoutingError::InvalidArgument`] when the lists differ in length.
    pub fn batch_travel_time(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
        costing: Costing,
    ) -> Result<BatchTravelTimes, RoutingError> {
        self.with_ready_engine(|engine| {
            if origins.len() != destinations.len() {
                return Err(RoutingError::invalid(format!(
                    "{} origins but {} destinations",
                    origins.len(),
                    destinations.len()
                )));
            }
            let seconds: Vec<f64> = origins
                .iter()
                .zip(destinations)
                .enumerate()
                .map(|(index, (&from, &to))| {
                    let outcome = if from.is_valid() && to.is_valid() {
                        route_once(engine, from, to, costing, 0).map_err(RoutingError::from)
                    } else {
                        Err(RoutingError::invalid("coordinate out of range"))
                    };
                    outcome.map_or_else(
                        |error| {
                            debug!("batch pair {index} failed: {error}");
                            FAILED_TRAVEL_TIME
                        },
                        |summary| summary.duration_s,
                    )
                })
                .collect();
            let successes = seconds.iter().filter(|&&s| s >= 0.0).count();
            Ok(BatchTravelTimes { seconds, successes })
        })
    }

    /// Full route between two coordinates, keeping at most `max_points`.
    ///
    /// # Errors
    ///
    /// As for [`RoutingContext::travel_time`].
    pub fn route(
        &self,
        from: Coordinate,
        to: Coordinate,
        costing: Costing,
        max_points: usize,
    ) -> Result<RouteSummary, RoutingError> {
        self.with_ready_engine(|engine| {
            ensure_valid(&[from, to])?;
            Ok(route_once(engine, from, to, costing, max_points)?)
        })
    }

    /// Full route between two geometry-addressed endpoints.
    ///
    /// Engine readiness is checked before either geometry is classified.
    ///
    /// # Errors
    ///
    /// [`RoutingError::EngineNotLoaded`], [`RoutingError::GeometryDecode`]
    /// for either endpoint, or the engine's failure.
    pub fn route_geometries(
        &self,
        from: &GeometryInput<'_>,
        to: &GeometryInput<'_>,
        costing: Costing,
        max_points: usize,
    ) -> Result<RouteSummary, RoutingError> {
        self.with_ready_engine(|engine| {
            let endpoints = resolve_endpoints(from, to)?;
            // Text and binary paths both reach the engine as coordinates.
            Ok(route_once(
                engine,
                endpoints.from.coordinate,
                endpoints.to.coordinate,
                costing,
                max_points,
            )?)
        })
    }

    /// Route between two WKT endpoints.
    ///
    /// # Errors
    ///
    /// As for [`RoutingContext::route_geometries`].
    pub fn route_wkt(
        &self,
        from: &str,
        to: &str,
        costing: Costing,
        max_points: usize,
    ) -> Result<RouteSummary, RoutingError> {
        self.route_geometries(
            &GeometryInput::text(from),
            &GeometryInput::text(to),
            costing,
            max_points,
        )
    }

    /// Route between two binary geometry endpoints.
    ///
    /// # Errors
    ///
    /// As for [`RoutingContext::route_geometries`].
    pub fn route_wkb(
        &self,
        from: &[u8],
        to: &[u8],
        costing: Costing,
        max_points: usize,
    ) -> Result<RouteSummary, RoutingError> {
        self.route_geometries(
            &GeometryInput::blob(from),
            &GeometryInput::blob(to),
            costing,
            max_points,
        )
    }

    /// Many-to-many matrix in row-major order.
    ///
    /// Empty source or target lists produce an empty matrix without a
    /// request.
    ///
    /// # Errors
    ///
    /// [`RoutingError::EngineNotLoaded`], invalid coordinates, or the
    /// engine's failure.
    pub fn matrix(
        &self,
        sources: &[Coordinate],
        targets: &[Coordinate],
        costing: Costing,
    ) -> Result<Vec<MatrixEntry>, RoutingError> {
        self.with_ready_engine(|engine| {
            if sources.is_empty() || targets.is_empty() {
                return Ok(Vec::new());
            }
            ensure_valid(sources)?;
            ensure_valid(targets)?;
            let request = protocol::matrix_request(sources, targets, costing);
            let response = dispatch(engine, EngineAction::SourcesToTargets, &request)?;
            Ok(protocol::parse_matrix(
                &response,
                sources.len(),
                targets.len(),
            )?)
        })
    }

    /// Reachability contours around `origin`, one per budget in seconds.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidArgument`] for an empty or non-positive budget
    /// list, otherwise as for [`RoutingContext::travel_time`].
    pub fn isochrone(
        &self,
        origin: Coordinate,
        contour_seconds: &[f64],
        costing: Costing,
    ) -> Result<Vec<IsochroneContour>, RoutingError> {
        self.with_ready_engine(|engine| {
            ensure_valid(&[origin])?;
            if contour_seconds.is_empty()
                || contour_seconds
                    .iter()
                    .any(|s| !s.is_finite() || *s <= 0.0)
            {
                return Err(RoutingError::invalid(
                    "isochrone budgets must be positive seconds",
                ));
            }
            let request = protocol::isochrone_request(origin, contour_seconds, costing);
            let response = dispatch(engine, EngineAction::Isochrone, &request)?;
            Ok(protocol::parse_isochrone(&response, contour_seconds)?)
        })
    }

    /// Snap `at` to the nearest road.
    ///
    /// # Errors
    ///
    /// As for [`RoutingContext::travel_time`]; no nearby road is
    /// [`EngineError::MissingField`].
    pub fn locate(&self, at: Coordinate, costing: Costing) -> Result<SnappedLocation, RoutingError> {
        self.with_ready_engine(|engine| {
            ensure_valid(&[at])?;
            let request = protocol::locate_request(at, costing);
            let response = dispatch(engine, EngineAction::Locate, &request)?;
            Ok(protocol::parse_locate(&response, at)?)
        })
    }

    /// Number of nodes in the loaded graph.
    ///
    /// # Errors
    ///
    /// [`RoutingError::EngineNotLoaded`], or
    /// [`EngineError::MissingField`] when the engine does not report it.
    pub fn node_count(&self) -> Result<u64, RoutingError> {
        self.with_ready_engine(|engine| {
            let response = dispatch(engine, EngineAction::Status, &protocol::status_request())?;
            Ok(protocol::parse_node_count(&response)?)
        })
    }

    /// Pass a raw JSON request through to `action` and return the response.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidArgument`] when `request` is not JSON, an
    /// engine error document as [`EngineError::Service`], or any other
    /// engine failure.
    pub fn raw_request(&self, action: EngineAction, request: &str) -> Result<String, RoutingError> {
        self.with_ready_engine(|engine| {
            let document: Value = serde_json::from_str(request)
                .map_err(|e| RoutingError::invalid(format!("request is not JSON: {e}")))?;
            let response = dispatch(engine, action, &document)?;
            protocol::check_error(&response)?;
            serde_json::to_string(&response).map_err(|e| EngineError::from(e).into())
        })
    }
}

fn dispatch<E: RoutingEngine>(
    engine: &mut E,
    action: EngineAction,
    request: &Value,
) -> Result<Value, EngineError> {
    debug!("dispatching {action} request");
    engine.execute(action, request)
}

fn route_once<E: RoutingEngine>(
    engine: &mut E,
    from: Coordinate,
    to: Coordinate,
    costing: Costing,
    max_points: usize,
) -> Result<RouteSummary, EngineError> {
    let request = protocol::route_request(from, to, costing);
    let response = dispatch(engine, EngineAction::Route, &request)?;
    let summary = protocol::parse_route(&response, max_points)?;
    if summary.truncated && max_points > 0 {
        warn!(
            "route path truncated to {max_points} of {} points",
            summary.total_points
        );
    }
    Ok(summary)
}

fn ensure_valid(coords: &[Coordinate]) -> Result<(), RoutingError> {
    coords.iter().find(|c| !c.is_valid()).map_or(Ok(()), |bad| {
        Err(RoutingError::invalid(format!(
            "coordinate out of range: lat={}, lon={}",
            bad.lat, bad.lon
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use crate::test_support::{StubEngine, route_response};

    const SAN_MARINO: Coordinate = Coordinate {
        lat: 43.94,
        lon: 12.45,
    };
    const BORGO: Coordinate = Coordinate {
        lat: 43.93,
        lon: 12.44,
    };

    #[fixture]
    fn loaded() -> RoutingContext<StubEngine> {
        RoutingContext::with_engine(
            StubEngine::new()
                .respond(
                    EngineAction::Route,
                    route_response(2.5, 300.0, &[&[SAN_MARINO, BORGO]]),
                )
                .respond(EngineAction::Status, json!({ "node_count": 42 })),
        )
    }

    #[rstest]
    fn unloaded_context_reports_not_loaded() {
        let context = RoutingContext::<StubEngine>::new();
        assert!(!context.is_loaded());
        assert_eq!(context.node_count(), Err(RoutingError::EngineNotLoaded));
    }

    #[rstest]
    fn unready_engine_counts_as_not_loaded() {
        let context = RoutingContext::with_engine(StubEngine::new().not_ready());
        assert!(!context.is_loaded());
        assert_eq!(
            context.route_wkt("garbage", "garbage", Costing::Auto, 10),
            Err(RoutingError::EngineNotLoaded)
        );
    }

    #[rstest]
    fn travel_time_uses_route_duration(loaded: RoutingContext<StubEngine>) {
        assert_eq!(
            loaded.travel_time(SAN_MARINO, BORGO, Costing::Pedestrian),
            Ok(300.0)
        );
    }

    #[rstest]
    fn route_rejects_out_of_range_coordinates(loaded: RoutingContext<StubEngine>) {
        let bad = Coordinate {
            lat: 95.0,
            lon: 0.0,
        };
        assert!(matches!(
            loaded.route(bad, BORGO, Costing::Auto, 10),
            Err(RoutingError::InvalidArgument { .. })
        ));
    }

    #[rstest]
    fn route_wkt_resolves_centroids(loaded: RoutingContext<StubEngine>) {
        let summary = loaded
            .route_wkt(
                "POINT(12.45 43.94)",
                "POINT(12.44 43.93)",
                Costing::Auto,
                UNLIMITED_POINTS,
            )
            .expect("route succeeds");
        assert_eq!(summary.distance_m, 2500.0);
        assert_eq!(summary.points.len(), 2);
    }

    #[rstest]
    fn load_is_idempotent_per_source() {
        let context = RoutingContext::new();
        let first = context.load_with("/tiles/a.json", || Ok::<_, EngineError>(StubEngine::new()));
        let again = context.load_with("/tiles/a.json", || -> Result<StubEngine, EngineError> {
            Err(EngineError::Timeout)
        });
        let other = context.load_with("/tiles/b.json", || Ok::<_, EngineError>(StubEngine::new()));

        assert_eq!(first, Ok(LoadOutcome::Loaded));
        assert_eq!(again, Ok(LoadOutcome::AlreadyLoaded));
        assert_eq!(other, Ok(LoadOutcome::Replaced));
        assert_eq!(context.loaded_source().as_deref(), Some("/tiles/b.json"));
    }

    #[rstest]
    fn failed_reload_keeps_previous_engine(loaded: RoutingContext<StubEngine>) {
        let result = loaded.load_with("/tiles/c.json", || -> Result<StubEngine, EngineError> {
            Err(EngineError::Timeout)
        });
        assert_eq!(result, Err(EngineError::Timeout));
        assert_eq!(loaded.node_count(), Ok(42));
    }

    #[rstest]
    fn unload_drops_the_engine(loaded: RoutingContext<StubEngine>) {
        assert!(loaded.unload());
        assert!(!loaded.unload());
        assert_eq!(loaded.node_count(), Err(RoutingError::EngineNotLoaded));
    }

    #[rstest]
    fn raw_request_rejects_invalid_json(loaded: RoutingContext<StubEngine>) {
        assert!(matches!(
            loaded.raw_request(EngineAction::Status, "{not json"),
            Err(RoutingError::InvalidArgument { .. })
        ));
    }

    #[rstest]
    fn raw_request_returns_serialized_response(loaded: RoutingContext<StubEngine>) {
        let body = loaded
            .raw_request(EngineAction::Status, "{}")
            .expect("status succeeds");
        assert_eq!(body, r#"{"node_count":42}"#);
    }

    #[rstest]
    fn isochrone_rejects_non_positive_budgets(loaded: RoutingContext<StubEngine>) {
        assert!(matches!(
            loaded.isochrone(SAN_MARINO, &[600.0, 0.0], Costing::Auto),
            Err(RoutingError::InvalidArgument { .. })
        ));
    }
}
