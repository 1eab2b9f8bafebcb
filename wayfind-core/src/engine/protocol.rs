//! JSON request builders and response readers for the engine actions.
//!
//! Builders are plain functions returning [`serde_json::Value`]; readers
//! first check for the engine's error document and then deserialize only the
//! fields they need. Units are normalized here: distances arrive in
//! kilometres and leave in metres.

use geo::{Distance, Haversine, LineString, Point, Polygon};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::EngineError;
use super::polyline;
use crate::coordinate::Coordinate;
use crate::costing::Costing;
use crate::route::{IsochroneContour, MatrixEntry, RouteSummary, SnappedLocation, UNREACHABLE};

const METRES_PER_KM: f64 = 1000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

fn location(coord: Coordinate) -> Value {
    json!({ "lat": coord.lat, "lon": coord.lon })
}

fn locations(coords: &[Coordinate]) -> Vec<Value> {
    coords.iter().copied().map(location).collect()
}

/// Build a point-to-point `route` request.
#[must_use]
pub fn route_request(from: Coordinate, to: Coordinate, costing: Costing) -> Value {
    json!({
        "locations": [location(from), location(to)],
        "costing": costing.as_str(),
        "directions_options": { "units": "kilometers" },
    })
}

/// Build a `sources_to_targets` request.
#[must_use]
pub fn matrix_request(sources: &[Coordinate], targets: &[Coordinate], costing: Costing) -> Value {
    json!({
        "sources": locations(sources),
        "targets": locations(targets),
        "costing": costing.as_str(),
    })
}

/// Build an `isochrone` request with one contour per budget in seconds.
#[must_use]
pub fn isochrone_request(origin: Coordinate, contour_seconds: &[f64], costing: Costing) -> Value {
    let contours: Vec<Value> = contour_seconds
        .iter()
        .map(|seconds| json!({ "time": seconds / SECONDS_PER_MINUTE }))
        .collect();
    json!({
        "locations": [location(origin)],
        "costing": costing.as_str(),
        "contours": contours,
        "polygons": true,
    })
}

/// Build a `locate` request for a single position.
#[must_use]
pub fn locate_request(at: Coordinate, costing: Costing) -> Value {
    json!({
        "locations": [location(at)],
        "costing": costing.as_str(),
        "verbose": true,
    })
}

/// Build a `status` request asking for graph statistics.
#[must_use]
pub fn status_request() -> Value {
    json!({ "verbose": true })
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    error: String,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    status_code: Option<i64>,
}

/// Fail with [`EngineError::Service`] when `response` is an error document.
///
/// # Errors
///
/// Returns the engine-reported code and message.
pub fn check_error(response: &Value) -> Result<(), EngineError> {
    if response.get("error").is_none() {
        return Ok(());
    }
    let doc = ErrorDocument::deserialize(response)?;
    Err(EngineError::Service {
        code: doc.error_code.or(doc.status_code).unwrap_or_default(),
        message: doc.error,
    })
}

#[derive(Debug, Deserialize)]
struct RouteDocument {
    trip: Trip,
}

#[derive(Debug, Deserialize)]
struct Trip {
    summary: TripSummary,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct TripSummary {
    length: f64,
    time: f64,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(default)]
    shape: String,
}

/// Read a `route` response, keeping at most `max_points` path vertices.
///
/// Leg shapes are decoded in order and concatenated.
///
/// # Errors
///
/// Fails on engine error documents, missing summary fields and malformed
/// shapes.
pub fn parse_route(response: &Value, max_points: usize) -> Result<RouteSummary, EngineError> {
    check_error(response)?;
    let doc = RouteDocument::deserialize(response)?;
    let mut points = Vec::new();
    for leg in &doc.trip.legs {
        points.extend(polyline::decode(&leg.shape)?);
    }
    let total_points = points.len();
    let truncated = total_points > max_points;
    points.truncate(max_points);
    Ok(RouteSummary {
        distance_m: doc.trip.summary.length * METRES_PER_KM,
        duration_s: doc.trip.summary.time,
        points,
        total_points,
        truncated,
    })
}

#[derive(Debug, Deserialize)]
struct MatrixDocument {
    sources_to_targets: Vec<Vec<MatrixCell>>,
}

#[derive(Debug, Deserialize)]
struct MatrixCell {
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    time: Option<f64>,
}

/// Read a `sources_to_targets` response into row-major entries.
///
/// Exactly `sources * targets` entries are produced; cells the engine left
/// out or set to `null` become [`UNREACHABLE`], and cells beyond the
/// requested shape are ignored.
///
/// # Errors
///
/// Fails on engine error documents and when the matrix is absent.
pub fn parse_matrix(
    response: &Value,
    sources: usize,
    targets: usize,
) -> Result<Vec<MatrixEntry>, EngineError> {
    check_error(response)?;
    let doc = MatrixDocument::deserialize(response)?;
    let mut entries = Vec::with_capacity(sources.saturating_mul(targets));
    for from_index in 0..sources {
        let row = doc.sources_to_targets.get(from_index);
        for to_index in 0..targets {
            let cell = row.and_then(|cells| cells.get(to_index));
            let distance_m = cell
                .and_then(|c| c.distance)
                .map_or(UNREACHABLE, |km| km * METRES_PER_KM);
            let duration_s = cell.and_then(|c| c.time).unwrap_or(UNREACHABLE);
            entries.push(MatrixEntry {
                from_index,
                to_index,
                distance_m,
                duration_s,
            });
        }
    }
    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    contour: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum FeatureGeometry {
    Polygon(Vec<Vec<Vec<f64>>>),
    LineString(Vec<Vec<f64>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

fn ring(positions: &[Vec<f64>]) -> LineString<f64> {
    positions
        .iter()
        .filter_map(|pos| match pos.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .into()
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Polygon<f64> {
    let mut iter = rings.iter();
    let exterior = iter.next().map_or_else(|| LineString::new(Vec::new()), |r| ring(r));
    Polygon::new(exterior, iter.map(|r| ring(r)).collect())
}

impl FeatureGeometry {
    fn into_polygon(self) -> Polygon<f64> {
        match self {
            Self::Polygon(rings) => polygon(&rings),
            Self::LineString(line) => Polygon::new(ring(&line), Vec::new()),
            Self::MultiPolygon(parts) => parts
                .first()
                .map_or_else(|| polygon(&[]), |rings| polygon(rings)),
        }
    }
}

/// Read an `isochrone` GeoJSON response.
///
/// Each feature's `contour` property (minutes) sets its budget; features
/// without one take the requested budget at the same position.
///
/// # Errors
///
/// Fails on engine error documents and on unexpected geometry types.
pub fn parse_isochrone(
    response: &Value,
    requested_seconds: &[f64],
) -> Result<Vec<IsochroneContour>, EngineError> {
    check_error(response)?;
    let doc = FeatureCollection::deserialize(response)?;
    Ok(doc
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let target_seconds = feature.properties.contour.map_or_else(
                || requested_seconds.get(index).copied().unwrap_or(UNREACHABLE),
                |minutes| minutes * SECONDS_PER_MINUTE,
            );
            IsochroneContour {
                target_seconds,
                boundary: feature.geometry.into_polygon(),
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct LocatedPoint {
    #[serde(default)]
    edges: Option<Vec<LocatedEdge>>,
}

#[derive(Debug, Deserialize)]
struct LocatedEdge {
    correlated_lat: f64,
    correlated_lon: f64,
}

/// Read a `locate` response, snapping `requested` to the first edge.
///
/// # Errors
///
/// [`EngineError::MissingField`] when the engine found no nearby edge.
pub fn parse_locate(response: &Value, requested: Coordinate) -> Result<SnappedLocation, EngineError> {
    check_error(response)?;
    let located = Vec::<LocatedPoint>::deserialize(response)?;
    let edge = located
        .into_iter()
        .next()
        .and_then(|point| point.edges)
        .and_then(|edges| edges.into_iter().next())
        .ok_or(EngineError::MissingField { field: "edges" })?;
    let coordinate = Coordinate {
        lat: edge.correlated_lat,
        lon: edge.correlated_lon,
    };
    let distance_m = Haversine.distance(Point::from(requested), Point::from(coordinate));
    Ok(SnappedLocation {
        coordinate,
        distance_m,
    })
}

/// Read the graph node count from a `status` response.
///
/// # Errors
///
/// [`EngineError::MissingField`] when the engine does not report it.
pub fn parse_node_count(response: &Value) -> Result<u64, EngineError> {
    check_error(response)?;
    response
        .get("node_count")
        .and_then(Value::as_u64)
        .ok_or(EngineError::MissingField {
            field: "node_count",
        })
}
