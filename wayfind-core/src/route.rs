//! Normalized results of routing operations.
//!
//! All distances are metres and all durations seconds, whatever units the
//! engine reports in.

use geo::Polygon;
use serde::Serialize;

use crate::coordinate::Coordinate;
use crate::geometry::{encode_linestring, encode_polygon};

/// Sentinel distance or duration for an unreachable matrix cell.
pub const UNREACHABLE: f64 = -1.0;

/// A computed route between two endpoints.
///
/// `points` may be shorter than the engine's path when the caller capped the
/// number of points; `total_points` and `truncated` record that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    /// Route length in metres.
    pub distance_m: f64,
    /// Travel time in seconds.
    pub duration_s: f64,
    /// Path vertices in travel order.
    pub points: Vec<Coordinate>,
    /// Number of vertices in the engine's full path.
    pub total_points: usize,
    /// Whether `points` was cut at the caller's capacity.
    pub truncated: bool,
}

impl RouteSummary {
    /// Encode the (possibly truncated) path as a little-endian WKB linestring.
    ///
    /// Empty when the route has no points.
    #[must_use]
    pub fn to_wkb(&self) -> Vec<u8> {
        encode_linestring(&self.points)
    }
}

/// One cell of a many-to-many matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatrixEntry {
    /// Index into the source list.
    pub from_index: usize,
    /// Index into the target list.
    pub to_index: usize,
    /// Distance in metres, or [`UNREACHABLE`].
    pub distance_m: f64,
    /// Duration in seconds, or [`UNREACHABLE`].
    pub duration_s: f64,
}

impl MatrixEntry {
    /// Whether the engine found a path for this cell.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.distance_m >= 0.0 && self.duration_s >= 0.0
    }
}

/// A reachability boundary for one time budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsochroneContour {
    /// Travel-time budget in seconds.
    pub target_seconds: f64,
    /// Boundary polygon in `(lon, lat)` order.
    pub boundary: Polygon<f64>,
}

impl IsochroneContour {
    /// Encode the boundary as a little-endian WKB polygon.
    #[must_use]
    pub fn to_wkb(&self) -> Vec<u8> {
        encode_polygon(&self.boundary)
    }

    /// Exterior ring vertices as coordinates.
    pub fn exterior_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.boundary.exterior().0.iter().copied().map(Coordinate::from)
    }
}

/// A location moved onto the nearest road.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnappedLocation {
    /// Position on the road network.
    pub coordinate: Coordinate,
    /// Haversine distance in metres from the requested position.
    pub distance_m: f64,
}

/// Outcome of routing many origin/destination pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchTravelTimes {
    /// Seconds per pair, `-1` where routing failed.
    pub seconds: Vec<f64>,
    /// Number of pairs that produced a travel time.
    pub successes: usize,
}
