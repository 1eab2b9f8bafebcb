//! `#[repr(C)]` records written into caller-owned buffers.

use wayfind_core::{Coordinate, IsochroneContour, MatrixEntry, RouteSummary};

/// One point of a route path.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoutePoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl From<Coordinate> for RoutePoint {
    fn from(value: Coordinate) -> Self {
        Self {
            lat: value.lat,
            lon: value.lon,
        }
    }
}

impl From<RoutePoint> for Coordinate {
    fn from(value: RoutePoint) -> Self {
        Self {
            lat: value.lat,
            lon: value.lon,
        }
    }
}

/// Route summary written alongside the path points.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteResult {
    /// Road distance in metres.
    pub distance_m: f64,
    /// Travel time in seconds.
    pub duration_s: f64,
    /// Number of path points written to the caller's buffer.
    pub num_points: i32,
}

impl RouteResult {
    pub(crate) fn from_summary(summary: &RouteSummary, written: i32) -> Self {
        Self {
            distance_m: summary.distance_m,
            duration_s: summary.duration_s,
            num_points: written,
        }
    }
}

/// A boundary vertex of a reachability contour.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IsochronePoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Travel-time budget of the contour in seconds.
    pub seconds: f64,
}

impl IsochronePoint {
    pub(crate) fn vertices(contour: &IsochroneContour) -> impl Iterator<Item = Self> + '_ {
        contour.exterior_coordinates().map(|c| Self {
            lat: c.lat,
            lon: c.lon,
            seconds: contour.target_seconds,
        })
    }
}

/// One cell of a many-to-many matrix.
///
/// Unreachable cells carry `-1` distance and duration.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatrixCell {
    /// Index into the source list.
    pub from_index: i32,
    /// Index into the target list.
    pub to_index: i32,
    /// Road distance in metres.
    pub distance_m: f64,
    /// Travel time in seconds.
    pub duration_s: f64,
}

impl From<&MatrixEntry> for MatrixCell {
    fn from(value: &MatrixEntry) -> Self {
        Self {
            from_index: i32::try_from(value.from_index).unwrap_or(i32::MAX),
            to_index: i32::try_from(value.to_index).unwrap_or(i32::MAX),
            distance_m: value.distance_m,
            duration_s: value.duration_s,
        }
    }
}
