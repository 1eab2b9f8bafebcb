//! Geographic coordinates used as routing endpoints and path vertices.

use geo::{Coord, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive latitude bounds in degrees.
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
/// Inclusive longitude bounds in degrees.
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A WGS84 position expressed as latitude and longitude in degrees.
///
/// Fields are public so engine responses can be mapped without ceremony;
/// [`Coordinate::new`] is the validating constructor for caller input.
///
/// # Examples
///
/// ```
/// use wayfind_core::Coordinate;
///
/// # fn main() -> Result<(), wayfind_core::CoordinateError> {
/// let san_marino = Coordinate::new(43.94, 12.45)?;
/// assert_eq!(san_marino.lon, 12.45);
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub lon: f64,
}

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude or longitude fell outside the valid range (or was NaN).
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    OutOfRange {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lon: f64,
    },
}

impl Coordinate {
    /// Validates and constructs a [`Coordinate`].
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if is_plausible(lon, lat) {
            Ok(Self { lat, lon })
        } else {
            Err(CoordinateError::OutOfRange { lat, lon })
        }
    }

    /// Builds a coordinate from an `(x, y)` pair as stored in WKT and WKB.
    pub fn from_xy(x: f64, y: f64) -> Result<Self, CoordinateError> {
        Self::new(y, x)
    }

    /// Return whether both fields lie within their valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_plausible(self.lon, self.lat)
    }
}

/// Return whether `(x, y)` reads as a longitude/latitude pair.
///
/// NaN fails both range checks.
#[must_use]
pub fn is_plausible(x: f64, y: f64) -> bool {
    LONGITUDE_RANGE.contains(&x) && LATITUDE_RANGE.contains(&y)
}

impl From<Coordinate> for Coord<f64> {
    fn from(value: Coordinate) -> Self {
        Self {
            x: value.lon,
            y: value.lat,
        }
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(value: Coordinate) -> Self {
        Self::new(value.lon, value.lat)
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(value: Coord<f64>) -> Self {
        Self {
            lat: value.y,
            lon: value.x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_values(#[case] lat: f64, #[case] lon: f64) {
        assert!(Coordinate::new(lat, lon).is_ok());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(0.0, -180.5)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_out_of_range(#[case] lat: f64, #[case] lon: f64) {
        assert!(matches!(
            Coordinate::new(lat, lon),
            Err(CoordinateError::OutOfRange { .. })
        ));
    }

    #[rstest]
    fn converts_to_geo_with_x_as_longitude() {
        let coord = Coordinate {
            lat: 45.46,
            lon: 9.19,
        };
        let geo: Coord<f64> = coord.into();
        assert_eq!(geo, Coord { x: 9.19, y: 45.46 });
        assert_eq!(Coordinate::from(geo), coord);
    }
}
