//! WKB encoding of route paths and isochrone boundaries.
//!
//! Output is always little-endian standard WKB. An empty path encodes to an
//! empty byte vector rather than an empty linestring so callers can map it to
//! a null geometry.

use byteorder::LittleEndian;
use geo::Polygon;

use super::classify::{LINESTRING_TYPE, POLYGON_TYPE};
use super::codec::{CoordinateReader, CoordinateWriter, Endianness, PAIR_LEN};
use super::error::GeometryDecodeError;
use crate::coordinate::Coordinate;

/// Bytes occupied by a linestring header (flag, type, count).
pub const LINESTRING_HEADER_LEN: usize = 9;

/// Encode a path as a little-endian WKB linestring.
///
/// Points are written as `(lon, lat)`. Returns an empty vector when `points`
/// is empty.
///
/// # Examples
///
/// ```
/// use wayfind_core::{geometry::encode_linestring, Coordinate};
///
/// let path = [
///     Coordinate { lat: 43.94, lon: 12.45 },
///     Coordinate { lat: 43.93, lon: 12.44 },
/// ];
/// assert_eq!(encode_linestring(&path).len(), 9 + 2 * 16);
/// assert!(encode_linestring(&[]).is_empty());
/// ```
#[must_use]
pub fn encode_linestring(points: &[Coordinate]) -> Vec<u8> {
    if points.is_empty() {
        return Vec::new();
    }
    let mut writer = CoordinateWriter::<LittleEndian>::with_capacity(
        LINESTRING_HEADER_LEN + points.len() * PAIR_LEN,
    );
    writer.header(LINESTRING_TYPE).u32(count(points.len()));
    for point in points {
        writer.pair(point.lon, point.lat);
    }
    writer.finish()
}

/// Encode a polygon as little-endian WKB, exterior ring first.
///
/// Rings are written as stored; `geo` keeps them closed.
#[must_use]
pub fn encode_polygon(polygon: &Polygon<f64>) -> Vec<u8> {
    let rings: Vec<_> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .filter(|ring| !ring.0.is_empty())
        .collect();
    let mut writer = CoordinateWriter::<LittleEndian>::new();
    writer.header(POLYGON_TYPE).u32(count(rings.len()));
    for ring in rings {
        writer.u32(count(ring.0.len()));
        for coord in &ring.0 {
            writer.pair(coord.x, coord.y);
        }
    }
    writer.finish()
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Decode a WKB linestring in either byte order.
///
/// An empty payload decodes to an empty path, mirroring
/// [`encode_linestring`]. Coordinates are not range-checked.
///
/// # Errors
///
/// Fails when the header is invalid, the type is not a linestring or the
/// payload is shorter than its declared point count requires.
pub fn decode_linestring(bytes: &[u8]) -> Result<Vec<Coordinate>, GeometryDecodeError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let truncated = |needed: usize| GeometryDecodeError::Truncated {
        needed,
        actual: bytes.len(),
    };
    let flag = bytes.first().copied().unwrap_or_default();
    let order =
        Endianness::from_flag(flag).ok_or(GeometryDecodeError::InvalidByteOrder { flag })?;
    let reader = CoordinateReader::new(bytes, order);
    let type_code = reader
        .u32_at(1)
        .ok_or_else(|| truncated(LINESTRING_HEADER_LEN))?;
    if type_code != LINESTRING_TYPE {
        return Err(GeometryDecodeError::UnsupportedWkbType { type_code });
    }
    let declared = reader
        .u32_at(5)
        .ok_or_else(|| truncated(LINESTRING_HEADER_LEN))?;
    let points = usize::try_from(declared).unwrap_or(usize::MAX);
    let needed = points
        .checked_mul(PAIR_LEN)
        .and_then(|body| body.checked_add(LINESTRING_HEADER_LEN))
        .unwrap_or(usize::MAX);
    if bytes.len() < needed {
        return Err(truncated(needed));
    }
    (0..points)
        .map(|index| {
            let offset = LINESTRING_HEADER_LEN + index * PAIR_LEN;
            reader
                .pair_at(offset)
                .map(|(x, y)| Coordinate { lat: y, lon: x })
                .ok_or_else(|| truncated(offset + PAIR_LEN))
        })
        .collect()
}
