//! Centroid extraction from classified geometry payloads.
//!
//! Only points are decoded precisely. Anything else that the classifier could
//! not pin down goes through the positional scan, which walks the payload in
//! 8-byte steps looking for the first pair of little-endian doubles that reads
//! as a longitude/latitude. Scan results are tagged so callers can tell a
//! heuristic hit from a real decode.

use log::{debug, warn};

use super::classify::{
    ClassifiedGeometry, EWKB_SRID_FLAG, GeometryEncoding, MIN_BINARY_LEN, MIN_COLUMNAR_LEN,
    POINT_TYPE, WKB_TYPE_MASK, columnar_type_code,
};
use super::codec::{CoordinateReader, Endianness, F64_LEN, PAIR_LEN};
use super::error::GeometryDecodeError;
use crate::coordinate::{Coordinate, is_plausible};

/// Offset of the coordinate pair in a columnar point blob.
pub const COLUMNAR_POINT_OFFSET: usize = 16;
/// First offset probed by the positional scan.
pub const SCAN_START: usize = 8;
/// Distance between successive scan probes.
pub const SCAN_STEP: usize = F64_LEN;
/// Shortest payload the positional scan will consider.
pub const SCAN_MIN_LEN: usize = 24;

/// How a centroid was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionMethod {
    /// Decoded from a known point layout.
    Precise,
    /// Found by the positional scan heuristic.
    PositionalScan,
}

/// A representative coordinate pulled from a geometry payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    /// The coordinate.
    pub coordinate: Coordinate,
    /// How it was found.
    pub method: ExtractionMethod,
}

impl Centroid {
    const fn precise(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            method: ExtractionMethod::Precise,
        }
    }

    const fn scanned(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            method: ExtractionMethod::PositionalScan,
        }
    }
}

/// Extract a representative coordinate from a classified payload.
///
/// # Errors
///
/// Returns a [`GeometryDecodeError`] describing why no coordinate could be
/// produced. The error depends on the encoding: WKT and standard WKB report
/// structural problems, while columnar and unrecognised payloads fail only
/// when the positional scan also comes up empty.
///
/// # Examples
///
/// ```
/// use wayfind_core::geometry::{classify, extract, ExtractionMethod, GeometryInput};
///
/// # fn main() -> Result<(), wayfind_core::geometry::GeometryDecodeError> {
/// let centroid = extract(&classify(&GeometryInput::text("POINT(12.45 43.94)")))?;
/// assert_eq!(centroid.coordinate.lat, 43.94);
/// assert_eq!(centroid.method, ExtractionMethod::Precise);
/// # Ok(())
/// # }
/// ```
pub fn extract(geometry: &ClassifiedGeometry<'_>) -> Result<Centroid, GeometryDecodeError> {
    match geometry.encoding {
        GeometryEncoding::Wkt => {
            let text =
                std::str::from_utf8(geometry.data).map_err(|_| GeometryDecodeError::InvalidText)?;
            parse_wkt_point(text).map(Centroid::precise)
        }
        GeometryEncoding::StandardWkb => decode_wkb_point(geometry.data).map(Centroid::precise),
        GeometryEncoding::InternalColumnarBlob => decode_columnar_point(geometry.data),
        GeometryEncoding::Unrecognized => positional_scan(geometry.data)
            .map(Centroid::scanned)
            .ok_or(GeometryDecodeError::NoPlausibleCoordinate {
                len: geometry.data.len(),
            }),
    }
}

/// Parse a WKT `POINT`, accepting an optional EWKT `SRID=n;` prefix.
///
/// # Errors
///
/// [`GeometryDecodeError::UnsupportedWkt`] for any other geometry keyword,
/// [`GeometryDecodeError::MalformedWkt`] when the body is not two numbers and
/// [`GeometryDecodeError::OutOfRange`] when they fail the range check.
pub fn parse_wkt_point(text: &str) -> Result<Coordinate, GeometryDecodeError> {
    let body = strip_srid(text.trim());
    let keyword: String = body
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    if !keyword.eq_ignore_ascii_case("point") {
        return Err(GeometryDecodeError::UnsupportedWkt {
            kind: if keyword.is_empty() {
                body.chars().take(16).collect()
            } else {
                keyword.to_ascii_uppercase()
            },
        });
    }

    let inner = body
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or_else(|| malformed("expected parenthesised coordinates"))?;

    let mut tokens = inner.split_whitespace();
    let (Some(x_text), Some(y_text), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed("expected exactly two ordinates"));
    };
    let x = parse_ordinate(x_text)?;
    let y = parse_ordinate(y_text)?;
    Coordinate::from_xy(x, y).map_err(|_| GeometryDecodeError::OutOfRange { lat: y, lon: x })
}

fn strip_srid(text: &str) -> &str {
    let has_prefix = text
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("srid="));
    if has_prefix {
        text.split_once(';').map_or(text, |(_, rest)| rest.trim_start())
    } else {
        text
    }
}

fn parse_ordinate(token: &str) -> Result<f64, GeometryDecodeError> {
    token
        .parse::<f64>()
        .map_err(|_| malformed(format!("`{token}` is not a number")))
}

fn malformed(reason: impl Into<String>) -> GeometryDecodeError {
    GeometryDecodeError::MalformedWkt {
        reason: reason.into(),
    }
}

/// Decode a standard (or EWKB-flagged) WKB point in either byte order.
///
/// # Errors
///
/// Fails on short payloads, unknown byte-order flags, non-point types and
/// coordinates outside the valid ranges. No scan is attempted.
pub fn decode_wkb_point(bytes: &[u8]) -> Result<Coordinate, GeometryDecodeError> {
    let truncated = |needed: usize| GeometryDecodeError::Truncated {
        needed,
        actual: bytes.len(),
    };
    if bytes.len() < MIN_BINARY_LEN {
        return Err(truncated(MIN_BINARY_LEN));
    }
    let flag = bytes.first().copied().unwrap_or_default();
    let order =
        Endianness::from_flag(flag).ok_or(GeometryDecodeError::InvalidByteOrder { flag })?;
    let reader = CoordinateReader::new(bytes, order);
    let raw_type = reader.u32_at(1).ok_or_else(|| truncated(5))?;
    let type_code = raw_type & WKB_TYPE_MASK;
    if type_code != POINT_TYPE {
        return Err(GeometryDecodeError::UnsupportedWkbType { type_code });
    }
    let offset = if raw_type & EWKB_SRID_FLAG == 0 { 5 } else { 9 };
    let (x, y) = reader
        .pair_at(offset)
        .ok_or_else(|| truncated(offset + PAIR_LEN))?;
    Coordinate::from_xy(x, y).map_err(|_| GeometryDecodeError::OutOfRange { lat: y, lon: x })
}

/// Decode a columnar point blob, scanning when the fixed layout fails.
///
/// # Errors
///
/// [`GeometryDecodeError::NoPlausibleCoordinate`] when neither the fixed
/// layout nor the scan yields a valid pair.
pub fn decode_columnar_point(bytes: &[u8]) -> Result<Centroid, GeometryDecodeError> {
    if bytes.len() >= MIN_COLUMNAR_LEN && columnar_type_code(bytes) == Some(POINT_TYPE) {
        let fixed = CoordinateReader::little_endian(bytes).pair_at(COLUMNAR_POINT_OFFSET);
        if let Some((x, y)) = fixed.filter(|&(x, y)| is_plausible(x, y)) {
            return Ok(Centroid::precise(Coordinate { lat: y, lon: x }));
        }
        debug!("columnar point layout out of range; scanning");
    }
    positional_scan(bytes)
        .map(Centroid::scanned)
        .ok_or(GeometryDecodeError::NoPlausibleCoordinate { len: bytes.len() })
}

/// Find the first plausible little-endian `(lon, lat)` pair in `bytes`.
///
/// Probes offsets 8, 16, 24, ... while a full pair fits. Payloads shorter
/// than 24 bytes are never scanned.
#[must_use]
pub fn positional_scan(bytes: &[u8]) -> Option<Coordinate> {
    if bytes.len() < SCAN_MIN_LEN {
        return None;
    }
    let reader = CoordinateReader::little_endian(bytes);
    (SCAN_START..=bytes.len() - PAIR_LEN)
        .step_by(SCAN_STEP)
        .filter_map(|offset| reader.pair_at(offset).map(|pair| (offset, pair)))
        .find(|&(_, (x, y))| is_plausible(x, y))
        .map(|(offset, (x, y))| {
            warn!(
                "geometry decoded by positional scan at offset {offset} of {}; result is heuristic",
                bytes.len()
            );
            Coordinate { lat: y, lon: x }
        })
}
