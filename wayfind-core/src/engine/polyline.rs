//! Encoded polylines at six decimal places, as used for route shapes.
//!
//! Each point is stored as latitude then longitude, delta-encoded against the
//! previous point, zig-zag mapped and written in 5-bit chunks offset by 63.

use super::error::EngineError;
use crate::coordinate::Coordinate;

/// Scale factor between degrees and encoded integers.
pub const PRECISION: f64 = 1e6;

const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: u64 = 0x1F;
const CONTINUATION: u64 = 0x20;
const OFFSET: u8 = 63;

/// Decode a precision-6 polyline into coordinates.
///
/// # Errors
///
/// Returns [`EngineError::Parse`] on characters outside the polyline
/// alphabet, on a value cut short, or on an odd number of values.
///
/// # Examples
/// ```
/// use wayfind_core::engine::polyline;
///
/// # fn main() -> Result<(), wayfind_core::engine::EngineError> {
/// let points = polyline::decode("_izlhA~rlgdF")?;
/// assert_eq!(points.len(), 1);
/// assert!((points[0].lat - 38.5).abs() < 1e-9);
/// assert!((points[0].lon + 120.2).abs() < 1e-9);
/// # Ok(())
/// # }
/// ```
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, EngineError> {
    let mut bytes = encoded.bytes();
    let mut points = Vec::new();
    let (mut lat, mut lon) = (0_i64, 0_i64);
    while let Some(dlat) = next_value(&mut bytes)? {
        let dlon = next_value(&mut bytes)?.ok_or_else(|| parse_error("dangling latitude"))?;
        lat = lat.saturating_add(dlat);
        lon = lon.saturating_add(dlon);
        points.push(Coordinate {
            lat: lat as f64 / PRECISION,
            lon: lon as f64 / PRECISION,
        });
    }
    Ok(points)
}

/// Encode coordinates as a precision-6 polyline.
#[must_use]
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let (mut prev_lat, mut prev_lon) = (0_i64, 0_i64);
    for point in points {
        let lat = scale(point.lat);
        let lon = scale(point.lon);
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }
    out
}

fn scale(degrees: f64) -> i64 {
    (degrees * PRECISION).round() as i64
}

fn push_value(out: &mut String, value: i64) {
    let magnitude = value.unsigned_abs() << 1;
    let mut zigzag = if value < 0 { magnitude - 1 } else { magnitude };
    while zigzag >= CONTINUATION {
        out.push(char::from(
            ((CONTINUATION | (zigzag & CHUNK_MASK)) as u8) + OFFSET,
        ));
        zigzag >>= CHUNK_BITS;
    }
    out.push(char::from((zigzag as u8) + OFFSET));
}

fn next_value(bytes: &mut impl Iterator<Item = u8>) -> Result<Option<i64>, EngineError> {
    let mut result = 0_u64;
    let mut shift = 0_u32;
    loop {
        let Some(byte) = bytes.next() else {
            return if shift == 0 {
                Ok(None)
            } else {
                Err(parse_error("polyline value cut short"))
            };
        };
        let chunk = u64::from(
            byte.checked_sub(OFFSET)
                .filter(|&c| c <= 0x3F)
                .ok_or_else(|| parse_error("invalid polyline character"))?,
        );
        if shift > 60 {
            return Err(parse_error("polyline value overflows"));
        }
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        if chunk & CONTINUATION == 0 {
            break;
        }
    }
    let half = i64::try_from(result >> 1).map_err(|_| parse_error("polyline value overflows"))?;
    Ok(Some(if result & 1 == 1 { -half - 1 } else { half }))
}

fn parse_error(message: &str) -> EngineError {
    EngineError::Parse {
        message: message.to_owned(),
    }
}
