//! JSON rendering of command results.

use std::fmt::Write as _;
use std::io::Write;

use serde::Serialize;
use wayfind_core::{Coordinate, RoutingError};
use wayfind_core::geometry::decode_linestring;

use crate::CliError;

pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

/// Render a WKB linestring as WKT, `LINESTRING EMPTY` for no points.
pub(crate) fn linestring_wkt(wkb: &[u8]) -> Result<String, CliError> {
    let points = decode_linestring(wkb).map_err(RoutingError::from)?;
    Ok(coordinates_wkt("LINESTRING", &points))
}

/// Render a closed ring as a WKT polygon.
pub(crate) fn polygon_wkt(ring: &[Coordinate]) -> String {
    if ring.is_empty() {
        return "POLYGON EMPTY".to_owned();
    }
    let body = coordinates_wkt("", ring);
    format!("POLYGON ({})", body.trim_start())
}

/// Render WKB bytes as lowercase hex, two digits per byte.
pub(crate) fn wkb_hex(wkb: &[u8]) -> String {
    let mut text = String::with_capacity(wkb.len() * 2);
    for byte in wkb {
        // Writing to a String cannot fail.
        let _ignored = write!(text, "{byte:02x}");
    }
    text
}

fn coordinates_wkt(kind: &str, points: &[Coordinate]) -> String {
    if points.is_empty() {
        return format!("{kind} EMPTY");
    }
    let mut text = format!("{kind} (");
    for (index, point) in points.iter().enumerate() {
        if index > 0 {
            text.push_str(", ");
        }
        // Writing to a String cannot fail.
        let _ignored = write!(text, "{} {}", point.lon, point.lat);
    }
    text.push(')');
    text
}
