use thiserror::Error;

/// Reasons a classified geometry yielded no usable coordinate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryDecodeError {
    /// The text was valid WKT-ish input but not a `POINT`.
    #[error("unsupported WKT geometry (only POINT is supported): {kind}")]
    UnsupportedWkt {
        /// Leading geometry keyword found in the text.
        kind: String,
    },
    /// The text claimed to be a `POINT` but could not be parsed.
    #[error("malformed WKT point: {reason}")]
    MalformedWkt {
        /// What was wrong with the text.
        reason: String,
    },
    /// The payload was not valid UTF-8 text.
    #[error("WKT payload is not valid UTF-8")]
    InvalidText,
    /// The WKB byte-order flag was neither `0x00` nor `0x01`.
    #[error("invalid WKB byte-order flag {flag:#04x}")]
    InvalidByteOrder {
        /// Flag byte found at offset zero.
        flag: u8,
    },
    /// The WKB geometry type is not a point.
    #[error("unsupported WKB geometry type {type_code} (only POINT is supported)")]
    UnsupportedWkbType {
        /// Geometry type with EWKB flag bits masked off.
        type_code: u32,
    },
    /// The payload ended before the expected field.
    #[error("geometry payload truncated: need {needed} bytes, got {actual}")]
    Truncated {
        /// Bytes required by the decoder.
        needed: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// A coordinate was decoded but lies outside the valid ranges.
    #[error("decoded coordinate out of range: lat={lat}, lon={lon}")]
    OutOfRange {
        /// Decoded latitude.
        lat: f64,
        /// Decoded longitude.
        lon: f64,
    },
    /// Neither a precise decode nor the positional scan found a coordinate.
    #[error("no plausible coordinate found in {len}-byte payload")]
    NoPlausibleCoordinate {
        /// Payload length in bytes.
        len: usize,
    },
}
