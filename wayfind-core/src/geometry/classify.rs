//! Encoding detection for caller-supplied geometry payloads.
//!
//! Callers hand over geometry as plain WKT text, standard WKB, or the
//! columnar point encoding used by some analytical databases, usually without
//! saying which. [`classify`] decides from the declared kind and, for opaque
//! binary, from observable byte patterns alone.
//!
//! The binary predicates run in a fixed order and that order is part of the
//! contract: the columnar zero-run signature is checked before the generic
//! WKB header because a columnar blob can also pass the WKB header test.
//!
//! Classification is total. Input that matches nothing is
//! [`GeometryEncoding::Unrecognized`]; extraction decides whether that is
//! fatal.

use log::debug;

use super::codec::{CoordinateReader, Endianness};

/// Minimum length of any binary geometry candidate (a 2D WKB point).
pub const MIN_BINARY_LEN: usize = 21;
/// Minimum length of a columnar point blob.
pub const MIN_COLUMNAR_LEN: usize = 32;
/// Length of the columnar header preceding the type code.
pub const COLUMNAR_HEADER_LEN: usize = 12;
/// Offset of the little-endian type code inside a columnar blob.
pub const COLUMNAR_TYPE_OFFSET: usize = 12;
/// Largest header byte value tolerated by the columnar signature.
pub const COLUMNAR_HEADER_MAX_BYTE: u8 = 16;
/// Mask clearing the EWKB Z, M and SRID flag bits from a type code.
pub const WKB_TYPE_MASK: u32 = 0x0FFF_FFFF;
/// EWKB flag announcing a 4-byte SRID after the type code.
pub const EWKB_SRID_FLAG: u32 = 0x2000_0000;
/// Geometry type codes recognised by both encodings (point..collection).
pub const GEOMETRY_TYPE_CODES: std::ops::RangeInclusive<u32> = 1..=7;
/// Type code for a point.
pub const POINT_TYPE: u32 = 1;
/// Type code for a linestring.
pub const LINESTRING_TYPE: u32 = 2;
/// Type code for a polygon.
pub const POLYGON_TYPE: u32 = 3;

/// Encoding assigned to a geometry payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryEncoding {
    /// Well-Known Text.
    Wkt,
    /// Standard Well-Known Binary (optionally EWKB flagged).
    StandardWkb,
    /// A columnar engine's internal point encoding.
    InternalColumnarBlob,
    /// Nothing matched; extraction falls back to the positional scan.
    Unrecognized,
}

impl GeometryEncoding {
    /// Whether payloads in this encoding are binary.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        !matches!(self, Self::Wkt)
    }
}

/// How the storage behind a geometry type alias is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasStorage {
    /// Values are stored as text.
    Textual,
    /// Values are stored as bytes.
    Binary,
}

/// A geometry-library type alias such as `GEOMETRY` or `WKB_BLOB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryAlias<'a> {
    /// Alias name as declared by the caller's type system.
    pub name: &'a str,
    /// Physical storage behind the alias.
    pub storage: AliasStorage,
}

impl GeometryAlias<'_> {
    /// Whether the alias names standard WKB storage.
    #[must_use]
    pub fn is_standard_wkb(&self) -> bool {
        self.name.eq_ignore_ascii_case("wkb_blob")
    }
}

/// What the caller claims a payload is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind<'a> {
    /// A text column; always WKT.
    Text,
    /// An opaque byte column.
    Blob,
    /// A geometry-library alias type.
    NativeGeometryAlias(GeometryAlias<'a>),
    /// No usable type information.
    Unknown,
}

/// A caller-owned geometry payload and its declared kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryInput<'a> {
    /// Raw payload bytes (UTF-8 for text).
    pub payload: &'a [u8],
    /// Kind declared by the caller.
    pub declared_kind: DeclaredKind<'a>,
}

impl<'a> GeometryInput<'a> {
    /// A WKT text payload.
    #[must_use]
    pub const fn text(text: &'a str) -> Self {
        Self {
            payload: text.as_bytes(),
            declared_kind: DeclaredKind::Text,
        }
    }

    /// An opaque binary payload.
    #[must_use]
    pub const fn blob(bytes: &'a [u8]) -> Self {
        Self {
            payload: bytes,
            declared_kind: DeclaredKind::Blob,
        }
    }

    /// A payload declared through a geometry type alias.
    #[must_use]
    pub const fn alias(name: &'a str, storage: AliasStorage, payload: &'a [u8]) -> Self {
        Self {
            payload,
            declared_kind: DeclaredKind::NativeGeometryAlias(GeometryAlias { name, storage }),
        }
    }

    /// A payload of unknown kind.
    #[must_use]
    pub const fn unknown(payload: &'a [u8]) -> Self {
        Self {
            payload,
            declared_kind: DeclaredKind::Unknown,
        }
    }
}

/// A payload tagged with its detected encoding.
///
/// Borrows from the originating [`GeometryInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedGeometry<'a> {
    /// Detected encoding.
    pub encoding: GeometryEncoding,
    /// The payload bytes.
    pub data: &'a [u8],
}

/// Classify a geometry payload.
///
/// # Examples
///
/// ```
/// use wayfind_core::geometry::{classify, GeometryEncoding, GeometryInput};
///
/// let classified = classify(&GeometryInput::text("POINT(12.45 43.94)"));
/// assert_eq!(classified.encoding, GeometryEncoding::Wkt);
///
/// let classified = classify(&GeometryInput::blob(&[0xAB; 8]));
/// assert_eq!(classified.encoding, GeometryEncoding::Unrecognized);
/// ```
#[must_use]
pub fn classify<'a>(input: &GeometryInput<'a>) -> ClassifiedGeometry<'a> {
    let encoding = match input.declared_kind {
        DeclaredKind::Text => GeometryEncoding::Wkt,
        DeclaredKind::NativeGeometryAlias(alias) if alias.storage == AliasStorage::Textual => {
            GeometryEncoding::Wkt
        }
        DeclaredKind::NativeGeometryAlias(alias) if alias.is_standard_wkb() => {
            GeometryEncoding::StandardWkb
        }
        DeclaredKind::NativeGeometryAlias(_) | DeclaredKind::Blob | DeclaredKind::Unknown => {
            sniff_binary(input.payload)
        }
    };
    debug!(
        "classified {}-byte {:?} payload as {encoding:?}",
        input.payload.len(),
        input.declared_kind
    );
    ClassifiedGeometry {
        encoding,
        data: input.payload,
    }
}

/// Apply the binary sniffing rules to an opaque payload.
#[must_use]
pub fn sniff_binary(bytes: &[u8]) -> GeometryEncoding {
    if bytes.len() < MIN_BINARY_LEN {
        GeometryEncoding::Unrecognized
    } else if has_columnar_zero_run(bytes) {
        GeometryEncoding::InternalColumnarBlob
    } else if has_wkb_header(bytes) {
        GeometryEncoding::StandardWkb
    } else if has_columnar_header(bytes) {
        GeometryEncoding::InternalColumnarBlob
    } else {
        GeometryEncoding::Unrecognized
    }
}

/// Whether `bytes` starts with a plausible WKB header.
///
/// Requires a valid byte-order flag and a type code in `1..=7` once the EWKB
/// flag bits are masked off.
#[must_use]
pub fn has_wkb_header(bytes: &[u8]) -> bool {
    wkb_type_code(bytes)
        .is_some_and(|(_, code)| GEOMETRY_TYPE_CODES.contains(&(code & WKB_TYPE_MASK)))
        && bytes.len() >= MIN_BINARY_LEN
}

/// Whether `bytes` carries the all-zero columnar header.
#[must_use]
pub fn has_columnar_zero_run(bytes: &[u8]) -> bool {
    bytes.len() >= MIN_COLUMNAR_LEN
        && bytes
            .get(..COLUMNAR_HEADER_LEN)
            .is_some_and(|header| header.iter().all(|&b| b == 0))
}

/// Whether `bytes` carries a near-zero columnar header and a valid type code.
#[must_use]
pub fn has_columnar_header(bytes: &[u8]) -> bool {
    if bytes.len() < MIN_COLUMNAR_LEN {
        return false;
    }
    let header_ok = bytes
        .get(..COLUMNAR_HEADER_LEN)
        .is_some_and(|header| header.iter().all(|&b| b <= COLUMNAR_HEADER_MAX_BYTE));
    header_ok
        && columnar_type_code(bytes).is_some_and(|code| GEOMETRY_TYPE_CODES.contains(&code))
}

/// Read the byte order and raw (unmasked) type code of a WKB payload.
#[must_use]
pub fn wkb_type_code(bytes: &[u8]) -> Option<(Endianness, u32)> {
    let order = Endianness::from_flag(*bytes.first()?)?;
    let code = CoordinateReader::new(bytes, order).u32_at(1)?;
    Some((order, code))
}

/// Read the little-endian type code of a columnar blob.
#[must_use]
pub fn columnar_type_code(bytes: &[u8]) -> Option<u32> {
    CoordinateReader::little_endian(bytes).u32_at(COLUMNAR_TYPE_OFFSET)
}
