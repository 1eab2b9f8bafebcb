//! Geometry ingestion and result encoding.
//!
//! Payload classification ([`classify`]), centroid extraction ([`extract`])
//! and WKB output ([`encode_linestring`], [`encode_polygon`]). Nothing here
//! touches the routing engine or takes a lock.

mod classify;
mod codec;
mod encode;
mod error;
mod extract;

pub use classify::{
    AliasStorage, COLUMNAR_HEADER_LEN, COLUMNAR_HEADER_MAX_BYTE, COLUMNAR_TYPE_OFFSET,
    ClassifiedGeometry, DeclaredKind, EWKB_SRID_FLAG, GEOMETRY_TYPE_CODES, GeometryAlias,
    GeometryEncoding, GeometryInput, LINESTRING_TYPE, MIN_BINARY_LEN, MIN_COLUMNAR_LEN,
    POINT_TYPE, POLYGON_TYPE, WKB_TYPE_MASK, classify, columnar_type_code, has_columnar_header,
    has_columnar_zero_run, has_wkb_header, sniff_binary, wkb_type_code,
};
pub use codec::{CoordinateReader, CoordinateWriter, Endianness, F64_LEN, PAIR_LEN, WkbByteOrder};
pub use encode::{LINESTRING_HEADER_LEN, decode_linestring, encode_linestring, encode_polygon};
pub use error::GeometryDecodeError;
pub use extract::{
    COLUMNAR_POINT_OFFSET, Centroid, ExtractionMethod, SCAN_MIN_LEN, SCAN_START, SCAN_STEP,
    decode_columnar_point, decode_wkb_point, extract, parse_wkt_point, positional_scan,
};
