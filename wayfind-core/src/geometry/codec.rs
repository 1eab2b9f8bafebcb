//! Byte-order aware readers and writers for WKB-style coordinate payloads.
//!
//! Readers are bounds-checked and return `None` rather than panicking when a
//! field would run past the end of the slice. Writers are generic over a
//! [`byteorder::ByteOrder`] so callers choose the output byte order at compile
//! time.

use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Size in bytes of an IEEE-754 double.
pub const F64_LEN: usize = 8;
/// Size in bytes of a `(x, y)` double pair.
pub const PAIR_LEN: usize = 2 * F64_LEN;

/// Byte order declared by the leading flag of a WKB payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// `0x00`, most significant byte first.
    Big,
    /// `0x01`, least significant byte first.
    Little,
}

impl Endianness {
    /// Decode a WKB byte-order flag.
    #[must_use]
    pub const fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0x00 => Some(Self::Big),
            0x01 => Some(Self::Little),
            _ => None,
        }
    }
}

/// Bounds-checked reader over a borrowed byte slice.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateReader<'a> {
    bytes: &'a [u8],
    order: Endianness,
}

impl<'a> CoordinateReader<'a> {
    /// Create a reader interpreting multi-byte fields in `order`.
    #[must_use]
    pub const fn new(bytes: &'a [u8], order: Endianness) -> Self {
        Self { bytes, order }
    }

    /// Create a little-endian reader.
    #[must_use]
    pub const fn little_endian(bytes: &'a [u8]) -> Self {
        Self::new(bytes, Endianness::Little)
    }

    /// Read the byte at `offset`.
    #[must_use]
    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// Read a 4-byte unsigned integer at `offset`.
    #[must_use]
    pub fn u32_at(&self, offset: usize) -> Option<u32> {
        let field = self.field(offset, 4)?;
        Some(match self.order {
            Endianness::Big => BigEndian::read_u32(field),
            Endianness::Little => LittleEndian::read_u32(field),
        })
    }

    /// Read an 8-byte IEEE-754 double at `offset`.
    #[must_use]
    pub fn f64_at(&self, offset: usize) -> Option<f64> {
        let field = self.field(offset, F64_LEN)?;
        Some(match self.order {
            Endianness::Big => BigEndian::read_f64(field),
            Endianness::Little => LittleEndian::read_f64(field),
        })
    }

    /// Read two consecutive doubles at `offset` as `(x, y)`.
    #[must_use]
    pub fn pair_at(&self, offset: usize) -> Option<(f64, f64)> {
        let x = self.f64_at(offset)?;
        let y = self.f64_at(offset.checked_add(F64_LEN)?)?;
        Some((x, y))
    }

    fn field(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.bytes.get(offset..end)
    }
}

/// A [`ByteOrder`] that also knows its WKB flag byte.
pub trait WkbByteOrder: ByteOrder {
    /// Flag written as the first byte of a WKB geometry.
    const FLAG: u8;
}

impl WkbByteOrder for LittleEndian {
    const FLAG: u8 = 0x01;
}

impl WkbByteOrder for BigEndian {
    const FLAG: u8 = 0x00;
}

/// Append-only writer producing WKB fields in byte order `E`.
#[derive(Debug, Clone)]
pub struct CoordinateWriter<E> {
    buf: Vec<u8>,
    order: PhantomData<E>,
}

impl<E: WkbByteOrder> CoordinateWriter<E> {
    /// Create an empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            order: PhantomData,
        }
    }

    /// Create an empty writer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            order: PhantomData,
        }
    }

    /// Write the byte-order flag followed by a geometry type code.
    pub fn header(&mut self, type_code: u32) -> &mut Self {
        self.buf.push(E::FLAG);
        self.u32(type_code)
    }

    /// Write a 4-byte unsigned integer.
    pub fn u32(&mut self, value: u32) -> &mut Self {
        let mut field = [0_u8; 4];
        E::write_u32(&mut field, value);
        self.buf.extend_from_slice(&field);
        self
    }

    /// Write an 8-byte IEEE-754 double.
    pub fn f64(&mut self, value: f64) -> &mut Self {
        let mut field = [0_u8; F64_LEN];
        E::write_f64(&mut field, value);
        self.buf.extend_from_slice(&field);
        self
    }

    /// Write an `(x, y)` pair.
    pub fn pair(&mut self, x: f64, y: f64) -> &mut Self {
        self.f64(x).f64(y)
    }

    /// Consume the writer and return the encoded bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x00, Some(Endianness::Big))]
    #[case(0x01, Some(Endianness::Little))]
    #[case(0x02, None)]
    #[case(0xFF, None)]
    fn decodes_order_flag(#[case] flag: u8, #[case] expected: Option<Endianness>) {
        assert_eq!(Endianness::from_flag(flag), expected);
    }

    #[rstest]
    fn reads_fields_in_declared_order() {
        let little = [0x02, 0x00, 0x00, 0x00];
        let big = [0x00, 0x00, 0x00, 0x02];
        assert_eq!(CoordinateReader::little_endian(&little).u32_at(0), Some(2));
        assert_eq!(
            CoordinateReader::new(&big, Endianness::Big).u32_at(0),
            Some(2)
        );
    }

    #[rstest]
    fn out_of_bounds_reads_return_none() {
        let bytes = [0_u8; 15];
        let reader = CoordinateReader::little_endian(&bytes);
        assert_eq!(reader.f64_at(8), None);
        assert_eq!(reader.pair_at(0), None);
        assert_eq!(reader.u32_at(usize::MAX), None);
        assert_eq!(reader.u8_at(15), None);
    }

    #[rstest]
    fn big_endian_writer_round_trips_through_reader() {
        let mut writer = CoordinateWriter::<BigEndian>::new();
        writer.header(1).pair(9.19, 45.46);
        let bytes = writer.finish();

        assert_eq!(bytes.len(), 21);
        assert_eq!(bytes.first(), Some(&0x00));
        let reader = CoordinateReader::new(&bytes, Endianness::Big);
        assert_eq!(reader.u32_at(1), Some(1));
        assert_eq!(reader.pair_at(5), Some((9.19, 45.46)));
    }
}
