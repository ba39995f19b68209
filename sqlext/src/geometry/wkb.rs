//! OGC Well-Known-Binary primitives.
//!
//! Every record starts with a 5 byte header, the byte order flag, `0` for big endian (XDR) and
//! `1` for little endian (NDR), followed by the `u32` geometry type code. Counts are `u32`,
//! coordinates are `f64`, all in the byte order of the header.
use std::{fs::File, io::Read};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::Point;
use crate::{
    Result,
    error::FormatError,
    ext::{BufExt, BufMutExt, PatchExt, UsizeExt},
};

/// Byte order flag and type code.
pub(crate) const HEADER_LEN: usize = 1 + size_of::<u32>();
pub(crate) const POINT_LEN: usize = 2 * size_of::<f64>();

/// Wkb byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// XDR, flag `0`.
    BigEndian,
    /// NDR, flag `1`.
    #[default]
    LittleEndian,
}

impl ByteOrder {
    /// Returns the header flag byte.
    pub const fn flag(self) -> u8 {
        match self {
            ByteOrder::BigEndian => 0,
            ByteOrder::LittleEndian => 1,
        }
    }

    /// Resolve byte order from the header flag byte.
    pub fn from_flag(flag: u8) -> Result<ByteOrder, FormatError> {
        match flag {
            0 => Ok(ByteOrder::BigEndian),
            1 => Ok(ByteOrder::LittleEndian),
            _ => Err(FormatError::new(format!("invalid wkb byte order flag {flag}"))),
        }
    }

    /// Returns [`ByteOrder::BigEndian`] if `big_endian` is `true`.
    pub const fn from_big_endian(big_endian: bool) -> ByteOrder {
        match big_endian {
            true => ByteOrder::BigEndian,
            false => ByteOrder::LittleEndian,
        }
    }

    pub const fn is_big_endian(self) -> bool {
        matches!(self, ByteOrder::BigEndian)
    }
}

macro_rules! wkb_type {
    ($($name:ident = $code:literal, $tag:literal;)*) => {
        /// Wkb geometry type code.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum WkbType {
            $($name = $code,)*
        }

        impl WkbType {
            /// Resolve type from its code.
            pub const fn from_code(code: u32) -> Option<WkbType> {
                match code {
                    $($code => Some(WkbType::$name),)*
                    _ => None,
                }
            }

            /// Returns the wkt tag.
            pub const fn tag(self) -> &'static str {
                match self {
                    $(WkbType::$name => $tag,)*
                }
            }
        }
    };
}

wkb_type! {
    Geometry = 0, "GEOMETRY";
    Point = 1, "POINT";
    LineString = 2, "LINESTRING";
    Polygon = 3, "POLYGON";
    MultiPoint = 4, "MULTIPOINT";
    MultiLineString = 5, "MULTILINESTRING";
    MultiPolygon = 6, "MULTIPOLYGON";
    GeometryCollection = 7, "GEOMETRYCOLLECTION";
    CircularString = 8, "CIRCULARSTRING";
    CompoundCurve = 9, "COMPOUNDCURVE";
    CurvePolygon = 10, "CURVEPOLYGON";
    MultiCurve = 11, "MULTICURVE";
    MultiSurface = 12, "MULTISURFACE";
    Curve = 13, "CURVE";
    Surface = 14, "SURFACE";
    PolyhedralSurface = 15, "POLYHEDRALSURFACE";
    Tin = 16, "TIN";
    Triangle = 17, "TRIANGLE";
}

impl WkbType {
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// Resolve geometry type and byte order of the wkb record at `offset`.
pub fn resolve_type(bytes: &[u8], offset: usize) -> Result<(WkbType, ByteOrder)> {
    let Some(header) = bytes.get(offset..offset.saturating_add(HEADER_LEN)) else {
        return Err(FormatError::new("wkb header truncated").at(offset).into());
    };
    resolve_header(header).map_err(|e| e.at(offset).into())
}

fn resolve_header(mut header: &[u8]) -> Result<(WkbType, ByteOrder), FormatError> {
    let order = ByteOrder::from_flag(header.get_u8())?;
    let code = header.try_get_wkb_u32(order)?;
    match WkbType::from_code(code) {
        Some(ty) => Ok((ty, order)),
        None => Err(FormatError::new(format!("unknown wkb type code {code}"))),
    }
}

/// Resolve geometry type and byte order from the first 5 bytes of a stream.
pub fn resolve_type_from_reader<R: Read>(mut reader: R) -> Result<(WkbType, ByteOrder)> {
    let mut header = [0u8; HEADER_LEN];
    if let Err(err) = reader.read_exact(&mut header) {
        return match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Err(FormatError::new("empty input").into()),
            _ => Err(err.into()),
        };
    }
    Ok(resolve_header(&header)?)
}

/// Resolve geometry type and byte order from the first 5 bytes of a file.
pub fn resolve_type_from_path(path: impl AsRef<std::path::Path>) -> Result<(WkbType, ByteOrder)> {
    resolve_type_from_reader(File::open(path)?)
}

/// Resolve geometry type and byte order from the first 5 bytes of an async stream.
#[cfg(feature = "tokio")]
pub async fn resolve_type_async<R>(mut reader: R) -> Result<(WkbType, ByteOrder)>
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut header = [0u8; HEADER_LEN];
    if let Err(err) = reader.read_exact(&mut header).await {
        return match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Err(FormatError::new("empty input").into()),
            _ => Err(err.into()),
        };
    }
    Ok(resolve_header(&header)?)
}

/// Growable wkb buffer.
///
/// Counts that are only known after the payload is written can be reserved with
/// [`placeholder`][WkbWriter::placeholder] and backpatched with [`patch`][WkbWriter::patch].
#[derive(Debug)]
pub struct WkbWriter {
    buf: BytesMut,
    order: ByteOrder,
}

impl WkbWriter {
    pub fn new(order: ByteOrder) -> WkbWriter {
        Self::with_capacity(order, HEADER_LEN + POINT_LEN)
    }

    pub fn with_capacity(order: ByteOrder, capacity: usize) -> WkbWriter {
        Self { buf: BytesMut::with_capacity(capacity), order }
    }

    /// Estimate capacity from geometry text, roughly 2 bytes per text character.
    ///
    /// The buffer grows as needed if the estimate is short.
    pub fn for_text(order: ByteOrder, text: &str) -> WkbWriter {
        Self::with_capacity(order, HEADER_LEN + size_of::<u32>() + text.len() * 2)
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Written length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write byte order flag and type code.
    pub fn header(&mut self, ty: WkbType) {
        self.buf.put_u8(self.order.flag());
        self.buf.put_wkb_u32(ty.code(), self.order);
    }

    pub fn u32(&mut self, value: u32) {
        self.buf.put_wkb_u32(value, self.order);
    }

    /// Write a length as `u32` count.
    pub fn count(&mut self, len: usize) -> Result<(), FormatError> {
        self.u32(len.to_u32()?);
        Ok(())
    }

    pub fn f64(&mut self, value: f64) {
        self.buf.put_wkb_f64(value, self.order);
    }

    pub fn point(&mut self, point: &Point) {
        self.f64(point.x);
        self.f64(point.y);
    }

    /// Write count followed by points.
    pub fn points(&mut self, points: &[Point]) -> Result<(), FormatError> {
        self.count(points.len())?;
        for point in points {
            self.point(point);
        }
        Ok(())
    }

    /// Reserve a `u32` count, returns its position.
    pub fn placeholder(&mut self) -> usize {
        let pos = self.buf.len();
        self.u32(0);
        pos
    }

    /// Backpatch the `u32` reserved by [`placeholder`][WkbWriter::placeholder].
    pub fn patch(&mut self, pos: usize, value: u32) {
        self.buf.patch_wkb_u32(pos, value, self.order);
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Wkb cursor.
///
/// Each [`header`][WkbReader::header] switches the byte order used for subsequent reads.
#[derive(Debug)]
pub struct WkbReader<'a> {
    buf: &'a [u8],
    order: ByteOrder,
}

impl<'a> WkbReader<'a> {
    pub fn new(buf: &'a [u8]) -> WkbReader<'a> {
        Self { buf, order: ByteOrder::default() }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Read byte order flag and type code.
    pub fn header(&mut self) -> Result<WkbType, FormatError> {
        if self.buf.len() < HEADER_LEN {
            return Err(FormatError::new("wkb header truncated"));
        }
        let (ty, order) = resolve_header(&self.buf[..HEADER_LEN])?;
        self.buf.advance(HEADER_LEN);
        self.order = order;
        Ok(ty)
    }

    /// Read header and check its type.
    pub fn expect(&mut self, expected: WkbType) -> Result<(), FormatError> {
        let ty = self.header()?;
        if ty != expected {
            return Err(FormatError::new(format!(
                "expected wkb {}, found {}",
                expected.tag(),
                ty.tag()
            )));
        }
        Ok(())
    }

    pub fn u32(&mut self) -> Result<u32, FormatError> {
        self.buf.try_get_wkb_u32(self.order)
    }

    /// Read a `u32` count of items at least `item_len` bytes each.
    pub fn count(&mut self, item_len: usize) -> Result<usize, FormatError> {
        let count = self.u32()? as usize;
        if count.saturating_mul(item_len) > self.buf.len() {
            return Err(FormatError::new(format!("wkb count {count} exceeds remaining input")));
        }
        Ok(count)
    }

    pub fn f64(&mut self) -> Result<f64, FormatError> {
        self.buf.try_get_wkb_f64(self.order)
    }

    pub fn point(&mut self) -> Result<Point, FormatError> {
        Ok(Point { x: self.f64()?, y: self.f64()? })
    }

    /// Read count followed by points.
    pub fn points(&mut self) -> Result<Vec<Point>, FormatError> {
        let count = self.count(POINT_LEN)?;
        (0..count).map(|_| self.point()).collect()
    }

    /// Ensure all input consumed.
    pub fn finish(self) -> Result<(), FormatError> {
        match self.buf.len() {
            0 => Ok(()),
            n => Err(FormatError::new(format!("{n} trailing bytes after wkb"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn byte_order_from_bool() {
        assert_eq!(ByteOrder::from_big_endian(true), ByteOrder::BigEndian);
        assert_eq!(ByteOrder::from_big_endian(false), ByteOrder::LittleEndian);
        assert!(ByteOrder::from_big_endian(true).is_big_endian());
    }

    #[test]
    fn header_layout() {
        let mut w = WkbWriter::new(ByteOrder::BigEndian);
        w.header(WkbType::LineString);
        assert_eq!(&w.finish()[..], &[0, 0, 0, 0, 2]);

        let mut w = WkbWriter::new(ByteOrder::LittleEndian);
        w.header(WkbType::Polygon);
        assert_eq!(&w.finish()[..], &[1, 3, 0, 0, 0]);
    }

    #[test]
    fn resolve() {
        assert_eq!(
            resolve_type(&[0, 0, 0, 0, 17], 0).unwrap(),
            (WkbType::Triangle, ByteOrder::BigEndian)
        );
        assert_eq!(
            resolve_type(&[9, 1, 1, 0, 0, 0], 1).unwrap(),
            (WkbType::Point, ByteOrder::LittleEndian)
        );
    }

    #[test]
    fn resolve_invalid() {
        assert!(resolve_type(&[2, 0, 0, 0, 1], 0).unwrap_err().is_format());
        assert!(resolve_type(&[0, 0, 0, 0, 18], 0).unwrap_err().is_format());
        assert!(resolve_type(&[1, 1, 0, 0], 0).unwrap_err().is_format());
        assert!(resolve_type(&[1, 1, 0, 0, 0], 3).unwrap_err().is_format());
    }

    #[test]
    fn resolve_reader() {
        let input = [1u8, 2, 0, 0, 0, 0xff];
        assert_eq!(
            resolve_type_from_reader(&input[..]).unwrap(),
            (WkbType::LineString, ByteOrder::LittleEndian)
        );
        let err = resolve_type_from_reader(&[1u8, 2][..]).unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("empty input"));
    }

    #[test]
    fn placeholder_backpatch() {
        let mut w = WkbWriter::new(ByteOrder::BigEndian);
        w.header(WkbType::LineString);
        let pos = w.placeholder();
        w.point(&Point::new(1.0, 2.0));
        w.patch(pos, 1);
        let wkb = w.finish();

        let mut r = WkbReader::new(&wkb);
        r.expect(WkbType::LineString).unwrap();
        assert_eq!(r.points().unwrap(), [Point::new(1.0, 2.0)]);
        r.finish().unwrap();
    }

    #[test]
    fn reader_rejects_oversized_count() {
        let wkb = [1u8, 2, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        let mut r = WkbReader::new(&wkb);
        r.expect(WkbType::LineString).unwrap();
        assert!(r.points().is_err());
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn resolve_async() {
        let input = [0u8, 0, 0, 0, 3];
        assert_eq!(
            resolve_type_async(&input[..]).await.unwrap(),
            (WkbType::Polygon, ByteOrder::BigEndian)
        );
        assert!(resolve_type_async(&[0u8; 0][..]).await.unwrap_err().is_format());
    }
}
