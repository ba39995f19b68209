//! OGC Well-Known-Text.
use std::fmt;

use bytes::Bytes;

use super::{
    Line, LineString, Path, Point, Polygon,
    scan::coordinate,
    wkb::{ByteOrder, HEADER_LEN, POINT_LEN, WkbReader, WkbType, WkbWriter},
};
use crate::{Result, common::span, error::FormatError};

/// Maximum nesting of `GEOMETRYCOLLECTION`.
const MAX_DEPTH: usize = 32;

/// Geometry that can be represented as both wkt and wkb.
///
/// Only the 2D types `POINT` through `GEOMETRYCOLLECTION` are supported, curve and surface
/// types are rejected with [`FormatError`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Geometry {
    /// `POINT EMPTY` is a point with `NaN` coordinates.
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(Vec<Point>),
    MultiLineString(Vec<LineString>),
    MultiPolygon(Vec<Polygon>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    pub fn wkb_type(&self) -> WkbType {
        match self {
            Geometry::Point(_) => WkbType::Point,
            Geometry::LineString(_) => WkbType::LineString,
            Geometry::Polygon(_) => WkbType::Polygon,
            Geometry::MultiPoint(_) => WkbType::MultiPoint,
            Geometry::MultiLineString(_) => WkbType::MultiLineString,
            Geometry::MultiPolygon(_) => WkbType::MultiPolygon,
            Geometry::GeometryCollection(_) => WkbType::GeometryCollection,
        }
    }

    /// Returns `true` if geometry contains no point.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(p) => p.is_empty(),
            Geometry::LineString(ls) => ls.is_empty(),
            Geometry::Polygon(p) => p.is_empty(),
            Geometry::MultiPoint(v) => v.is_empty(),
            Geometry::MultiLineString(v) => v.is_empty(),
            Geometry::MultiPolygon(v) => v.is_empty(),
            Geometry::GeometryCollection(v) => v.is_empty(),
        }
    }

    /// Parse wkt, tags are case insensitive.
    pub fn from_wkt(text: &str) -> Result<Geometry> {
        let mut cursor = Cursor { text, pos: 0 };
        let geometry = cursor.geometry(0)?;
        if cursor.peek().is_some() {
            return Err(cursor.error("unexpected trailing characters").into());
        }
        Ok(geometry)
    }

    /// Format as wkt, same as [`Display`][fmt::Display].
    pub fn to_wkt(&self) -> String {
        self.to_string()
    }

    /// Decode wkb.
    pub fn from_wkb(wkb: &[u8]) -> Result<Geometry> {
        let mut r = WkbReader::new(wkb);
        let geometry = read_geometry(&mut r, 0)?;
        r.finish()?;
        Ok(geometry)
    }

    /// Encode as wkb.
    pub fn to_wkb(&self, order: ByteOrder) -> Result<Bytes> {
        let mut w = WkbWriter::new(order);
        self.write_wkb(&mut w)?;
        Ok(w.finish())
    }

    fn write_wkb(&self, w: &mut WkbWriter) -> Result<(), FormatError> {
        match self {
            Geometry::Polygon(polygon) => return polygon.write_wkb(w),
            _ => w.header(self.wkb_type()),
        }
        match self {
            Geometry::Point(point) => w.point(point),
            Geometry::LineString(ls) => {
                check_linestring(ls.points.len())?;
                w.points(&ls.points)?;
            },
            Geometry::MultiPoint(points) => {
                w.count(points.len())?;
                for point in points {
                    w.header(WkbType::Point);
                    w.point(point);
                }
            },
            Geometry::MultiLineString(lines) => {
                w.count(lines.len())?;
                for ls in lines {
                    check_linestring(ls.points.len())?;
                    w.header(WkbType::LineString);
                    w.points(&ls.points)?;
                }
            },
            Geometry::MultiPolygon(polygons) => {
                w.count(polygons.len())?;
                for polygon in polygons {
                    polygon.write_wkb(w)?;
                }
            },
            Geometry::GeometryCollection(geometries) => {
                w.count(geometries.len())?;
                for geometry in geometries {
                    geometry.write_wkb(w)?;
                }
            },
            Geometry::Polygon(_) => { },
        }
        Ok(())
    }
}

/// Line string have either no point or at least 2.
fn check_linestring(len: usize) -> Result<(), FormatError> {
    match len {
        1 => Err(FormatError::new("linestring must have 0 or at least 2 points")),
        _ => Ok(()),
    }
}

fn read_geometry(r: &mut WkbReader<'_>, depth: usize) -> Result<Geometry, FormatError> {
    if depth > MAX_DEPTH {
        return Err(FormatError::new("geometry nested too deep"));
    }

    let geometry = match r.header()? {
        WkbType::Point => Geometry::Point(r.point()?),
        WkbType::LineString => Geometry::LineString(read_linestring(r)?),
        WkbType::Polygon => Geometry::Polygon(Polygon::read_wkb_body(r)?),
        WkbType::MultiPoint => {
            let count = r.count(HEADER_LEN + POINT_LEN)?;
            let points = (0..count)
                .map(|_| {
                    r.expect(WkbType::Point)?;
                    r.point()
                })
                .collect::<Result<_, _>>()?;
            Geometry::MultiPoint(points)
        },
        WkbType::MultiLineString => {
            let count = r.count(HEADER_LEN + size_of::<u32>())?;
            let lines = (0..count)
                .map(|_| {
                    r.expect(WkbType::LineString)?;
                    read_linestring(r)
                })
                .collect::<Result<_, _>>()?;
            Geometry::MultiLineString(lines)
        },
        WkbType::MultiPolygon => {
            let count = r.count(HEADER_LEN + size_of::<u32>())?;
            let polygons = (0..count)
                .map(|_| {
                    r.expect(WkbType::Polygon)?;
                    Polygon::read_wkb_body(r)
                })
                .collect::<Result<_, _>>()?;
            Geometry::MultiPolygon(polygons)
        },
        WkbType::GeometryCollection => {
            let count = r.count(HEADER_LEN)?;
            let geometries = (0..count)
                .map(|_| read_geometry(r, depth + 1))
                .collect::<Result<_, _>>()?;
            Geometry::GeometryCollection(geometries)
        },
        ty => return Err(FormatError::new(format!("unsupported geometry type {}", ty.tag()))),
    };

    Ok(geometry)
}

fn read_linestring(r: &mut WkbReader<'_>) -> Result<LineString, FormatError> {
    let points = r.points()?;
    check_linestring(points.len())?;
    Ok(LineString { points })
}

/// Convert wkb to wkt.
pub fn wkb_to_wkt(wkb: &[u8]) -> Result<String> {
    Ok(Geometry::from_wkb(wkb)?.to_string())
}

/// Convert wkt to wkb.
pub fn wkt_to_wkb(text: &str, order: ByteOrder) -> Result<Bytes> {
    span!("wkt_to_wkb", text);
    Geometry::from_wkt(text)?.to_wkb(order)
}

// ===== Wkt Parser =====

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn error(&self, reason: impl Into<std::borrow::Cow<'static, str>>) -> FormatError {
        FormatError::new(reason).at(self.pos).input(self.text)
    }

    /// Skip whitespace and peek next byte.
    fn peek(&mut self) -> Option<u8> {
        let bytes = self.text.as_bytes();
        while bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
        bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        let found = self.peek() == Some(byte);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect(&mut self, byte: u8) -> Result<(), FormatError> {
        match self.eat(byte) {
            true => Ok(()),
            false => Err(self.error(format!("expected '{}'", byte as char))),
        }
    }

    fn word(&mut self) -> &'a str {
        self.peek();
        let start = self.pos;
        let len = self.text.as_bytes()[start..]
            .iter()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        self.pos += len;
        &self.text[start..self.pos]
    }

    /// Consume `EMPTY` keyword if present.
    fn empty(&mut self) -> bool {
        let start = self.pos;
        if self.word().eq_ignore_ascii_case("EMPTY") {
            return true;
        }
        self.pos = start;
        false
    }

    fn number(&mut self) -> Result<f64> {
        self.peek();
        let start = self.pos;
        let len = self.text.as_bytes()[start..]
            .iter()
            .take_while(|&&b| !b.is_ascii_whitespace() && !matches!(b, b',' | b'(' | b')'))
            .count();
        if len == 0 {
            return Err(self.error("expected number").into());
        }
        self.pos += len;
        Ok(coordinate(&self.text[start..self.pos])?)
    }

    fn coord(&mut self) -> Result<Point> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Point { x, y })
    }

    /// Parse `(item, item, ...)`.
    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.expect(b'(')?;
        let mut items = vec![item(self)?];
        while self.eat(b',') {
            items.push(item(self)?);
        }
        self.expect(b')')?;
        Ok(items)
    }

    fn linestring(&mut self) -> Result<LineString> {
        if self.empty() {
            return Ok(LineString::default());
        }
        let points = self.list(Self::coord)?;
        if points.len() == 1 {
            return Err(self.error("linestring must have 0 or at least 2 points").into());
        }
        Ok(LineString { points })
    }

    fn polygon(&mut self) -> Result<Polygon> {
        if self.empty() {
            return Ok(Polygon::default());
        }
        let mut rings = self.list(|c| Ok(LineString { points: c.list(Self::coord)? }))?.into_iter();
        let exterior = rings.next().unwrap_or_default();
        Ok(Polygon { exterior, interiors: rings.collect() })
    }

    /// Multipoint item, either `x y`, `(x y)`, or `EMPTY`.
    fn multi_point_item(&mut self) -> Result<Point> {
        if self.empty() {
            return Ok(Point::empty());
        }
        if self.eat(b'(') {
            let point = self.coord()?;
            self.expect(b')')?;
            return Ok(point);
        }
        self.coord()
    }

    fn geometry(&mut self, depth: usize) -> Result<Geometry> {
        if depth > MAX_DEPTH {
            return Err(self.error("geometry nested too deep").into());
        }

        let tag_pos = self.pos;
        let tag = self.word();
        let ty = [
            WkbType::Point,
            WkbType::LineString,
            WkbType::Polygon,
            WkbType::MultiPoint,
            WkbType::MultiLineString,
            WkbType::MultiPolygon,
            WkbType::GeometryCollection,
        ]
        .into_iter()
        .find(|ty| ty.tag().eq_ignore_ascii_case(tag));

        let Some(ty) = ty else {
            self.pos = tag_pos;
            return Err(self.error(format!("unsupported wkt tag {tag:?}")).into());
        };

        // dimension suffix such as `POINT Z`
        if self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            let start = self.pos;
            if !self.empty() {
                self.pos = start;
                return Err(self.error("unsupported geometry dimension").into());
            }
            self.pos = start;
        }

        let geometry = match ty {
            WkbType::Point => {
                if self.empty() {
                    return Ok(Geometry::Point(Point::empty()));
                }
                self.expect(b'(')?;
                let point = self.coord()?;
                self.expect(b')')?;
                Geometry::Point(point)
            },
            WkbType::LineString => Geometry::LineString(self.linestring()?),
            WkbType::Polygon => Geometry::Polygon(self.polygon()?),
            _ if self.empty() => match ty {
                WkbType::MultiPoint => Geometry::MultiPoint(vec![]),
                WkbType::MultiLineString => Geometry::MultiLineString(vec![]),
                WkbType::MultiPolygon => Geometry::MultiPolygon(vec![]),
                _ => Geometry::GeometryCollection(vec![]),
            },
            WkbType::MultiPoint => Geometry::MultiPoint(self.list(Self::multi_point_item)?),
            WkbType::MultiLineString => Geometry::MultiLineString(self.list(Self::linestring)?),
            WkbType::MultiPolygon => Geometry::MultiPolygon(self.list(Self::polygon)?),
            _ => Geometry::GeometryCollection(self.list(|c| c.geometry(depth + 1))?),
        };

        Ok(geometry)
    }
}

impl std::str::FromStr for Geometry {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_wkt(s)
    }
}

// ===== Wkt Writer =====

struct Coords<'a>(&'a [Point]);

impl fmt::Display for Coords<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, p) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(",")?;
            }
            write!(f, "{} {}", p.x, p.y)?;
        }
        f.write_str(")")
    }
}

/// Linestring body, `(x y,...)` or `EMPTY`.
struct LineBody<'a>(&'a LineString);

impl fmt::Display for LineBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.is_empty() {
            true => f.write_str("EMPTY"),
            false => write!(f, "{}", Coords(&self.0.points)),
        }
    }
}

/// Polygon body, `((x y,...),...)` or `EMPTY`.
struct PolygonBody<'a>(&'a Polygon);

impl fmt::Display for PolygonBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("EMPTY");
        }
        f.write_str("(")?;
        for (i, ring) in self.0.rings().enumerate() {
            if i != 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", Coords(&ring.points))?;
        }
        f.write_str(")")
    }
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, value) in items.iter().enumerate() {
        if i != 0 {
            f.write_str(",")?;
        }
        item(f, value)?;
    }
    f.write_str(")")
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.wkb_type().tag();
        if self.is_empty() {
            return write!(f, "{tag} EMPTY");
        }
        f.write_str(tag)?;
        match self {
            Geometry::Point(p) => write!(f, "({} {})", p.x, p.y),
            Geometry::LineString(ls) => write!(f, "{}", LineBody(ls)),
            Geometry::Polygon(polygon) => write!(f, "{}", PolygonBody(polygon)),
            Geometry::MultiPoint(points) => write_list(f, points, |f, p| match p.is_empty() {
                true => f.write_str("EMPTY"),
                false => write!(f, "{} {}", p.x, p.y),
            }),
            Geometry::MultiLineString(lines) => write_list(f, lines, |f, ls| write!(f, "{}", LineBody(ls))),
            Geometry::MultiPolygon(polygons) => {
                write_list(f, polygons, |f, polygon| write!(f, "{}", PolygonBody(polygon)))
            },
            Geometry::GeometryCollection(geometries) => {
                write_list(f, geometries, |f, geometry| write!(f, "{geometry}"))
            },
        }
    }
}

impl From<Point> for Geometry {
    fn from(value: Point) -> Self {
        Geometry::Point(value)
    }
}

impl From<Line> for Geometry {
    fn from(value: Line) -> Self {
        Geometry::LineString(LineString { points: vec![value.point1, value.point2] })
    }
}

impl From<LineString> for Geometry {
    fn from(value: LineString) -> Self {
        Geometry::LineString(value)
    }
}

impl From<Path> for Geometry {
    fn from(value: Path) -> Self {
        Geometry::LineString(value.into())
    }
}

impl From<Polygon> for Geometry {
    fn from(value: Polygon) -> Self {
        Geometry::Polygon(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn reformat(text: &str) -> String {
        Geometry::from_wkt(text).unwrap().to_string()
    }

    #[test]
    fn parse_simple() {
        assert_eq!(
            Geometry::from_wkt("POINT(1 2)").unwrap(),
            Geometry::Point(Point::new(1.0, 2.0))
        );
        assert_eq!(reformat("point ( 1.5  -2 )"), "POINT(1.5 -2)");
        assert_eq!(reformat("LineString(0 0, 1 1)"), "LINESTRING(0 0,1 1)");
        assert_eq!(
            reformat("POLYGON((0 0,4 0,4 4,0 0),(1 1,2 1,2 2,1 1))"),
            "POLYGON((0 0,4 0,4 4,0 0),(1 1,2 1,2 2,1 1))"
        );
    }

    #[test]
    fn parse_multi() {
        assert_eq!(reformat("MULTIPOINT((1 2),(3 4))"), "MULTIPOINT(1 2,3 4)");
        assert_eq!(reformat("MULTIPOINT(1 2, 3 4)"), "MULTIPOINT(1 2,3 4)");
        assert_eq!(
            reformat("MULTILINESTRING((0 0,1 1),EMPTY)"),
            "MULTILINESTRING((0 0,1 1),EMPTY)"
        );
        assert_eq!(
            reformat("MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((5 5,6 5,6 6,5 5)))"),
            "MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((5 5,6 5,6 6,5 5)))"
        );
        assert_eq!(
            reformat("GEOMETRYCOLLECTION(POINT(1 2),GEOMETRYCOLLECTION(LINESTRING(0 0,1 1)))"),
            "GEOMETRYCOLLECTION(POINT(1 2),GEOMETRYCOLLECTION(LINESTRING(0 0,1 1)))"
        );
    }

    #[test]
    fn empty() {
        for text in [
            "POINT EMPTY",
            "LINESTRING EMPTY",
            "POLYGON EMPTY",
            "MULTIPOINT EMPTY",
            "MULTILINESTRING EMPTY",
            "MULTIPOLYGON EMPTY",
            "GEOMETRYCOLLECTION EMPTY",
        ] {
            let geometry = Geometry::from_wkt(&text.to_lowercase()).unwrap();
            assert!(geometry.is_empty());
            assert_eq!(geometry.to_string(), text);

            let wkb = geometry.to_wkb(ByteOrder::LittleEndian).unwrap();
            assert_eq!(wkb_to_wkt(&wkb).unwrap(), text);
        }

        let wkb = wkt_to_wkb("POINT EMPTY", ByteOrder::BigEndian).unwrap();
        assert_eq!(&wkb[5..13], &f64::NAN.to_be_bytes());
    }

    #[test]
    fn wkb_round_trip() {
        for text in [
            "POINT(1 2)",
            "LINESTRING(0 0,1 1,2 0)",
            "POLYGON((0 0,4 0,4 4,0 0),(1 1,2 1,2 2,1 1))",
            "MULTIPOINT(1 2,EMPTY)",
            "MULTIPOLYGON(((0 0,1 0,1 1,0 0)),EMPTY)",
            "GEOMETRYCOLLECTION(POINT(1 2),MULTILINESTRING((0 0,1 1)))",
        ] {
            for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
                let wkb = wkt_to_wkb(text, order).unwrap();
                assert_eq!(wkb[0], order.flag());
                assert_eq!(wkb_to_wkt(&wkb).unwrap(), text);
            }
        }
    }

    #[test]
    fn mixed_byte_order_children() {
        // collection in big endian containing a little endian point
        let mut wkb = vec![0, 0, 0, 0, 7, 0, 0, 0, 1, 1, 1, 0, 0, 0];
        wkb.extend_from_slice(&3.0f64.to_le_bytes());
        wkb.extend_from_slice(&4.0f64.to_le_bytes());
        assert_eq!(wkb_to_wkt(&wkb).unwrap(), "GEOMETRYCOLLECTION(POINT(3 4))");
    }

    #[test]
    fn reject_wkt() {
        for text in [
            "",
            "POINT",
            "POINT(1)",
            "POINT(1 2",
            "POINT(1 2) x",
            "POINT Z (1 2 3)",
            "LINESTRING(0 0)",
            "CIRCULARSTRING(0 0,1 1,2 0)",
            "TRIANGLE((0 0,1 0,0 1,0 0))",
            "MULTIPOINT()",
        ] {
            assert!(Geometry::from_wkt(text).is_err(), "{text:?}");
        }
        assert!(Geometry::from_wkt("POINT(x 1)").unwrap_err().is_numeric());
    }

    #[test]
    fn reject_wkb() {
        // unsupported type
        assert!(wkb_to_wkt(&[0, 0, 0, 0, 8, 0, 0, 0, 0]).unwrap_err().is_format());
        // linestring with 1 point
        let mut wkb = vec![1, 2, 0, 0, 0, 1, 0, 0, 0];
        wkb.extend_from_slice(&[0; 16]);
        assert!(wkb_to_wkt(&wkb).unwrap_err().is_format());
        // trailing bytes
        let mut wkb = wkt_to_wkb("POINT(1 2)", ByteOrder::BigEndian).unwrap().to_vec();
        wkb.push(0);
        assert!(wkb_to_wkt(&wkb).is_err());
        // too deep
        let mut wkb = vec![];
        for _ in 0..=MAX_DEPTH + 1 {
            wkb.extend_from_slice(&[1, 7, 0, 0, 0, 1, 0, 0, 0]);
        }
        assert!(wkb_to_wkt(&wkb).is_err());
    }
}
