//! Postgres geometric text.
//!
//! | type      | text                        | wkb                    |
//! |-----------|-----------------------------|------------------------|
//! | [`Point`] | `(x,y)`                     | `POINT`                |
//! | [`Line`]  | `[(x1,y1),(x2,y2)]`         | `LINESTRING`, 2 points |
//! | [`Path`]  | `[(x1,y1),...]` or `((..))` | `LINESTRING`, n >= 2   |
//! | [`Polygon`] | `((x1,y1),...)`           | `POLYGON`, 1 ring      |
//! | [`Circle`] | `<(x,y),r>`                | none                   |
//! | [`GeoBox`] | `(x1,y1),(x2,y2)`          | none                   |
use std::fmt;

use bytes::Bytes;

use super::{
    Circle, GeoBox, Line, LineString, Path, Point, Polygon,
    scan::{coordinate, scan_points},
    wkb::{ByteOrder, POINT_LEN, WkbReader, WkbType, WkbWriter},
};
use crate::{
    Result,
    common::{span, verbose},
    error::FormatError,
    ext::{SkipExt, UsizeExt},
};

type Delim = Option<(u8, u8)>;

fn format_error(text: &str, reason: impl Into<std::borrow::Cow<'static, str>>, offset: usize) -> FormatError {
    FormatError::new(reason).at(offset).input(text)
}

/// Check the opening delimiter, scan points, then check closing delimiter and trailing input.
fn scan_enclosed<F>(text: &str, delim: Delim, on_pair: F) -> Result<()>
where
    F: FnMut(f64, f64),
{
    let bytes = text.as_bytes();
    let mut pos = bytes.skip_ws(0);

    if let Some((open, _)) = delim {
        if bytes.get(pos) != Some(&open) {
            return Err(format_error(text, format!("expected '{}'", open as char), pos).into());
        }
        pos += 1;
    }

    let mut end = scan_points(text, pos, on_pair)?;

    if let Some((_, close)) = delim {
        end = bytes.skip_ws(end);
        if bytes.get(end) != Some(&close) {
            return Err(format_error(text, format!("expected '{}'", close as char), end).into());
        }
        end += 1;
    }

    let end = bytes.skip_ws(end);
    if end != bytes.len() {
        return Err(format_error(text, "unexpected trailing characters", end).into());
    }

    Ok(())
}

/// Scan exactly `N` points.
fn scan_exact<const N: usize>(text: &str, delim: Delim) -> Result<[Point; N]> {
    let mut points = [Point::default(); N];
    let mut count = 0;
    scan_enclosed(text, delim, |x, y| {
        if let Some(point) = points.get_mut(count) {
            *point = Point { x, y };
        }
        count += 1;
    })?;
    if count != N {
        return Err(format_error(text, format!("expected {N} points, found {count}"), 0).into());
    }
    Ok(points)
}

fn scan_vec(text: &str, delim: Delim) -> Result<Vec<Point>> {
    let mut points = vec![];
    scan_enclosed(text, delim, |x, y| points.push(Point { x, y }))?;
    Ok(points)
}

/// Resolve point list enclosure, `[..]` is open, `((..))` and bare list is closed.
fn list_delim(text: &str, allow_bracket: bool) -> (Delim, bool) {
    let bytes = text.as_bytes();
    let pos = bytes.skip_ws(0);
    match bytes.get(pos) {
        Some(b'[') if allow_bracket => (Some((b'[', b']')), false),
        Some(b'(') if bytes.get(bytes.skip_ws(pos + 1)) == Some(&b'(') => {
            (Some((b'(', b')')), true)
        },
        _ => (None, true),
    }
}

/// Write `(x,y),(x,y),...`.
fn write_points(f: &mut fmt::Formatter<'_>, points: &[Point]) -> fmt::Result {
    for (i, point) in points.iter().enumerate() {
        if i != 0 {
            f.write_str(",")?;
        }
        fmt::Display::fmt(point, f)?;
    }
    Ok(())
}

// ===== Point =====

impl Point {
    /// Parse `(x,y)`.
    pub fn parse(text: &str) -> Result<Point> {
        let [point] = scan_exact::<1>(text, None)?;
        Ok(point)
    }

    /// Encode as wkb `POINT`.
    pub fn to_wkb(&self, order: ByteOrder) -> Bytes {
        let mut w = WkbWriter::new(order);
        w.header(WkbType::Point);
        w.point(self);
        w.finish()
    }

    /// Decode wkb `POINT`.
    pub fn from_wkb(wkb: &[u8]) -> Result<Point> {
        let mut r = WkbReader::new(wkb);
        r.expect(WkbType::Point)?;
        let point = r.point()?;
        r.finish()?;
        Ok(point)
    }
}

/// Convert `(x,y)` text to wkb `POINT`.
pub fn point_to_wkb(text: &str, order: ByteOrder) -> Result<Bytes> {
    span!("point_to_wkb", text);
    Ok(Point::parse(text)?.to_wkb(order))
}

/// Decode wkb `POINT`.
pub fn point_from_wkb(wkb: &[u8]) -> Result<Point> {
    Point::from_wkb(wkb)
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl std::str::FromStr for Point {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ===== Line =====

impl Line {
    /// Parse `[(x1,y1),(x2,y2)]`, the `((..),(..))` and bare `(..),(..)` form are also accepted.
    pub fn parse(text: &str) -> Result<Line> {
        let (delim, _) = list_delim(text, true);
        let [point1, point2] = scan_exact::<2>(text, delim)?;
        Ok(Line { point1, point2 })
    }

    /// Encode as wkb `LINESTRING` with 2 points.
    pub fn to_wkb(&self, order: ByteOrder) -> Bytes {
        let mut w = WkbWriter::with_capacity(order, 9 + 2 * POINT_LEN);
        w.header(WkbType::LineString);
        w.u32(2);
        w.point(&self.point1);
        w.point(&self.point2);
        w.finish()
    }

    /// Decode wkb `LINESTRING` with exactly 2 points.
    pub fn from_wkb(wkb: &[u8]) -> Result<Line> {
        let mut r = WkbReader::new(wkb);
        r.expect(WkbType::LineString)?;
        let count = r.u32()?;
        if count != 2 {
            return Err(FormatError::new(format!("line segment requires 2 points, found {count}")).into());
        }
        let line = Line { point1: r.point()?, point2: r.point()? };
        r.finish()?;
        Ok(line)
    }
}

/// Convert `[(x1,y1),(x2,y2)]` text to wkb `LINESTRING`.
pub fn line_segment_to_wkb(text: &str, order: ByteOrder) -> Result<Bytes> {
    span!("line_segment_to_wkb", text);

    let (delim, _) = list_delim(text, true);
    let mut w = WkbWriter::for_text(order, text);
    w.header(WkbType::LineString);
    w.u32(2);

    let start = w.len();
    scan_enclosed(text, delim, |x, y| {
        w.f64(x);
        w.f64(y);
    })?;

    let payload = w.len() - start;
    if payload != 2 * POINT_LEN {
        let found = payload / POINT_LEN;
        return Err(format_error(text, format!("line segment requires 2 points, found {found}"), 0).into());
    }

    Ok(w.finish())
}

/// Decode wkb `LINESTRING` with exactly 2 points.
pub fn line_segment_from_wkb(wkb: &[u8]) -> Result<Line> {
    Line::from_wkb(wkb)
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.point1, self.point2)
    }
}

impl std::str::FromStr for Line {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ===== Path =====

/// Minimum point count of a path encoded as wkb.
const PATH_MIN_POINTS: usize = 2;

impl Path {
    /// Parse open path `[(x1,y1),...]`, or closed path `((x1,y1),...)` and bare `(x1,y1),...`.
    pub fn parse(text: &str) -> Result<Path> {
        let (delim, closed) = list_delim(text, true);
        let points = scan_vec(text, delim)?;
        Ok(Path { points, closed })
    }

    /// Encode as wkb `LINESTRING`.
    ///
    /// Returns [`FormatError`] if path have less than 2 points.
    pub fn to_wkb(&self, order: ByteOrder) -> Result<Bytes> {
        if self.points.len() < PATH_MIN_POINTS {
            return Err(path_too_short(self.points.len()).into());
        }
        let mut w = WkbWriter::with_capacity(order, 9 + self.points.len() * POINT_LEN);
        w.header(WkbType::LineString);
        w.points(&self.points)?;
        Ok(w.finish())
    }

    /// Decode wkb `LINESTRING` as open path.
    ///
    /// Returns [`FormatError`] if there is less than 2 points.
    pub fn from_wkb(wkb: &[u8]) -> Result<Path> {
        let LineString { points } = linestring_from_wkb(wkb)?;
        Ok(Path { points, closed: false })
    }
}

fn path_too_short(found: usize) -> FormatError {
    FormatError::new(format!("path requires at least {PATH_MIN_POINTS} points, found {found}"))
}

/// Convert path text to wkb `LINESTRING`.
///
/// Accepts `[(x1,y1),...]`, `((x1,y1),...)`, and bare `(x1,y1),...`. The point count is
/// backpatched after the scan.
///
/// Returns [`FormatError`] if there is less than 2 points.
pub fn linestring_to_wkb(text: &str, order: ByteOrder) -> Result<Bytes> {
    span!("linestring_to_wkb", text);

    let (delim, _) = list_delim(text, true);
    let mut w = WkbWriter::for_text(order, text);
    w.header(WkbType::LineString);
    let pos = w.placeholder();

    let mut count = 0usize;
    scan_enclosed(text, delim, |x, y| {
        w.f64(x);
        w.f64(y);
        count += 1;
    })?;

    if count < PATH_MIN_POINTS {
        return Err(path_too_short(count).input(text).into());
    }
    w.patch(pos, count.to_u32()?);

    verbose!(count, "linestring");
    Ok(w.finish())
}

/// Decode wkb `LINESTRING`.
///
/// Returns [`FormatError`] if there is less than 2 points, see [`Geometry`][super::Geometry]
/// for `LINESTRING EMPTY`.
pub fn linestring_from_wkb(wkb: &[u8]) -> Result<LineString> {
    let mut r = WkbReader::new(wkb);
    r.expect(WkbType::LineString)?;
    let points = r.points()?;
    r.finish()?;
    if points.len() < PATH_MIN_POINTS {
        return Err(path_too_short(points.len()).into());
    }
    Ok(LineString { points })
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.closed {
            true => ("(", ")"),
            false => ("[", "]"),
        };
        f.write_str(open)?;
        write_points(f, &self.points)?;
        f.write_str(close)
    }
}

impl std::str::FromStr for Path {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ===== Polygon =====

impl Polygon {
    /// Parse `((x1,y1),...)` or bare `(x1,y1),...` as the outer ring.
    pub fn parse(text: &str) -> Result<Polygon> {
        let (delim, _) = list_delim(text, false);
        let points = scan_vec(text, delim)?;
        Ok(Polygon { exterior: LineString { points }, interiors: vec![] })
    }

    /// Encode as wkb `POLYGON`.
    pub fn to_wkb(&self, order: ByteOrder) -> Result<Bytes> {
        let mut w = WkbWriter::new(order);
        self.write_wkb(&mut w)?;
        Ok(w.finish())
    }

    pub(crate) fn write_wkb(&self, w: &mut WkbWriter) -> Result<(), FormatError> {
        w.header(WkbType::Polygon);
        if self.is_empty() {
            w.u32(0);
            return Ok(());
        }
        w.count(1 + self.interiors.len())?;
        for ring in self.rings() {
            w.points(&ring.points)?;
        }
        Ok(())
    }

    /// Decode wkb `POLYGON`.
    pub fn from_wkb(wkb: &[u8]) -> Result<Polygon> {
        let mut r = WkbReader::new(wkb);
        r.expect(WkbType::Polygon)?;
        let polygon = Self::read_wkb_body(&mut r)?;
        r.finish()?;
        Ok(polygon)
    }

    /// Read ring count and rings, after the header.
    pub(crate) fn read_wkb_body(r: &mut WkbReader<'_>) -> Result<Polygon, FormatError> {
        let count = r.count(size_of::<u32>())?;
        let mut rings = (0..count).map(|_| r.points().map(LineString::new));
        let exterior = rings.next().transpose()?.unwrap_or_default();
        let interiors = rings.collect::<Result<_, _>>()?;
        Ok(Polygon { exterior, interiors })
    }

    /// Format as Postgres `((x1,y1),...)`.
    ///
    /// Returns [`FormatError`] if polygon have holes, which Postgres polygon cannot represent.
    pub fn to_pg_text(&self) -> Result<String> {
        if !self.interiors.is_empty() {
            return Err(FormatError::new("postgres polygon cannot have holes").into());
        }
        Ok(Path { points: self.exterior.points.clone(), closed: true }.to_string())
    }
}

/// Convert `((x1,y1),...)` text to wkb `POLYGON` with a single ring.
pub fn polygon_to_wkb(text: &str, order: ByteOrder) -> Result<Bytes> {
    span!("polygon_to_wkb", text);

    let (delim, _) = list_delim(text, false);
    let mut w = WkbWriter::for_text(order, text);
    w.header(WkbType::Polygon);
    w.u32(1);
    let pos = w.placeholder();

    let mut count = 0usize;
    scan_enclosed(text, delim, |x, y| {
        w.f64(x);
        w.f64(y);
        count += 1;
    })?;
    w.patch(pos, count.to_u32()?);

    verbose!(count, "polygon");
    Ok(w.finish())
}

/// Decode wkb `POLYGON`.
pub fn polygon_from_wkb(wkb: &[u8]) -> Result<Polygon> {
    Polygon::from_wkb(wkb)
}

impl std::str::FromStr for Polygon {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ===== Circle =====

impl Circle {
    /// Parse `<(x,y),r>`.
    pub fn parse(text: &str) -> Result<Circle> {
        let bytes = text.as_bytes();
        let pos = bytes.skip_ws(0);
        if bytes.get(pos) != Some(&b'<') {
            return Err(format_error(text, "expected '<'", pos).into());
        }

        let mut center = None;
        let mut count = 0;
        let end = scan_points(text, pos + 1, |x, y| {
            center = Some(Point { x, y });
            count += 1;
        })?;
        let (Some(center), 1) = (center, count) else {
            return Err(format_error(text, "circle requires exactly one center point", pos).into());
        };

        let comma = bytes.skip_ws(end);
        if bytes.get(comma) != Some(&b',') {
            return Err(format_error(text, "expected ',' before radius", comma).into());
        }

        let Some(close) = bytes[comma..].iter().position(|&b| b == b'>').map(|i| comma + i) else {
            return Err(format_error(text, "expected '>'", bytes.len()).into());
        };
        let radius = coordinate(&text[comma + 1..close])?;

        let trailing = bytes.skip_ws(close + 1);
        if trailing != bytes.len() {
            return Err(format_error(text, "unexpected trailing characters", trailing).into());
        }

        Ok(Circle { center, radius })
    }
}

/// Parse `<(x,y),r>`.
pub fn circle_from_text(text: &str) -> Result<Circle> {
    Circle::parse(text)
}

/// Format `<(x,y),r>`.
pub fn circle_to_text(circle: &Circle) -> String {
    circle.to_string()
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{}>", self.center, self.radius)
    }
}

impl std::str::FromStr for Circle {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ===== Box =====

impl GeoBox {
    /// Parse `(x1,y1),(x2,y2)`, the enclosed `((..),(..))` form is also accepted.
    pub fn parse(text: &str) -> Result<GeoBox> {
        let (delim, _) = list_delim(text, false);
        let [point1, point2] = scan_exact::<2>(text, delim)?;
        Ok(GeoBox { point1, point2 })
    }
}

/// Parse `(x1,y1),(x2,y2)`.
pub fn box_from_text(text: &str) -> Result<GeoBox> {
    GeoBox::parse(text)
}

/// Format `(x1,y1),(x2,y2)`.
pub fn box_to_text(geo_box: &GeoBox) -> String {
    geo_box.to_string()
}

impl fmt::Display for GeoBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.point1, self.point2)
    }
}

impl std::str::FromStr for GeoBox {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
