//! Geometric values, text and Well-Known-Binary conversion.
//!
//! Two text grammars are supported:
//!
//! - Postgres geometric text, `(x,y)`, `[(x,y),(x,y)]`, `<(x,y),r>`, and point lists, see
//!   [`Point`], [`Line`], [`Path`], [`Polygon`], [`Circle`], and [`GeoBox`]
//! - OGC Well-Known-Text, `POINT(x y)`, `LINESTRING(x y,x y)`, ..., see [`Geometry`]
//!
//! Both convert to and from OGC Well-Known-Binary, in either [`ByteOrder`].
//!
//! ```
//! use sqlext::geometry::{self, ByteOrder, Line};
//!
//! # fn app() -> sqlext::Result<()> {
//! let wkb = geometry::line_segment_to_wkb("[(0,0),(1,1)]", ByteOrder::BigEndian)?;
//! assert_eq!(geometry::wkb_to_wkt(&wkb)?, "LINESTRING(0 0,1 1)");
//!
//! let line = Line::from_wkb(&wkb)?;
//! assert_eq!(line.to_string(), "[(0,0),(1,1)]");
//! # Ok(())
//! # }
//! # app().unwrap();
//! ```

mod scan;
mod wkb;
mod shape;
mod wkt;
pub mod mysql;

pub use scan::scan_points;
pub use wkb::{
    ByteOrder, WkbReader, WkbType, WkbWriter, resolve_type, resolve_type_from_path,
    resolve_type_from_reader,
};
#[cfg(feature = "tokio")]
pub use wkb::resolve_type_async;
pub use shape::{
    box_from_text, box_to_text, circle_from_text, circle_to_text, line_segment_from_wkb,
    line_segment_to_wkb, linestring_from_wkb, linestring_to_wkb, point_from_wkb, point_to_wkb,
    polygon_from_wkb, polygon_to_wkb,
};
pub use wkt::{Geometry, wkb_to_wkt, wkt_to_wkb};

/// A point on a plane.
///
/// Coordinates are not checked, `NaN` and infinities pass through.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Point {
        Self { x, y }
    }

    /// Point with `NaN` coordinates, the wkb representation of `POINT EMPTY`.
    pub const fn empty() -> Point {
        Self { x: f64::NAN, y: f64::NAN }
    }

    /// Returns `true` if both coordinates are `NaN`.
    pub fn is_empty(&self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }
}

/// Finite line segment, Postgres `lseg`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub point1: Point,
    pub point2: Point,
}

impl Line {
    pub const fn new(point1: Point, point2: Point) -> Line {
        Self { point1, point2 }
    }
}

/// Ordered point sequence, OGC `LINESTRING`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineString {
    pub points: Vec<Point>,
}

impl LineString {
    pub const fn new(points: Vec<Point>) -> LineString {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Postgres `path`, a line string which may be closed.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub points: Vec<Point>,
    /// `((..))` text is closed, `[(..)]` text is open.
    pub closed: bool,
}

impl Path {
    pub const fn new(points: Vec<Point>, closed: bool) -> Path {
        Self { points, closed }
    }
}

impl From<Path> for LineString {
    fn from(path: Path) -> Self {
        LineString { points: path.points }
    }
}

/// Polygon with an outer ring and zero or more hole rings.
///
/// Rings are closed by convention, this is not enforced.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    pub exterior: LineString,
    pub interiors: Vec<LineString>,
}

impl Polygon {
    pub const fn new(exterior: LineString, interiors: Vec<LineString>) -> Polygon {
        Self { exterior, interiors }
    }

    /// Returns `true` if polygon have no rings.
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty() && self.interiors.is_empty()
    }

    /// Iterate over all rings, outer ring first.
    pub fn rings(&self) -> impl Iterator<Item = &LineString> {
        std::iter::once(&self.exterior).chain(&self.interiors)
    }
}

/// Circle, Postgres `circle`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub const fn new(center: Point, radius: f64) -> Circle {
        Self { center, radius }
    }
}

/// Rectangular box, Postgres `box`.
///
/// Corners keep their input order, they are not normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoBox {
    pub point1: Point,
    pub point2: Point,
}

impl GeoBox {
    pub const fn new(point1: Point, point2: Point) -> GeoBox {
        Self { point1, point2 }
    }
}
