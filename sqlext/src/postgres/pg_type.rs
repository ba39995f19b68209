use crate::{
    geometry::{Circle, GeoBox, Line, Path, Point, Polygon},
    interval::Interval,
};

/// Postgres object identifier.
///
/// The oid type is implemented as an unsigned four-byte integer.
///
/// <https://www.postgresql.org/docs/current/datatype-oid.html>
pub type Oid = u32;

/// A type that have corresponding postgres oid.
pub trait PgType {
    const OID: Oid;
}

macro_rules! oid {
    ($ty:ty, $oid:literal $(, $doc:literal)? ) => {
        impl PgType for $ty {
            $(#[doc = $doc])?
            const OID: Oid = $oid;
        }
    };
}

oid!(Point, 600, "`point` geometric point '(x, y)'");
oid!(Line, 601, "`lseg` geometric line segment '(pt1,pt2)'");
oid!(Path, 602, "`path` geometric path '(pt1,...)'");
oid!(GeoBox, 603, "`box` geometric box '(lower left,upper right)'");
oid!(Polygon, 604, "`polygon` geometric polygon '(pt1,...)'");
oid!(Circle, 718, "`circle` geometric circle '(center,radius)'");
oid!(Interval, 1186, "`interval` time interval, @ <number> <units>");
