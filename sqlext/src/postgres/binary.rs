//! Postgres binary format.
use bytes::{BufMut, Bytes, BytesMut};

use super::{Oid, PgType};
use crate::{
    Result,
    common::verbose,
    error::{FormatError, NumericError, RangeError},
    ext::{FmtExt, UsizeExt},
    geometry::{Circle, GeoBox, Line, LineString, Path, Point, Polygon},
    interval::Interval,
};

const NANOS_PER_MICRO: i128 = 1_000;
const MONTHS_PER_YEAR: i32 = 12;

/// Postgres binary value with its oid.
#[derive(Clone, PartialEq, Eq)]
pub struct Encoded {
    value: Bytes,
    oid: Oid,
}

impl Encoded {
    pub fn new(value: impl Into<Bytes>, oid: Oid) -> Encoded {
        Self { value: value.into(), oid }
    }

    pub fn oid(&self) -> Oid {
        self.oid
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Bytes {
        self.value
    }
}

impl std::fmt::Debug for Encoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoded")
            .field("oid", &self.oid)
            .field("value", &self.value.hex())
            .finish()
    }
}

/// A type that can be encoded as postgres binary value.
pub trait Encode: PgType {
    /// Encode self in binary format.
    fn encode(&self) -> Result<Encoded>;
}

/// A type that can be decoded from postgres binary value.
pub trait Decode: PgType + Sized {
    /// Decode binary value, without checking the oid.
    fn decode_binary(value: &[u8]) -> Result<Self>;

    /// Decode binary value of a column with the given `oid`.
    ///
    /// Returns [`FormatError`] if `oid` is not [`PgType::OID`].
    fn decode(oid: Oid, value: &[u8]) -> Result<Self> {
        if oid != Self::OID {
            return Err(FormatError::new(format!(
                "data type missmatch, expected oid {}, found {oid}",
                Self::OID
            ))
            .into());
        }
        Self::decode_binary(value)
    }
}

// ===== Reader =====

struct Reader<'a>(&'a [u8]);

impl Reader<'_> {
    fn get<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let Some((head, rest)) = self.0.split_first_chunk::<N>() else {
            return Err(FormatError::new(format!(
                "binary value truncated, expected {N} more bytes, found {}",
                self.0.len()
            )));
        };
        self.0 = rest;
        Ok(*head)
    }

    fn u8(&mut self) -> Result<u8, FormatError> {
        self.get::<1>().map(|[b]| b)
    }

    fn i32(&mut self) -> Result<i32, FormatError> {
        self.get().map(i32::from_be_bytes)
    }

    fn i64(&mut self) -> Result<i64, FormatError> {
        self.get().map(i64::from_be_bytes)
    }

    fn f64(&mut self) -> Result<f64, FormatError> {
        self.get().map(f64::from_be_bytes)
    }

    fn point(&mut self) -> Result<Point, FormatError> {
        Ok(Point { x: self.f64()?, y: self.f64()? })
    }

    /// Read `i32` point count followed by points.
    fn points(&mut self) -> Result<Vec<Point>, FormatError> {
        let npts = self.i32()?;
        let Ok(npts) = usize::try_from(npts) else {
            return Err(FormatError::new(format!("negative point count {npts}")));
        };
        if npts.saturating_mul(2 * size_of::<f64>()) > self.0.len() {
            return Err(FormatError::new(format!("point count {npts} exceeds value length")));
        }
        (0..npts).map(|_| self.point()).collect()
    }

    fn finish(self) -> Result<(), FormatError> {
        match self.0.len() {
            0 => Ok(()),
            n => Err(FormatError::new(format!("{n} trailing bytes in binary value"))),
        }
    }
}

fn put_point(buf: &mut BytesMut, point: &Point) {
    buf.put_f64(point.x);
    buf.put_f64(point.y);
}

fn put_points(buf: &mut BytesMut, points: &[Point]) -> Result<()> {
    buf.put_i32(points.len().to_i32()?);
    for point in points {
        put_point(buf, point);
    }
    Ok(())
}

macro_rules! fixed {
    ($ty:ty, $len:expr, |$me:ident, $buf:ident| $encode:block, |$r:ident| $decode:expr) => {
        impl Encode for $ty {
            fn encode(&self) -> Result<Encoded> {
                let $me = self;
                let mut $buf = BytesMut::with_capacity($len);
                $encode
                Ok(Encoded::new($buf, Self::OID))
            }
        }

        impl Decode for $ty {
            fn decode_binary(value: &[u8]) -> Result<Self> {
                let mut $r = Reader(value);
                let decoded = $decode;
                $r.finish()?;
                Ok(decoded)
            }
        }
    };
}

fixed!(Point, 16, |me, buf| { put_point(&mut buf, me); }, |r| r.point()?);

fixed!(
    Line,
    32,
    |me, buf| {
        put_point(&mut buf, &me.point1);
        put_point(&mut buf, &me.point2);
    },
    |r| Line { point1: r.point()?, point2: r.point()? }
);

fixed!(
    GeoBox,
    32,
    |me, buf| {
        put_point(&mut buf, &me.point1);
        put_point(&mut buf, &me.point2);
    },
    |r| GeoBox { point1: r.point()?, point2: r.point()? }
);

fixed!(
    Circle,
    24,
    |me, buf| {
        put_point(&mut buf, &me.center);
        buf.put_f64(me.radius);
    },
    |r| Circle { center: r.point()?, radius: r.f64()? }
);

impl Encode for Path {
    fn encode(&self) -> Result<Encoded> {
        let mut buf = BytesMut::with_capacity(1 + 4 + self.points.len() * 16);
        buf.put_u8(self.closed.into());
        put_points(&mut buf, &self.points)?;
        Ok(Encoded::new(buf, Self::OID))
    }
}

impl Decode for Path {
    fn decode_binary(value: &[u8]) -> Result<Self> {
        let mut r = Reader(value);
        let closed = match r.u8()? {
            0 => false,
            1 => true,
            n => return Err(FormatError::new(format!("invalid path closed flag {n}")).into()),
        };
        let points = r.points()?;
        r.finish()?;
        Ok(Path { points, closed })
    }
}

impl Encode for Polygon {
    /// Returns [`FormatError`] if polygon have holes.
    fn encode(&self) -> Result<Encoded> {
        if !self.interiors.is_empty() {
            return Err(FormatError::new("postgres polygon cannot have holes").into());
        }
        let points = &self.exterior.points;
        let mut buf = BytesMut::with_capacity(4 + points.len() * 16);
        put_points(&mut buf, points)?;
        Ok(Encoded::new(buf, Self::OID))
    }
}

impl Decode for Polygon {
    fn decode_binary(value: &[u8]) -> Result<Self> {
        let mut r = Reader(value);
        let points = r.points()?;
        r.finish()?;
        Ok(Polygon { exterior: LineString { points }, interiors: vec![] })
    }
}

impl Encode for Interval {
    /// Returns [`RangeError::Precision`] if nanos is not a whole microsecond, or
    /// [`NumericError::Overflow`] if the folded value does not fit.
    fn encode(&self) -> Result<Encoded> {
        let months = self
            .years()
            .checked_mul(MONTHS_PER_YEAR)
            .and_then(|m| m.checked_add(self.months()))
            .ok_or(NumericError::Overflow)?;

        if i128::from(self.nanos()) % NANOS_PER_MICRO != 0 {
            return Err(RangeError::Precision(self.nanos()).into());
        }

        let total = self.total_nanos().ok_or(NumericError::Overflow)?;
        let micros = i64::try_from(total / NANOS_PER_MICRO).map_err(|_| NumericError::Overflow)?;

        verbose!(micros, days = self.days(), months, "encode interval");

        let mut buf = BytesMut::with_capacity(16);
        buf.put_i64(micros);
        buf.put_i32(self.days());
        buf.put_i32(months);
        Ok(Encoded::new(buf, Self::OID))
    }
}

impl Decode for Interval {
    fn decode_binary(value: &[u8]) -> Result<Self> {
        let mut r = Reader(value);
        let micros = r.i64()?;
        let days = r.i32()?;
        let months = r.i32()?;
        r.finish()?;

        verbose!(micros, days, months, "decode interval");

        let total = i128::from(micros) * NANOS_PER_MICRO;
        let (seconds, nanos) = Interval::split_nanos(total).ok_or(NumericError::Overflow)?;

        Interval::new(
            months / MONTHS_PER_YEAR,
            months % MONTHS_PER_YEAR,
            days,
            seconds,
            nanos,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip<T: Encode + Decode + PartialEq + std::fmt::Debug>(value: T) -> Encoded {
        let encoded = value.encode().unwrap();
        assert_eq!(encoded.oid(), T::OID);
        let decoded = T::decode(encoded.oid(), encoded.value()).unwrap();
        assert_eq!(decoded, value);
        encoded
    }

    #[test]
    fn point_layout() {
        let encoded = round_trip(Point::new(1.0, 2.0));
        assert_eq!(encoded.oid(), 600);
        assert_eq!(&encoded.value()[..8], &1.0f64.to_be_bytes());
        assert_eq!(encoded.value().len(), 16);
        assert_eq!(
            format!("{encoded:?}"),
            "Encoded { oid: 600, value: x\"3FF00000000000004000000000000000\" }"
        );
    }

    #[test]
    fn fixed_shapes() {
        let a = Point::new(0.0, -1.5);
        let b = Point::new(3.0, 4.0);
        assert_eq!(round_trip(Line::new(a, b)).value().len(), 32);
        assert_eq!(round_trip(GeoBox::new(b, a)).value().len(), 32);
        assert_eq!(round_trip(Circle::new(a, 2.5)).value().len(), 24);
    }

    #[test]
    fn path_layout() {
        let path = Path::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)], true);
        let encoded = round_trip(path);
        assert_eq!(encoded.value()[0], 1);
        assert_eq!(&encoded.value()[1..5], &2i32.to_be_bytes());
        assert_eq!(encoded.value().len(), 1 + 4 + 32);

        round_trip(Path::new(vec![Point::new(5.0, 5.0)], false));
    }

    #[test]
    fn polygon_layout() {
        let exterior = LineString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ]);
        let encoded = round_trip(Polygon::new(exterior.clone(), vec![]));
        assert_eq!(encoded.value().len(), 4 + 48);

        let holed = Polygon::new(exterior.clone(), vec![exterior]);
        assert!(holed.encode().unwrap_err().is_format());
    }

    #[test]
    fn interval_layout() {
        let interval = Interval::new(1, 2, 3, -61, 500_000_000).unwrap();
        let encoded = round_trip(interval);
        let value = encoded.value();
        assert_eq!(&value[..8], &(-61_500_000i64).to_be_bytes());
        assert_eq!(&value[8..12], &3i32.to_be_bytes());
        assert_eq!(&value[12..], &14i32.to_be_bytes());

        round_trip(Interval::of_duration(0, -250_000).unwrap());
        round_trip(Interval::new(-1, -5, 0, 0, 0).unwrap());
        round_trip(Interval::ZERO);
    }

    #[test]
    fn interval_precision() {
        let interval = Interval::of_duration(1, 1).unwrap();
        assert!(interval.encode().unwrap_err().is_range());

        let interval = Interval::of_period(i32::MAX, 1, 0);
        assert!(interval.encode().unwrap_err().is_numeric());
    }

    #[test]
    fn reject_binary() {
        assert!(Point::decode(601, &[0; 16]).unwrap_err().is_format());
        assert!(Point::decode_binary(&[0; 15]).unwrap_err().is_format());
        assert!(Point::decode_binary(&[0; 17]).unwrap_err().is_format());
        assert!(Circle::decode_binary(&[0; 16]).is_err());
        assert!(Path::decode_binary(&[2, 0, 0, 0, 0]).unwrap_err().is_format());
        assert!(Path::decode_binary(&[0, 0xff, 0xff, 0xff, 0xff]).unwrap_err().is_format());
        assert!(Polygon::decode_binary(&[0, 0, 0, 2, 0, 0]).unwrap_err().is_format());
        assert!(Interval::decode_binary(&[0; 15]).unwrap_err().is_format());
    }
}
