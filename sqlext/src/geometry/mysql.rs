//! MySQL internal geometry storage.
//!
//! MySQL store geometry as 4 byte little endian SRID followed by a wkb record, this is also the
//! value sent and received over the protocol for `GEOMETRY` columns.
use bytes::{BufMut, Bytes, BytesMut};

use super::{
    Geometry,
    wkb::{ByteOrder, HEADER_LEN, resolve_type},
};
use crate::{Result, error::FormatError};

const SRID_LEN: usize = size_of::<u32>();

/// Minimum internal length, SRID and wkb header.
pub const MIN_LEN: usize = SRID_LEN + HEADER_LEN;

/// Prefix `wkb` with `srid`.
///
/// Returns [`FormatError`] if `wkb` does not start with a valid wkb header.
pub fn to_internal(srid: u32, wkb: &[u8]) -> Result<Bytes> {
    resolve_type(wkb, 0)?;
    let mut buf = BytesMut::with_capacity(SRID_LEN + wkb.len());
    buf.put_u32_le(srid);
    buf.put_slice(wkb);
    Ok(buf.freeze())
}

/// Split internal value into SRID and wkb.
///
/// Returns [`FormatError`] if input is shorter than 9 bytes or the wkb header is invalid.
pub fn from_internal(value: &[u8]) -> Result<(u32, &[u8])> {
    let Some((srid, wkb)) = value.split_first_chunk::<SRID_LEN>() else {
        return Err(too_short(value.len()).into());
    };
    if value.len() < MIN_LEN {
        return Err(too_short(value.len()).into());
    }
    resolve_type(wkb, 0)?;
    Ok((u32::from_le_bytes(*srid), wkb))
}

fn too_short(len: usize) -> FormatError {
    FormatError::new(format!("mysql geometry requires at least {MIN_LEN} bytes, found {len}"))
}

impl Geometry {
    /// Encode as MySQL internal value, wkb is always little endian.
    pub fn to_mysql(&self, srid: u32) -> Result<Bytes> {
        let wkb = self.to_wkb(ByteOrder::LittleEndian)?;
        to_internal(srid, &wkb)
    }

    /// Decode MySQL internal value, returns SRID and the geometry.
    pub fn from_mysql(value: &[u8]) -> Result<(u32, Geometry)> {
        let (srid, wkb) = from_internal(value)?;
        Ok((srid, Geometry::from_wkb(wkb)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn srid_prefix() {
        let geometry = Geometry::Point(Point::new(1.0, -1.0));
        let value = geometry.to_mysql(4326).unwrap();
        assert_eq!(&value[..4], &4326u32.to_le_bytes());
        assert_eq!(value[4], 1);
        assert_eq!(value.len(), 4 + 21);

        let (srid, decoded) = Geometry::from_mysql(&value).unwrap();
        assert_eq!(srid, 4326);
        assert_eq!(decoded, geometry);
    }

    #[test]
    fn split_internal() {
        let wkb = Geometry::Point(Point::new(0.0, 0.0)).to_wkb(ByteOrder::BigEndian).unwrap();
        let value = to_internal(0, &wkb).unwrap();
        let (srid, rest) = from_internal(&value).unwrap();
        assert_eq!(srid, 0);
        assert_eq!(rest, &wkb[..]);
    }

    #[test]
    fn reject_short() {
        assert!(from_internal(&[]).unwrap_err().is_format());
        assert!(from_internal(&[0, 0, 0, 0, 1, 1, 0, 0]).unwrap_err().is_format());
        assert!(from_internal(&[0, 0, 0, 0, 1, 1, 0, 0, 0]).is_ok());
        assert!(from_internal(&[0, 0, 0, 0, 2, 1, 0, 0, 0]).unwrap_err().is_format());
        assert!(to_internal(0, &[7]).unwrap_err().is_format());
    }
}
