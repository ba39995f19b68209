use bytes::{Buf, BufMut, BytesMut};

use crate::{
    error::FormatError,
    geometry::ByteOrder,
};

/// Integer width in wkb and postgres is `u32`/`i32`, while rust lengths are `usize`.
pub trait UsizeExt {
    /// Convert length to `u32`, returns [`FormatError`] instead of wrapping.
    fn to_u32(self) -> Result<u32, FormatError>;
    /// Convert length to `i32`, returns [`FormatError`] instead of wrapping.
    fn to_i32(self) -> Result<i32, FormatError>;
}

/// Byte order aware write in [`BufMut`].
pub trait BufMutExt {
    fn put_wkb_u32(&mut self, value: u32, order: ByteOrder);
    fn put_wkb_f64(&mut self, value: f64, order: ByteOrder);
}

/// Backpatch a previously written placeholder.
pub trait PatchExt {
    /// Overwrite 4 bytes at `pos` with `value` in the given byte order.
    fn patch_wkb_u32(&mut self, pos: usize, value: u32, order: ByteOrder);
}

/// Byte order aware read in [`Buf`], checking remaining length first.
pub trait BufExt {
    fn try_get_wkb_u32(&mut self, order: ByteOrder) -> Result<u32, FormatError>;
    fn try_get_wkb_f64(&mut self, order: ByteOrder) -> Result<f64, FormatError>;
}

/// Helper trait to skip ascii whitespace in byte string.
pub trait SkipExt {
    /// Returns the first index at or after `from` that is not ascii whitespace.
    fn skip_ws(&self, from: usize) -> usize;
}

impl UsizeExt for usize {
    fn to_u32(self) -> Result<u32, FormatError> {
        self.try_into().map_err(|_|FormatError::new("count too large for 32 bit field"))
    }

    fn to_i32(self) -> Result<i32, FormatError> {
        self.try_into().map_err(|_|FormatError::new("count too large for 32 bit field"))
    }
}

impl<B: BufMut> BufMutExt for B {
    fn put_wkb_u32(&mut self, value: u32, order: ByteOrder) {
        match order {
            ByteOrder::BigEndian => self.put_u32(value),
            ByteOrder::LittleEndian => self.put_u32_le(value),
        }
    }

    fn put_wkb_f64(&mut self, value: f64, order: ByteOrder) {
        match order {
            ByteOrder::BigEndian => self.put_f64(value),
            ByteOrder::LittleEndian => self.put_f64_le(value),
        }
    }
}

impl PatchExt for BytesMut {
    fn patch_wkb_u32(&mut self, pos: usize, value: u32, order: ByteOrder) {
        let bytes = match order {
            ByteOrder::BigEndian => value.to_be_bytes(),
            ByteOrder::LittleEndian => value.to_le_bytes(),
        };
        self[pos..pos + size_of::<u32>()].copy_from_slice(&bytes);
    }
}

impl<B: Buf> BufExt for B {
    fn try_get_wkb_u32(&mut self, order: ByteOrder) -> Result<u32, FormatError> {
        if self.remaining() < size_of::<u32>() {
            return Err(FormatError::new("unexpected end of wkb, expected u32"));
        }
        Ok(match order {
            ByteOrder::BigEndian => self.get_u32(),
            ByteOrder::LittleEndian => self.get_u32_le(),
        })
    }

    fn try_get_wkb_f64(&mut self, order: ByteOrder) -> Result<f64, FormatError> {
        if self.remaining() < size_of::<f64>() {
            return Err(FormatError::new("unexpected end of wkb, expected f64"));
        }
        Ok(match order {
            ByteOrder::BigEndian => self.get_f64(),
            ByteOrder::LittleEndian => self.get_f64_le(),
        })
    }
}

impl SkipExt for [u8] {
    fn skip_ws(&self, from: usize) -> usize {
        let mut i = from;
        while i < self.len() && self[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    }
}

/// Helper trait to [`Display`][std::fmt::Display] bytes as hex.
pub trait FmtExt {
    fn hex(&self) -> HexFmt<'_>;
}

/// Hex [`Display`][std::fmt::Display] implementation for bytes.
pub struct HexFmt<'a>(pub &'a [u8]);

impl FmtExt for [u8] {
    fn hex(&self) -> HexFmt<'_> {
        HexFmt(self)
    }
}

impl std::fmt::Display for HexFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HexFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn patch_placeholder() {
        let mut buf = BytesMut::new();
        buf.put_u8(1);
        buf.put_wkb_u32(0, ByteOrder::LittleEndian);
        buf.put_wkb_f64(1.5, ByteOrder::LittleEndian);
        buf.patch_wkb_u32(1, 7, ByteOrder::LittleEndian);
        assert_eq!(&buf[1..5], &[7, 0, 0, 0]);

        buf.patch_wkb_u32(1, 7, ByteOrder::BigEndian);
        assert_eq!(&buf[1..5], &[0, 0, 0, 7]);
    }

    #[test]
    fn short_read() {
        let mut buf = &[0u8, 0, 1][..];
        assert!(buf.try_get_wkb_u32(ByteOrder::BigEndian).is_err());
        let mut buf = &[0u8, 0, 0, 1][..];
        assert_eq!(buf.try_get_wkb_u32(ByteOrder::BigEndian).unwrap(), 1);
    }

    #[test]
    fn hex_display() {
        assert_eq!([0x01u8, 0xab].hex().to_string(), "01AB");
        assert_eq!(b" \t(".skip_ws(0), 2);
    }
}
