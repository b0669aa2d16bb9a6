//! Little-endian cursor over an immutable byte buffer.
//!
//! Every read is bounds-checked against the buffer; running off the end
//! yields [`WadError::TruncatedData`] and leaves the cursor where it was.

use byteorder::{ByteOrder, LittleEndian as LE};

use crate::wad::raw::WadError;

#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Absolute read position.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Jump to `offset` and return the previous position so the caller can
    /// come back after reading a lump body.
    pub fn set_offset(&mut self, offset: usize) -> Result<usize, WadError> {
        if offset > self.data.len() {
            return Err(WadError::TruncatedData {
                offset,
                wanted: 0,
                len: self.data.len(),
            });
        }
        let prev = self.pos;
        self.pos = offset;
        Ok(prev)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], WadError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(WadError::TruncatedData {
                offset: self.pos,
                wanted: n,
                len: self.data.len(),
            })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, WadError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, WadError> {
        Ok(LE::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, WadError> {
        Ok(LE::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, WadError> {
        Ok(LE::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, WadError> {
        Ok(LE::read_i32(self.read_bytes(4)?))
    }

    /// Fixed-length ASCII string, taken verbatim.
    pub fn read_ascii(&mut self, len: usize) -> Result<String, WadError> {
        Ok(self.read_bytes(len)?.iter().map(|&b| b as char).collect())
    }

    /// Fixed-length, NUL-padded ASCII name (lump names, texture names).
    /// Anything from the first NUL on is padding.
    pub fn read_name(&mut self, len: usize) -> Result<String, WadError> {
        Ok(name_from_bytes(self.read_bytes(len)?))
    }
}

/// Decode a NUL-padded name field into a `String`.
pub fn name_from_bytes(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    raw[..end].iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values() {
        let bytes = [0x34, 0x12, 0xFE, 0xFF, 0x78, 0x56, 0x34, 0x12, 0xAB];
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_i32().unwrap(), 0x1234_5678);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn nul_padded_names_are_trimmed() {
        let mut r = ByteReader::new(b"STARTAN3PLAYPAL\0-\0\0\0\0\0\0\0");
        assert_eq!(r.read_name(8).unwrap(), "STARTAN3");
        assert_eq!(r.read_name(8).unwrap(), "PLAYPAL");
        assert_eq!(r.read_name(8).unwrap(), "-");
    }

    #[test]
    fn ascii_keeps_every_byte() {
        let mut r = ByteReader::new(b"IWAD");
        assert_eq!(r.read_ascii(4).unwrap(), "IWAD");
    }

    #[test]
    fn reading_past_end_is_truncation() {
        let bytes = [1u8, 2, 3];
        let mut r = ByteReader::new(&bytes);
        r.read_u16().unwrap();
        let err = r.read_u16().unwrap_err();
        assert!(matches!(
            err,
            WadError::TruncatedData {
                offset: 2,
                wanted: 2,
                len: 3
            }
        ));
        // failed read leaves the cursor in place
        assert_eq!(r.offset(), 2);
        assert_eq!(r.read_u8().unwrap(), 3);
    }

    #[test]
    fn jump_and_return() {
        let bytes = [0u8, 0, 0, 0, 7, 0];
        let mut r = ByteReader::new(&bytes);
        r.read_u16().unwrap();
        let back = r.set_offset(4).unwrap();
        assert_eq!(r.read_u16().unwrap(), 7);
        r.set_offset(back).unwrap();
        assert_eq!(r.offset(), 2);
        assert!(r.set_offset(7).is_err());
    }
}
