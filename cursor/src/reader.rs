//! Byte-level reader with bounded, little-endian operations.

use tracing::warn;

use crate::error::{CursorError, CursorResult};

/// Expected tag word following the length prefix of a stored string.
pub const STRING_TAG: u16 = 0x0A60;

/// A seekable, positioned reader over an in-memory byte buffer.
///
/// All multi-byte reads are little-endian and bounds-checked; a read that
/// cannot obtain the requested byte count returns
/// [`CursorError::EndOfData`] and never panics. Positions reported by
/// [`tell`](Self::tell) and accepted by [`seek`](Self::seek) are relative
/// to an optional base offset fixed at construction.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor over `data`, positioned at the start.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    /// Creates a cursor whose position 0 maps to `base` within `data`.
    #[must_use]
    pub const fn with_base(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            pos: base,
            base,
        }
    }

    /// Returns the current position, relative to the base offset.
    #[must_use]
    pub const fn tell(&self) -> usize {
        self.pos - self.base
    }

    /// Moves the cursor to `pos`, relative to the base offset.
    pub fn seek(&mut self, pos: usize) {
        self.pos = self.base + pos;
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads exactly `length` bytes, or fails with [`CursorError::EndOfData`].
    pub fn read(&mut self, length: usize) -> CursorResult<&'a [u8]> {
        if length > self.remaining() {
            return Err(CursorError::EndOfData {
                requested: length,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + length];
        self.pos += length;
        Ok(bytes)
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> CursorResult<u8> {
        let bytes = self.read_array::<1>()?;
        Ok(bytes[0])
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> CursorResult<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> CursorResult<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_s32(&mut self) -> CursorResult<i32> {
        Ok(i32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> CursorResult<u64> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a little-endian `f32`.
    pub fn read_f32(&mut self) -> CursorResult<f32> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a length-prefixed string: a `u16` length, a `u16` tag expected
    /// to equal [`STRING_TAG`], then `length` bytes of UTF-8.
    ///
    /// An unexpected tag is logged as a warning and otherwise ignored; some
    /// real files carry other tag values and still decode fine.
    pub fn read_string(&mut self) -> CursorResult<String> {
        let length = self.read_u16()?;
        let tag = self.read_u16()?;
        if tag != STRING_TAG {
            warn!(
                tag = format_args!("{tag:#06x}"),
                position = self.tell() - 4,
                "unexpected string tag"
            );
        }
        let position = self.tell();
        let bytes = self.read(usize::from(length))?;
        let text = std::str::from_utf8(bytes)
            .map_err(|_| CursorError::InvalidString { position })?;
        Ok(text.to_owned())
    }

    fn read_array<const N: usize>(&mut self) -> CursorResult<[u8; N]> {
        let bytes = self.read(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cursor() {
        let cursor = ByteCursor::new(&[]);
        assert!(cursor.is_empty());
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.tell(), 0);
    }

    #[test]
    fn read_from_empty_fails() {
        let mut cursor = ByteCursor::new(&[]);
        let err = cursor.read_u8().unwrap_err();
        assert_eq!(
            err,
            CursorError::EndOfData {
                requested: 1,
                available: 0,
            }
        );
    }

    #[test]
    fn fixed_width_reads_are_little_endian() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(cursor.read_s32().unwrap(), -1);
        assert!(cursor.is_empty());
    }

    #[test]
    fn read_u16_and_u64() {
        let data = [0x01, 0x02, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u16().unwrap(), 0x0201);
        assert_eq!(cursor.read_u64().unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn read_f32() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_le_bytes());
        let mut cursor = ByteCursor::new(&data);
        assert!((cursor.read_f32().unwrap() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn read_exact_slice() {
        let data = [1u8, 2, 3, 4, 5];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read(3).unwrap(), &[1, 2, 3]);
        assert_eq!(cursor.tell(), 3);
        let err = cursor.read(3).unwrap_err();
        assert_eq!(
            err,
            CursorError::EndOfData {
                requested: 3,
                available: 2,
            }
        );
    }

    #[test]
    fn short_read_does_not_advance() {
        let data = [1u8, 2];
        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.read_u32().is_err());
        assert_eq!(cursor.tell(), 0);
        assert_eq!(cursor.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn seek_and_tell() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let mut cursor = ByteCursor::new(&data);
        cursor.seek(4);
        assert_eq!(cursor.tell(), 4);
        assert_eq!(cursor.read_u8().unwrap(), 4);
        cursor.seek(0);
        assert_eq!(cursor.read_u8().unwrap(), 0);
    }

    #[test]
    fn base_offset_applies_to_seek_and_tell() {
        let data = [9u8, 9, 9, 1, 2, 3];
        let mut cursor = ByteCursor::with_base(&data, 3);
        assert_eq!(cursor.tell(), 0);
        assert_eq!(cursor.read_u8().unwrap(), 1);
        cursor.seek(2);
        assert_eq!(cursor.read_u8().unwrap(), 3);
        assert_eq!(cursor.tell(), 3);
    }

    #[test]
    fn read_string_with_expected_tag() {
        let mut data = Vec::new();
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(&STRING_TAG.to_le_bytes());
        data.extend_from_slice(b"hello");
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "hello");
        assert!(cursor.is_empty());
    }

    #[test]
    fn read_string_with_unexpected_tag_is_lenient() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&0xBEEFu16.to_le_bytes());
        data.extend_from_slice(b"ok");
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "ok");
    }

    #[test]
    fn read_string_invalid_utf8() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&STRING_TAG.to_le_bytes());
        data.extend_from_slice(&[0xFF, 0xFE]);
        let mut cursor = ByteCursor::new(&data);
        let err = cursor.read_string().unwrap_err();
        assert_eq!(err, CursorError::InvalidString { position: 4 });
    }

    #[test]
    fn read_string_truncated_body() {
        let mut data = Vec::new();
        data.extend_from_slice(&10u16.to_le_bytes());
        data.extend_from_slice(&STRING_TAG.to_le_bytes());
        data.extend_from_slice(b"abc");
        let mut cursor = ByteCursor::new(&data);
        let err = cursor.read_string().unwrap_err();
        assert!(matches!(err, CursorError::EndOfData { requested: 10, .. }));
    }
}
