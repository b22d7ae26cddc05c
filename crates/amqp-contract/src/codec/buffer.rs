// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable byte buffer with a read cursor.
//!
//! Writes append to the end and never fail. Reads advance a cursor and fail
//! with [`Error::InsufficientData`] on short input. All multi-byte values are
//! big-endian (AMQP network byte order).

use crate::error::{Error, Result};

/// Generate write methods for fixed-size integers.
macro_rules! impl_write_be {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.data.extend_from_slice(&value.to_be_bytes());
        }
    };
}

/// Generate read methods for fixed-size integers.
///
/// Each generated method checks bounds, converts from big-endian and
/// advances the cursor.
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let bytes = self.read_array::<$size>()?;
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Byte buffer used by every encoder and decoder in the crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read: usize,
    depth: usize,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            read: 0,
            depth: 0,
        }
    }

    // Generate write methods via macro
    impl_write_be!(write_u8, u8);
    impl_write_be!(write_u16, u16);
    impl_write_be!(write_u32, u32);
    impl_write_be!(write_u64, u64);
    impl_write_be!(write_i8, i8);
    impl_write_be!(write_i16, i16);
    impl_write_be!(write_i32, i32);
    impl_write_be!(write_i64, i64);

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    // Generate read methods via macro
    impl_read_be!(read_u8, u8, 1);
    impl_read_be!(read_u16, u16, 2);
    impl_read_be!(read_u32, u32, 4);
    impl_read_be!(read_u64, u64, 8);
    impl_read_be!(read_i8, i8, 1);
    impl_read_be!(read_i16, i16, 2);
    impl_read_be!(read_i32, i32, 4);
    impl_read_be!(read_i64, i64, 8);

    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        self.ensure(len)?;
        let slice = &self.data[self.read..self.read + len];
        self.read += len;
        Ok(slice)
    }

    /// Next byte without advancing the cursor.
    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.data[self.read])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.read_bytes(N)?);
        Ok(bytes)
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::InsufficientData {
                offset: self.read,
                needed,
            });
        }
        Ok(())
    }

    /// Read cursor position.
    pub fn offset(&self) -> usize {
        self.read
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.read)
    }

    pub fn is_eof(&self) -> bool {
        self.read >= self.data.len()
    }

    /// Total bytes written.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Everything written so far, including consumed bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Bytes not consumed yet.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.read..]
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Drop written bytes past `len`. The cursor is clamped.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
        self.read = self.read.min(len);
    }

    /// Move the cursor back to an earlier offset.
    pub(crate) fn rewind(&mut self, offset: usize, depth: usize) {
        self.read = offset.min(self.data.len());
        self.depth = depth;
    }

    /// Current nesting depth of the decoder.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter one level of nested decoding.
    pub fn descend(&mut self, max_depth: usize) -> Result<()> {
        if self.depth >= max_depth {
            return Err(Error::LimitExceeded(format!(
                "nesting depth exceeds {} at offset {}",
                max_depth, self.read
            )));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data,
            read: 0,
            depth: 0,
        }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(data: &[u8]) -> Self {
        Self::from(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_U16: u16 = 0xCDEF;
    const TEST_U32: u32 = 0x1234_5678;
    const TEST_U64: u64 = 0x1122_3344_5566_7788;

    #[test]
    fn test_write_is_big_endian() {
        let mut buf = ByteBuffer::new();
        buf.write_u16(TEST_U16);
        buf.write_u32(TEST_U32);
        assert_eq!(buf.as_slice(), &[0xCD, 0xEF, 0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_roundtrip_across_numeric_types() {
        let mut buf = ByteBuffer::new();
        buf.write_u8(0xAB);
        buf.write_u16(TEST_U16);
        buf.write_u32(TEST_U32);
        buf.write_u64(TEST_U64);
        buf.write_i8(-5);
        buf.write_i16(-300);
        buf.write_i32(-70_000);
        buf.write_i64(i64::MIN);

        assert_eq!(buf.read_u8().unwrap(), 0xAB);
        assert_eq!(buf.read_u16().unwrap(), TEST_U16);
        assert_eq!(buf.read_u32().unwrap(), TEST_U32);
        assert_eq!(buf.read_u64().unwrap(), TEST_U64);
        assert_eq!(buf.read_i8().unwrap(), -5);
        assert_eq!(buf.read_i16().unwrap(), -300);
        assert_eq!(buf.read_i32().unwrap(), -70_000);
        assert_eq!(buf.read_i64().unwrap(), i64::MIN);
        assert!(buf.is_eof());
    }

    #[test]
    fn test_read_overflow_reports_offset() {
        let mut buf = ByteBuffer::from(vec![0u8, 1]);
        assert_eq!(buf.read_u8().unwrap(), 0);

        match buf.read_u32().unwrap_err() {
            Error::InsufficientData { offset, needed } => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
            }
            other => panic!("unexpected error {:?}", other),
        }
        // failed read does not move the cursor
        assert_eq!(buf.offset(), 1);
        assert_eq!(buf.peek_u8().unwrap(), 1);
    }

    #[test]
    fn test_truncate_clamps_cursor() {
        let mut buf = ByteBuffer::from(vec![1u8, 2, 3, 4]);
        buf.read_bytes(3).unwrap();
        buf.truncate(2);
        assert_eq!(buf.offset(), 2);
        assert!(buf.is_eof());
        assert_eq!(buf.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_descend_enforces_limit() {
        let mut buf = ByteBuffer::new();
        buf.descend(2).unwrap();
        buf.descend(2).unwrap();
        assert!(matches!(buf.descend(2), Err(Error::LimitExceeded(_))));
        buf.ascend();
        assert_eq!(buf.depth(), 1);
        buf.descend(2).unwrap();
    }
}
