//! # Byte Codec
//!
//! Little-endian primitives used by the item stack format and by the
//! packet layer in `panoply_networking`.
//!
//! ## Layout Rules
//!
//! - Integers are little-endian
//! - Strings: `u16` length prefix + UTF-8
//! - Byte blobs: `u32` length prefix + raw bytes

use crate::error::{SharedError, SharedResult};

/// Growable writer for wire data.
///
/// Reuse one writer across messages with [`ByteWriter::reset`] to keep the
/// allocation.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    /// Creates an empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates a writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Clears written data, keeping capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the written data.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer and returns the buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a u16 in little-endian format.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u32 in little-endian format.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an i32 in little-endian format.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u64 in little-endian format.
    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`SharedError::FieldTooLong`] past `u16::MAX` bytes.
    pub fn write_str(&mut self, value: &str) -> SharedResult<()> {
        let len = u16::try_from(value.len()).map_err(|_| SharedError::FieldTooLong {
            len: value.len(),
            limit: usize::from(u16::MAX),
        })?;
        self.write_u16(len);
        self.buffer.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Writes a length-prefixed byte blob.
    ///
    /// # Errors
    ///
    /// Returns [`SharedError::FieldTooLong`] past `u32::MAX` bytes.
    pub fn write_bytes(&mut self, value: &[u8]) -> SharedResult<()> {
        let len = u32::try_from(value.len()).map_err(|_| SharedError::FieldTooLong {
            len: value.len(),
            limit: u32::MAX as usize,
        })?;
        self.write_u32(len);
        self.buffer.extend_from_slice(value);
        Ok(())
    }
}

/// Cursor over a received buffer.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new reader from a buffer.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, position: 0 }
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Fails unless every byte has been consumed.
    ///
    /// # Errors
    ///
    /// Returns [`SharedError::TrailingBytes`] when data is left over.
    pub fn finish(&self) -> SharedResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(SharedError::TrailingBytes(n)),
        }
    }

    fn take(&mut self, needed: usize) -> SharedResult<&'a [u8]> {
        if needed > self.remaining() {
            return Err(SharedError::UnexpectedEof {
                needed,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buffer[self.position..self.position + needed];
        self.position += needed;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> SharedResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Fails at end of buffer.
    #[inline]
    pub fn read_u8(&mut self) -> SharedResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a u16 in little-endian format.
    ///
    /// # Errors
    ///
    /// Fails at end of buffer.
    #[inline]
    pub fn read_u16(&mut self) -> SharedResult<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    /// Reads a u32 in little-endian format.
    ///
    /// # Errors
    ///
    /// Fails at end of buffer.
    #[inline]
    pub fn read_u32(&mut self) -> SharedResult<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    /// Reads an i32 in little-endian format.
    ///
    /// # Errors
    ///
    /// Fails at end of buffer.
    #[inline]
    pub fn read_i32(&mut self) -> SharedResult<i32> {
        self.take_array().map(i32::from_le_bytes)
    }

    /// Reads a u64 in little-endian format.
    ///
    /// # Errors
    ///
    /// Fails at end of buffer.
    #[inline]
    pub fn read_u64(&mut self) -> SharedResult<u64> {
        self.take_array().map(u64::from_le_bytes)
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Fails at end of buffer or on invalid UTF-8.
    pub fn read_str(&mut self) -> SharedResult<String> {
        let len = usize::from(self.read_u16()?);
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| SharedError::InvalidUtf8)
    }

    /// Reads a length-prefixed byte blob.
    ///
    /// # Errors
    ///
    /// Fails at end of buffer.
    pub fn read_bytes(&mut self) -> SharedResult<Vec<u8>> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_little_endian() {
        let mut writer = ByteWriter::new();
        writer.write_u16(0x0102);
        writer.write_u32(7);
        assert_eq!(writer.as_slice(), &[0x02, 0x01, 7, 0, 0, 0]);
    }

    #[test]
    fn test_string_and_blob() {
        let mut writer = ByteWriter::new();
        writer.write_str("game:knife-flint").unwrap();
        writer.write_bytes(&[9, 8, 7]).unwrap();
        writer.write_i32(-3);

        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(reader.read_str().unwrap(), "game:knife-flint");
        assert_eq!(reader.read_bytes().unwrap(), vec![9, 8, 7]);
        assert_eq!(reader.read_i32().unwrap(), -3);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_truncated_buffer() {
        let mut writer = ByteWriter::new();
        writer.write_str("hello").unwrap();
        let bytes = &writer.as_slice()[..4];

        let mut reader = ByteReader::new(bytes);
        assert!(matches!(
            reader.read_str(),
            Err(SharedError::UnexpectedEof { needed: 5, remaining: 2 })
        ));
    }

    #[test]
    fn test_trailing_bytes_detected() {
        let reader = ByteReader::new(&[1, 2]);
        assert!(matches!(reader.finish(), Err(SharedError::TrailingBytes(2))));
    }
}
