//! Position-tracked little-endian reader over an in-memory chunk stream
//!
//! One `ChunkReader` is threaded by `&mut` through the whole recursive decode,
//! so the single read position is owned by exactly one caller at a time.

use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Mat4, Vec2, Vec3};

use crate::error::FormatError;

/// Result type for primitive reads
pub type ReadResult<T> = Result<T, FormatError>;

/// A cursor for reading binary data from a byte slice
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ChunkReader<'a> {
    /// Create a new reader at the beginning of the data
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current absolute read position
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Total length of the underlying data
    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    /// Whether the underlying data is empty
    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    /// Bytes left between the position and the end of the data
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position())
    }

    /// A reader over the next `length` bytes only, starting at the current
    /// position. Positions reported by the returned reader stay absolute.
    pub fn bounded(&self, length: u64) -> ReadResult<ChunkReader<'a>> {
        self.ensure(length)?;
        let data: &'a [u8] = *self.cursor.get_ref();
        let end = (self.position() + length) as usize;
        let mut cursor = Cursor::new(&data[..end]);
        cursor.set_position(self.position());
        Ok(Self { cursor })
    }

    /// Move the position forward by `count` bytes
    pub fn skip(&mut self, count: u64) -> ReadResult<()> {
        self.ensure(count)?;
        self.cursor.set_position(self.position() + count);
        Ok(())
    }

    fn ensure(&self, needed: u64) -> ReadResult<()> {
        if needed > self.remaining() {
            return Err(FormatError::UnexpectedEof {
                offset: self.position(),
                needed: (needed - self.remaining()) as usize,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> ReadResult<u8> {
        let eof = eof_at(self.position(), 1);
        self.cursor.read_u8().map_err(eof)
    }

    pub fn read_u16(&mut self) -> ReadResult<u16> {
        let eof = eof_at(self.position(), 2);
        self.cursor.read_u16::<LittleEndian>().map_err(eof)
    }

    pub fn read_i16(&mut self) -> ReadResult<i16> {
        let eof = eof_at(self.position(), 2);
        self.cursor.read_i16::<LittleEndian>().map_err(eof)
    }

    pub fn read_u32(&mut self) -> ReadResult<u32> {
        let eof = eof_at(self.position(), 4);
        self.cursor.read_u32::<LittleEndian>().map_err(eof)
    }

    pub fn read_i32(&mut self) -> ReadResult<i32> {
        let eof = eof_at(self.position(), 4);
        self.cursor.read_i32::<LittleEndian>().map_err(eof)
    }

    pub fn read_f32(&mut self) -> ReadResult<f32> {
        let eof = eof_at(self.position(), 4);
        self.cursor.read_f32::<LittleEndian>().map_err(eof)
    }

    /// Read exactly `count` bytes
    pub fn read_bytes(&mut self, count: usize) -> ReadResult<Vec<u8>> {
        self.ensure(count as u64)?;
        let start = self.position() as usize;
        let bytes = self.cursor.get_ref()[start..start + count].to_vec();
        self.cursor.set_position((start + count) as u64);
        Ok(bytes)
    }

    /// Read a length-prefixed string: one length byte followed by that many
    /// ASCII bytes. An embedded NUL ends the logical string.
    pub fn read_string(&mut self) -> ReadResult<String> {
        let length = self.read_u8()? as usize;
        let bytes = self.read_bytes(length)?;
        Ok(zero_terminate(&bytes))
    }

    /// Read a NUL-padded four character code
    pub fn read_fourcc(&mut self) -> ReadResult<String> {
        let bytes = self.read_bytes(4)?;
        Ok(zero_terminate(&bytes))
    }

    pub fn read_vec2(&mut self) -> ReadResult<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> ReadResult<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read 16 floats as stored on disk.
    ///
    /// The file stores row-vector matrices row by row with the translation in
    /// the fourth row. Loading those floats as glam columns yields the
    /// equivalent column-vector matrix.
    pub fn read_matrix(&mut self) -> ReadResult<Mat4> {
        let mut values = [0.0f32; 16];
        for value in &mut values {
            *value = self.read_f32()?;
        }
        Ok(Mat4::from_cols_array(&values))
    }

    /// Read `count` elements of `element_size` bytes each.
    ///
    /// The byte budget is checked up front so a corrupt count cannot trigger
    /// a huge allocation.
    pub fn read_array<T>(
        &mut self,
        count: u32,
        element_size: u64,
        mut read: impl FnMut(&mut Self) -> ReadResult<T>,
    ) -> ReadResult<Vec<T>> {
        self.ensure(count as u64 * element_size)?;
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            values.push(read(self)?);
        }
        Ok(values)
    }

    /// Read a u32 element count followed by that many elements
    pub fn read_counted<T>(
        &mut self,
        element_size: u64,
        read: impl FnMut(&mut Self) -> ReadResult<T>,
    ) -> ReadResult<Vec<T>> {
        let count = self.read_u32()?;
        self.read_array(count, element_size, read)
    }
}

fn eof_at(offset: u64, needed: usize) -> impl FnOnce(io::Error) -> FormatError {
    move |_| FormatError::UnexpectedEof { offset, needed }
}

/// Cut a byte string at the first NUL and decode it as ASCII
pub fn zero_terminate(bytes: &[u8]) -> String {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
