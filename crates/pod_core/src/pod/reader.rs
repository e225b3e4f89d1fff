//! Bounds-checked cursor over a POD byte buffer.
//!
//! POD files are a flat stream of markers. Each marker is a little-endian
//! `(tag, length)` pair of `u32`s. Data chunks are followed by `length`
//! payload bytes and an end marker (`tag | TAG_END`, length 0); container
//! chunks have length 0 and enclose other chunks up to their end marker.

use thiserror::Error;

/// Bit set on the tag of every end marker.
pub const TAG_END: u32 = 0x8000_0000;

/// Errors raised by the chunk reader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("Truncated input at offset {offset}: needed {requested} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        requested: usize,
        remaining: usize,
    },
}

/// Result type for reader operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// A chunk marker: tag plus payload length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pub tag: u32,
    pub length: u32,
}

impl Marker {
    /// Whether this marker closes a chunk.
    pub fn is_end(&self) -> bool {
        self.tag & TAG_END != 0
    }

    /// Whether this marker closes the chunk opened by `tag`.
    pub fn is_end_of(&self, tag: u32) -> bool {
        self.tag == tag | TAG_END
    }

    /// Payload length as a `usize`.
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Whether the marker carries no payload.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Little-endian cursor over a borrowed byte buffer.
#[derive(Clone, Debug)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn truncated(&self, requested: usize) -> ReadError {
        ReadError::Truncated {
            offset: self.pos,
            requested,
            remaining: self.remaining(),
        }
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> ReadResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_bytes(N)?);
        Ok(buf)
    }

    pub fn read_u32(&mut self) -> ReadResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> ReadResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> ReadResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read `count` consecutive floats.
    pub fn read_f32_vec(&mut self, count: usize) -> ReadResult<Vec<f32>> {
        let bytes = self.read_bytes(count.saturating_mul(4))?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    /// Read `count` consecutive signed integers.
    pub fn read_i32_vec(&mut self, count: usize) -> ReadResult<Vec<i32>> {
        let bytes = self.read_bytes(count.saturating_mul(4))?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    /// Read a fixed-length, NUL-padded string.
    ///
    /// The result is cut at the first NUL byte and decoded lossily.
    pub fn read_fixed_string(&mut self, n: usize) -> ReadResult<String> {
        let bytes = self.read_bytes(n)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(n);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Read the next `(tag, length)` marker.
    pub fn read_marker(&mut self) -> ReadResult<Marker> {
        if self.remaining() < 8 {
            return Err(self.truncated(8));
        }
        let tag = self.read_u32()?;
        let length = self.read_u32()?;
        Ok(Marker { tag, length })
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> ReadResult<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Move the cursor to an absolute offset (the end of the buffer is valid).
    pub fn seek(&mut self, offset: usize) -> ReadResult<()> {
        if offset > self.data.len() {
            return Err(ReadError::Truncated {
                offset: self.pos,
                requested: offset - self.pos.min(offset),
                remaining: self.remaining(),
            });
        }
        self.pos = offset;
        Ok(())
    }
}
