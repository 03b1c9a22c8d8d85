use byteorder::{ByteOrder, LittleEndian};
use yuris_nls::TextDecoder;

use crate::error::{DecompileError, Result};

/// Positioned little-endian reader over an in-memory resource.
///
/// Every read is all-or-nothing: asking for bytes past the end yields
/// [`DecompileError::OutOfBounds`] and leaves the position untouched.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn out_of_bounds(&self, offset: usize, len: usize) -> DecompileError {
        DecompileError::OutOfBounds {
            offset,
            len,
            size: self.bytes.len(),
        }
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.bytes.len() {
            return Err(self.out_of_bounds(pos, 0));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| self.out_of_bounds(self.pos, n))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_bytes(2).map(LittleEndian::read_i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_bytes(8).map(LittleEndian::read_i64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_bytes(8).map(LittleEndian::read_f64)
    }

    /// Fixed-length text in the resource's native encoding.
    pub fn read_text(&mut self, n: usize, nls: &dyn TextDecoder) -> Result<String> {
        let raw = self.read_bytes(n)?;
        Ok(nls.decode(raw).into_owned())
    }

    /// NUL-terminated text; the terminator is consumed but not decoded.
    pub fn read_cstr_text(&mut self, nls: &dyn TextDecoder) -> Result<String> {
        let rest = &self.bytes[self.pos.min(self.bytes.len())..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| self.out_of_bounds(self.pos, rest.len() + 1))?;
        let text = self.read_text(len, nls)?;
        self.pos += 1;
        Ok(text)
    }
}
