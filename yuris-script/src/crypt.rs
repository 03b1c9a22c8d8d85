//! XOR obfuscation of `YSTB` containers.
//!
//! The instruction, attribute-descriptor and attribute-value regions are XORed
//! against the script key repeated as `k0 k1 k2 k3 k0 k1 k2 k3`. The key stream
//! runs continuously across the three regions.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DecompileError, Result};

/// First byte after the `YSTB` header.
pub const DATA_BASE: usize = 0x20;

/// Header offset of the first of the three region sizes.
pub const REGION_SIZES_OFFSET: usize = 0x0C;

const REGION_COUNT: usize = 3;

/// Repeating key stream with its current phase.
#[derive(Clone, Debug)]
pub struct KeyStream {
    key: u32,
    pattern: [u8; 8],
    phase: usize,
}

impl KeyStream {
    pub fn new(key: u32) -> Self {
        let k = key.to_le_bytes();
        Self {
            key,
            pattern: [k[0], k[1], k[2], k[3], k[0], k[1], k[2], k[3]],
            phase: 0,
        }
    }

    pub fn apply(&mut self, data: &mut [u8]) {
        for b in data.iter_mut() {
            *b ^= self.pattern[self.phase];
            self.phase = (self.phase + 1) % self.pattern.len();
        }
    }

    /// XOR `buf[offset..offset + len]` in place, keeping the phase.
    pub fn apply_region(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<()> {
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= buf.len())
            .ok_or(DecompileError::BadKey {
                key: self.key,
                offset,
                len,
                size: buf.len(),
            })?;
        self.apply(&mut buf[offset..end]);
        Ok(())
    }
}

/// Decrypt (or re-encrypt) the three data regions of a `YSTB` buffer in place.
///
/// The region sizes come from the unencrypted header. Key `0` leaves the buffer
/// untouched.
pub fn decrypt_container(buf: &mut [u8], key: u32) -> Result<()> {
    if key == 0 {
        return Ok(());
    }

    let header_end = REGION_SIZES_OFFSET + REGION_COUNT * 4;
    if buf.len() < header_end {
        return Err(DecompileError::OutOfBounds {
            offset: REGION_SIZES_OFFSET,
            len: REGION_COUNT * 4,
            size: buf.len(),
        });
    }

    let mut sizes = [0usize; REGION_COUNT];
    for (i, size) in sizes.iter_mut().enumerate() {
        let at = REGION_SIZES_OFFSET + i * 4;
        *size = LittleEndian::read_u32(&buf[at..at + 4]) as usize;
    }

    log::debug!("decrypting script regions {:X?} with key 0x{:08X}", sizes, key);

    let mut stream = KeyStream::new(key);
    let mut offset = DATA_BASE;
    for size in sizes {
        stream.apply_region(buf, offset, size)?;
        offset += size;
    }
    Ok(())
}
