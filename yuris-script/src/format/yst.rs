use crate::crypt::{decrypt_container, DATA_BASE};
use crate::cursor::Cursor;
use crate::error::{DecompileError, Result};

use super::expect_magic;

pub const YSTB_MAGIC: &str = "YSTB";

/// Size of one instruction record.
const INSTRUCTION_SIZE: u32 = 4;

/// One compiled instruction. Its index in [`Script::commands`] is its
/// instruction offset, which is what labels point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    pub opcode: u8,
    pub attribute_count: u8,
    pub block_offset: u8,
}

/// Operand bytecode for one command argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub id: u16,
    pub type_tag: [u8; 2],
    pub value: Vec<u8>,
}

impl Attribute {
    /// Assignment flavor of a `LET` destination (`0` plain, `1` add, `2` sub).
    #[inline]
    pub fn sub_type(&self) -> u8 {
        self.type_tag[1]
    }
}

#[derive(Clone, Debug, Default)]
pub struct Script {
    pub version: u32,
    pub commands: Vec<Command>,
    pub attributes: Vec<Attribute>,
}

/// Parse a `YSTB` container, decrypting a private copy of the buffer first.
///
/// Layout (little-endian):
/// - 0x00: magic `YSTB`
/// - 0x04: u32 version
/// - 0x08: u32 instruction count
/// - 0x0C: u32 instruction region size (count * 4)
/// - 0x10: u32 attribute descriptor region size
/// - 0x14: u32 attribute value region size
/// - 0x18: u32 line number table size
/// - 0x1C: padding
/// - 0x20: instructions, descriptors, values, line numbers
pub fn parse_yst(bytes: &[u8]) -> Result<Script> {
    let mut c = Cursor::new(bytes);
    expect_magic(&mut c, "script", YSTB_MAGIC)?;

    let version = c.read_u32()?;
    let count = c.read_u32()?;
    let instructions_size = c.read_u32()?;
    if count.checked_mul(INSTRUCTION_SIZE) != Some(instructions_size) {
        return Err(DecompileError::SizeMismatch {
            count,
            size: instructions_size,
        });
    }
    let descriptors_size = c.read_u32()? as usize;
    let _values_size = c.read_u32()?;
    let _line_numbers_size = c.read_u32()?;
    c.skip(4)?;

    let instructions_off = DATA_BASE;
    let descriptors_off = instructions_off + instructions_size as usize;
    let values_off = descriptors_off + descriptors_size;
    if values_off > bytes.len() {
        return Err(DecompileError::OutOfBounds {
            offset: instructions_off,
            len: values_off - instructions_off,
            size: bytes.len(),
        });
    }

    // The first descriptor's value offset is always 0 in plaintext, so its
    // encrypted form is the key itself.
    let key = if descriptors_size > 0 {
        c.seek(descriptors_off + 8)?;
        c.read_u32()?
    } else {
        0
    };

    log::debug!(
        "YSTB v{} instructions={} descriptors=0x{:X} key=0x{:08X}",
        version,
        count,
        descriptors_size,
        key
    );

    let mut plain = bytes.to_vec();
    decrypt_container(&mut plain, key)?;

    let mut c = Cursor::new(&plain);

    c.seek(descriptors_off)?;
    let mut attributes = Vec::with_capacity(descriptors_size / 12);
    while c.position() < values_off {
        let id = c.read_u16()?;
        let tag = c.read_bytes(2)?;
        let len = c.read_u32()? as usize;
        let off = c.read_u32()? as usize + values_off;

        let mut value_cursor = Cursor::new(&plain);
        value_cursor.seek(off)?;
        let value = value_cursor.read_bytes(len)?.to_vec();

        attributes.push(Attribute {
            id,
            type_tag: [tag[0], tag[1]],
            value,
        });
    }

    c.seek(instructions_off)?;
    let mut commands = Vec::with_capacity(count as usize);
    while c.position() < descriptors_off {
        let opcode = c.read_u8()?;
        let attribute_count = c.read_u8()?;
        let block_offset = c.read_u8()?;
        c.skip(1)?;
        commands.push(Command {
            opcode,
            attribute_count,
            block_offset,
        });
    }

    Ok(Script {
        version,
        commands,
        attributes,
    })
}
