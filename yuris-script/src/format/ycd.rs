use serde::Serialize;
use yuris_nls::TextDecoder;

use crate::cursor::Cursor;
use crate::error::Result;

use super::expect_magic;

pub const YSCD_MAGIC: &str = "YSCD";

/// One command of the compiler definition. The opcode is its position in
/// [`CommandDefinition::commands`], attribute ids index `attributes`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommandDef {
    pub name: String,
    pub attributes: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CommandDefinition {
    pub version: u32,
    pub commands: Vec<CommandDef>,
}

impl CommandDefinition {
    pub fn mnemonic(&self, opcode: u8) -> Option<&str> {
        self.commands.get(opcode as usize).map(|c| c.name.as_str())
    }

    pub fn attribute_name(&self, opcode: u8, attribute_id: u16) -> Option<&str> {
        self.commands
            .get(opcode as usize)?
            .attributes
            .get(attribute_id as usize)
            .map(String::as_str)
    }
}

/// Parse `YSCom.ycd`.
///
/// Layout: magic `YSCD`, u32 version, u32 command count, 4 reserved bytes, then
/// per command a NUL-terminated name, u8 attribute count and per attribute a
/// NUL-terminated name followed by 4 unused bytes.
pub fn parse_ycd(bytes: &[u8], nls: &dyn TextDecoder) -> Result<CommandDefinition> {
    let mut c = Cursor::new(bytes);
    expect_magic(&mut c, "compiler definition", YSCD_MAGIC)?;

    let version = c.read_u32()?;
    let count = c.read_u32()? as usize;
    c.skip(4)?;

    let mut commands = Vec::with_capacity(count.min(c.remaining()));
    for _ in 0..count {
        let name = c.read_cstr_text(nls)?;
        let attr_count = c.read_u8()? as usize;
        let mut attributes = Vec::with_capacity(attr_count);
        for _ in 0..attr_count {
            attributes.push(c.read_cstr_text(nls)?);
            c.skip(4)?;
        }
        commands.push(CommandDef { name, attributes });
    }

    log::debug!("YSCD v{} commands={}", version, commands.len());
    Ok(CommandDefinition { version, commands })
}
