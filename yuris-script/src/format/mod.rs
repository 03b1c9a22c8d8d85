//! Binary layouts of the three compiled YU-RIS resources.
//!
//! - `ystNNNNN.ybn`: one compiled scene script ([`Script`])
//! - `ysl.ybn`: labels of every script ([`LabelTable`])
//! - `YSCom.ycd`: command and attribute names ([`CommandDefinition`])

mod ycd;
mod ysl;
mod yst;

pub use ycd::{parse_ycd, CommandDef, CommandDefinition, YSCD_MAGIC};
pub use ysl::{parse_ysl, Label, LabelTable, YSLB_MAGIC};
pub use yst::{parse_yst, Attribute, Command, Script, YSTB_MAGIC};

use crate::cursor::Cursor;
use crate::error::{DecompileError, Result};

fn expect_magic(c: &mut Cursor<'_>, resource: &'static str, expected: &'static str) -> Result<()> {
    let raw = c.read_bytes(4)?;
    if raw != expected.as_bytes() {
        let mut found = [0u8; 4];
        found.copy_from_slice(raw);
        return Err(DecompileError::InvalidMagic {
            resource,
            expected,
            found,
        });
    }
    Ok(())
}
