use serde::Serialize;
use yuris_nls::TextDecoder;

use crate::cursor::Cursor;
use crate::error::Result;

use super::expect_magic;

pub const YSLB_MAGIC: &str = "YSLB";

/// Entries of the first-character range index that precedes the labels.
const RANGE_INDEX_ENTRIES: usize = 0x100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Label {
    pub name: String,
    pub id: u32,
    /// Instruction offset inside the owning script.
    pub offset: u32,
    pub script_index: u16,
}

/// Every label of a game, sorted ascending by instruction offset.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LabelTable {
    pub version: u32,
    pub labels: Vec<Label>,
}

impl LabelTable {
    /// Labels of one script, still in offset order.
    pub fn for_script(&self, script_index: u16) -> Vec<Label> {
        self.labels
            .iter()
            .filter(|l| l.script_index == script_index)
            .cloned()
            .collect()
    }
}

pub fn parse_ysl(bytes: &[u8], nls: &dyn TextDecoder) -> Result<LabelTable> {
    let mut c = Cursor::new(bytes);
    expect_magic(&mut c, "label table", YSLB_MAGIC)?;

    let version = c.read_u32()?;
    let count = c.read_u32()? as usize;
    c.skip(RANGE_INDEX_ENTRIES * 4)?;

    let mut labels = Vec::with_capacity(count.min(c.remaining()));
    for _ in 0..count {
        let name_len = c.read_u8()? as usize;
        let name = c.read_text(name_len, nls)?;
        let id = c.read_u32()?;
        let offset = c.read_u32()?;
        let script_index = c.read_u16()?;
        c.skip(2)?;
        labels.push(Label {
            name,
            id,
            offset,
            script_index,
        });
    }

    labels.sort_by_key(|l| l.offset);
    log::debug!("YSLB v{} labels={}", version, labels.len());

    Ok(LabelTable { version, labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecompileError, ErrorKind};
    use yuris_nls::{Decoder, Encoding};

    fn build(nls: &Decoder, labels: &[(&str, u32, u16)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"YSLB");
        out.extend_from_slice(&481u32.to_le_bytes());
        out.extend_from_slice(&(labels.len() as u32).to_le_bytes());
        out.extend(std::iter::repeat(0u8).take(0x400));
        for (i, (name, offset, script)) in labels.iter().enumerate() {
            let raw = nls.encode_owned(name);
            out.push(raw.len() as u8);
            out.extend_from_slice(&raw);
            out.extend_from_slice(&(i as u32).to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&script.to_le_bytes());
            out.extend_from_slice(&[0, 0]);
        }
        out
    }

    #[test]
    fn parses_and_sorts_by_offset() {
        let nls = Decoder::new(Encoding::ShiftJis);
        let bytes = build(&nls, &[("END", 40, 1), ("開始", 3, 1), ("OTHER", 0, 2)]);
        let table = parse_ysl(&bytes, &nls).unwrap();

        let names: Vec<_> = table.labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["OTHER", "開始", "END"]);
        assert_eq!(table.labels[1].id, 1);

        let own = table.for_script(1);
        assert_eq!(own.len(), 2);
        assert_eq!(own[0].offset, 3);
        assert_eq!(own[1].offset, 40);
    }

    #[test]
    fn truncated_range_index_is_out_of_bounds() {
        let nls = Decoder::new(Encoding::ShiftJis);
        let mut bytes = build(&nls, &[]);
        bytes.truncate(0x100);
        let err = parse_ysl(&bytes, &nls).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
    }

    #[test]
    fn rejects_script_magic() {
        let nls = Decoder::new(Encoding::ShiftJis);
        let mut bytes = build(&nls, &[]);
        bytes[..4].copy_from_slice(b"YSTB");
        assert!(matches!(
            parse_ysl(&bytes, &nls),
            Err(DecompileError::InvalidMagic { resource: "label table", .. })
        ));
    }
}
