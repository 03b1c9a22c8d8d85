//! Byte-span to text codecs for YU-RIS resources.
//!
//! Compiled scripts, label tables and compiler definitions all store text in the
//! engine's native code page. Japanese releases use Shift-JIS, Chinese
//! localizations usually ship GBK.

use anyhow::{anyhow, Result};
use encoding_rs::{Encoding as RsEncoding, GB18030, SHIFT_JIS, UTF_8};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

pub trait TextDecoder {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str>;

    /// Decode C-style string: stop at the first NUL (0x00).
    fn decode_cstr<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.decode(&bytes[..end])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    ShiftJis,
    /// Decoded as GB18030, which is a superset of GBK.
    Gbk,
    Utf8,
}

impl Encoding {
    #[inline]
    pub fn as_encoding_rs(self) -> &'static RsEncoding {
        match self {
            Encoding::ShiftJis => SHIFT_JIS,
            Encoding::Gbk => GB18030,
            Encoding::Utf8 => UTF_8,
        }
    }
}

impl FromStr for Encoding {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sjis" | "shift_jis" | "shift-jis" => Ok(Encoding::ShiftJis),
            "gbk" | "gb18030" => Ok(Encoding::Gbk),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            _ => Err(anyhow!("unknown NLS: {}", s)),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::ShiftJis => "sjis",
            Encoding::Gbk => "gbk",
            Encoding::Utf8 => "utf8",
        };
        f.write_str(name)
    }
}

/// A decoder bound to one encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    enc: Encoding,
}

impl Decoder {
    #[inline]
    pub fn new(enc: Encoding) -> Self {
        Self { enc }
    }

    /// Best-effort encoding; unrepresentable chars are replaced.
    /// Mostly useful for building fixtures.
    pub fn encode_owned(&self, s: &str) -> Vec<u8> {
        let (cow, _, had_errors) = self.enc.as_encoding_rs().encode(s);
        if had_errors {
            log::warn!("{} encode error: {:?}", self.enc, s);
        }
        cow.into_owned()
    }
}

impl TextDecoder for Decoder {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (cow, _, had_errors) = self.enc.as_encoding_rs().decode(bytes);
        if had_errors {
            log::warn!("{} decode error in {:02x?}", self.enc, bytes);
        }
        cow
    }
}
