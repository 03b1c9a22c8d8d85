//! yuris-script
//!
//! Decompiles compiled YU-RIS scene scripts back into indented pseudo-source.
//!
//! Three resources are needed: the scene script (`ystNNNNN.ybn`), the shared
//! label table (`ysl.ybn`) and the compiler definition (`YSCom.ycd`) that names
//! every command and attribute. Loading them from disk and writing the result is
//! left to the caller; [`decompile`] is a pure function over the raw bytes.

pub mod crypt;
pub mod cursor;
pub mod error;
pub mod expr;
pub mod format;
pub mod line;
pub mod reconstruct;
pub mod render;
pub mod resolve;

use serde::{Deserialize, Serialize};
use yuris_nls::{Decoder, Encoding};

pub use error::{DecompileError, ErrorKind, Result};
pub use format::{parse_ycd, parse_ysl, parse_yst, CommandDefinition, LabelTable, Script};
pub use line::{Line, Mnemonic};
pub use render::render_lines;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompileOptions {
    /// Index of the scene script, i.e. `42` for `yst00042.ybn`.
    pub script_index: u16,
    pub encoding: Encoding,
}

/// Decompile and return the reconstructed statement tree.
pub fn decompile_lines(
    script: &[u8],
    labels: &[u8],
    definition: &[u8],
    options: &DecompileOptions,
) -> Result<Vec<Line>> {
    let nls = Decoder::new(options.encoding);

    let definition = parse_ycd(definition, &nls)?;
    let labels = parse_ysl(labels, &nls)?.for_script(options.script_index);
    let script = parse_yst(script)?;

    log::info!(
        "script {}: {} commands, {} attributes, {} labels",
        options.script_index,
        script.commands.len(),
        script.attributes.len(),
        labels.len()
    );

    let flat = resolve::resolve_commands(&script, &definition, &nls)?;
    reconstruct::reconstruct(flat, &labels)
}

/// Decompile one script into pseudo-source text.
pub fn decompile(
    script: &[u8],
    labels: &[u8],
    definition: &[u8],
    options: &DecompileOptions,
) -> Result<String> {
    let lines = decompile_lines(script, labels, definition, options)?;
    Ok(render_lines(&lines))
}
