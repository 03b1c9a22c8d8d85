use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use serde::Serialize;

use yuris_nls::{Decoder, Encoding};
use yuris_script::format::Label;
use yuris_script::{decompile, parse_ycd, parse_ysl, CommandDefinition, DecompileOptions};

#[derive(ClapParser, Debug)]
#[command(version, about = "YU-RIS ybn script to text decompiler")]
struct Args {
    /// Compiled scene script, e.g. ysbin/yst00042.ybn
    #[arg(short, long)]
    script: PathBuf,

    /// Label table, usually ysbin/ysl.ybn
    #[arg(short, long)]
    labels: PathBuf,

    /// Compiler definition, usually YSCom.ycd
    #[arg(short, long)]
    definition: PathBuf,

    /// Script index; taken from the script file name when omitted
    #[arg(short, long)]
    index: Option<u16>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "sjis")]
    lang: Encoding,

    /// Also write the command definition and this script's labels as YAML
    #[arg(long)]
    dump_tables: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Tables<'a> {
    script_index: u16,
    labels: Vec<Label>,
    definition: &'a CommandDefinition,
}

/// `yst00042.ybn` -> 42
fn script_index_from_path(path: &Path) -> Option<u16> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.trim_start_matches(|c: char| !c.is_ascii_digit());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn dump_tables(
    path: &Path,
    script_index: u16,
    labels: &[u8],
    definition: &[u8],
    encoding: Encoding,
) -> Result<()> {
    let nls = Decoder::new(encoding);
    let definition = parse_ycd(definition, &nls).context("parsing compiler definition")?;
    let labels = parse_ysl(labels, &nls)
        .context("parsing label table")?
        .for_script(script_index);

    create_parent_dir(path)?;
    let writer = fs::File::create(path)?;
    serde_yaml::to_writer(
        writer,
        &Tables {
            script_index,
            labels,
            definition: &definition,
        },
    )?;
    log::info!("tables written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(level));

    let script_index = match args.index {
        Some(i) => i,
        None => script_index_from_path(&args.script).ok_or_else(|| {
            anyhow!(
                "cannot infer the script index from {}; pass --index",
                args.script.display()
            )
        })?,
    };

    let script = read(&args.script)?;
    let labels = read(&args.labels)?;
    let definition = read(&args.definition)?;

    if let Some(path) = &args.dump_tables {
        dump_tables(path, script_index, &labels, &definition, args.lang)?;
    }

    let options = DecompileOptions {
        script_index,
        encoding: args.lang,
    };
    let text = decompile(&script, &labels, &definition, &options)
        .with_context(|| format!("decompiling {}", args.script.display()))?;

    match &args.output {
        Some(path) => {
            create_parent_dir(path)?;
            fs::write(path, text.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
