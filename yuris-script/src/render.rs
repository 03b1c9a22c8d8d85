use std::fmt::{self, Write};

use crate::line::{Line, Mnemonic};

const INDENT_STEP: usize = 2;

/// Literal `LOOP` condition meaning "no counter".
const LOOP_FOREVER: &str = "255";

fn write_statement<W: Write>(w: &mut W, line: &Line) -> fmt::Result {
    let v = |i: usize| line.value(i).unwrap_or("");
    let m = &line.mnemonic;

    match m {
        Mnemonic::Let => write!(w, "{} {} {}", v(0), v(1), v(2)),
        Mnemonic::Label => write!(w, "#={}", v(0)),
        Mnemonic::If | Mnemonic::Else => write!(w, "{}[{}]", m, v(0)),
        Mnemonic::Loop => match line.value(0) {
            Some(cond) if cond != LOOP_FOREVER => {
                write!(w, "LOOP[{} = {}]", line.name(0).unwrap_or(""), cond)
            }
            _ => w.write_str("LOOP[]"),
        },
        Mnemonic::IfEnd
        | Mnemonic::LoopEnd
        | Mnemonic::LoopBreak
        | Mnemonic::LoopContinue
        | Mnemonic::End => write!(w, "{}[]", m),
        Mnemonic::SInt | Mnemonic::SStr | Mnemonic::Int | Mnemonic::Str => {
            write!(w, "{}[{}", m, v(0))?;
            if let Some(init) = line.value(1).filter(|&s| s != "0") {
                write!(w, " = {}", init)?;
            }
            w.write_char(']')
        }
        _ => {
            write!(w, "{}[", m)?;
            for (i, (name, value)) in line.names.iter().zip(&line.values).enumerate() {
                if i > 0 {
                    w.write_char(' ')?;
                }
                write!(w, "{}={}", name, value)?;
            }
            w.write_char(']')
        }
    }
}

/// Write `line` and its body at `indent` columns.
pub fn write_line<W: Write>(w: &mut W, line: &Line, indent: usize) -> fmt::Result {
    let pad = " ".repeat(indent);
    w.write_str(&pad)?;
    write_statement(w, line)?;
    w.write_char('\n')?;

    if line.children.is_empty() {
        return Ok(());
    }

    writeln!(w, "{}{{", pad)?;
    for child in &line.children {
        write_line(w, child, indent + INDENT_STEP)?;
    }
    writeln!(w, "{}}}", pad)
}

/// Render top-level statements, each followed by an empty line.
pub fn render_lines(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_line(f, self, 0)
    }
}
