//! Attribute bytecode to infix expression text.
//!
//! Each attribute value is a small postfix program. Every instruction is a
//! one-byte opcode followed by a u16 length (only meaningful for string
//! literals) and opcode-specific operands. The decompiler runs it on a stack of
//! text fragments; no expression tree is built.

use yuris_nls::TextDecoder;

use crate::cursor::Cursor;
use crate::error::{DecompileError, Result};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprOpcode {
    NotEqual = 0x21,
    Modulo = 0x25,
    LogicalAnd = 0x26,
    EndIndex = 0x29,
    Multiply = 0x2A,
    Add = 0x2B,
    ArraySeparator = 0x2C,
    Subtract = 0x2D,
    Divide = 0x2F,
    Less = 0x3C,
    Equal = 0x3D,
    Greater = 0x3E,
    BinaryAnd = 0x41,
    Int8 = 0x42,
    Double = 0x46,
    Variable = 0x48,
    Int32 = 0x49,
    Int64 = 0x4C,
    Text = 0x4D,
    BinaryOr = 0x4F,
    Negate = 0x52,
    LessEqual = 0x53,
    StartIndex = 0x56,
    Int16 = 0x57,
    GreaterEqual = 0x5A,
    BinaryXor = 0x5E,
    CastNumber = 0x69,
    CastString = 0x73,
    ArrayVariable = 0x76,
    LogicalOr = 0x7C,
}

impl TryFrom<u8> for ExprOpcode {
    type Error = u8;

    fn try_from(v: u8) -> std::result::Result<Self, u8> {
        use ExprOpcode::*;
        Ok(match v {
            0x21 => NotEqual,
            0x25 => Modulo,
            0x26 => LogicalAnd,
            0x29 => EndIndex,
            0x2A => Multiply,
            0x2B => Add,
            0x2C => ArraySeparator,
            0x2D => Subtract,
            0x2F => Divide,
            0x3C => Less,
            0x3D => Equal,
            0x3E => Greater,
            0x41 => BinaryAnd,
            0x42 => Int8,
            0x46 => Double,
            0x48 => Variable,
            0x49 => Int32,
            0x4C => Int64,
            0x4D => Text,
            0x4F => BinaryOr,
            0x52 => Negate,
            0x53 => LessEqual,
            0x56 => StartIndex,
            0x57 => Int16,
            0x5A => GreaterEqual,
            0x5E => BinaryXor,
            0x69 => CastNumber,
            0x73 => CastString,
            0x76 => ArrayVariable,
            0x7C => LogicalOr,
            _ => return Err(v),
        })
    }
}

impl ExprOpcode {
    /// Infix spelling of binary operators.
    pub fn binary_operator(self) -> Option<&'static str> {
        use ExprOpcode::*;
        Some(match self {
            NotEqual => "!=",
            Modulo => "%",
            LogicalAnd => "&&",
            Multiply => "*",
            Add => "+",
            Subtract => "-",
            Divide => "/",
            Less => "<",
            Equal => "==",
            Greater => ">",
            BinaryAnd => "&",
            BinaryOr => "|",
            BinaryXor => "^",
            LogicalOr => "||",
            LessEqual => "<=",
            GreaterEqual => ">=",
            _ => return None,
        })
    }
}

const SEPARATOR: &str = ", ";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Entry {
    Text(String),
    /// Opens the argument list of an indexed variable.
    IndexOpen,
}

struct ExprStack {
    entries: Vec<Entry>,
}

impl ExprStack {
    fn push(&mut self, text: String) {
        self.entries.push(Entry::Text(text));
    }

    fn pop(&mut self, context: &'static str) -> Result<String> {
        match self.entries.pop() {
            Some(Entry::Text(t)) => Ok(t),
            // A stray sentinel means unbalanced bytecode; keep its spelling.
            Some(Entry::IndexOpen) => Ok("(".to_string()),
            None => Err(DecompileError::StackUnderflow { context }),
        }
    }

    /// Pop up to the innermost sentinel and return the fragments in push order.
    fn pop_index_args(&mut self) -> Result<String> {
        let mut parts = Vec::new();
        loop {
            match self.entries.pop() {
                Some(Entry::IndexOpen) => break,
                Some(Entry::Text(t)) => parts.push(t),
                None => {
                    return Err(DecompileError::StackUnderflow {
                        context: "closing an index expression",
                    })
                }
            }
        }
        parts.reverse();
        Ok(parts.concat())
    }
}

fn variable_name(c: &mut Cursor<'_>, nls: &dyn TextDecoder) -> Result<String> {
    let prefix = c.read_text(1, nls)?;
    let id = c.read_i16()?;
    // Signed hex: id -1 is `var-1`, not `varffff`.
    let sign = if id < 0 { "-" } else { "" };
    Ok(format!("{}var{}{:x}", prefix, sign, id.unsigned_abs()))
}

/// Decompile one attribute's bytecode into expression text.
pub fn decompile_expr(bytes: &[u8], nls: &dyn TextDecoder) -> Result<String> {
    let mut c = Cursor::new(bytes);
    let mut stack = ExprStack {
        entries: Vec::new(),
    };

    while !c.is_at_end() {
        let opcode_u8 = c.read_u8()?;
        let arg_len = c.read_u16()? as usize;

        let op = match ExprOpcode::try_from(opcode_u8) {
            Ok(op) => op,
            Err(unknown) => {
                log::trace!("skipping unknown expression opcode 0x{:02X}", unknown);
                continue;
            }
        };

        if let Some(sym) = op.binary_operator() {
            let second = stack.pop("reading a binary operand")?;
            let first = stack.pop("reading a binary operand")?;
            stack.push(format!("{} {} {}", first, sym, second));
            continue;
        }

        match op {
            ExprOpcode::Negate => {
                let x = stack.pop("negating")?;
                stack.push(format!("-{}", x));
            }
            ExprOpcode::CastNumber => {
                let x = stack.pop("converting to number")?;
                stack.push(format!("@({})", x));
            }
            ExprOpcode::CastString => {
                let x = stack.pop("converting to string")?;
                stack.push(format!("$({})", x));
            }
            ExprOpcode::Int8 => stack.push(c.read_u8()?.to_string()),
            ExprOpcode::Int16 => stack.push(c.read_i16()?.to_string()),
            ExprOpcode::Int32 => stack.push(c.read_i32()?.to_string()),
            ExprOpcode::Int64 => stack.push(c.read_i64()?.to_string()),
            ExprOpcode::Double => stack.push(format!("{:.6}", c.read_f64()?)),
            ExprOpcode::Text => stack.push(c.read_text(arg_len, nls)?),
            ExprOpcode::Variable => stack.push(variable_name(&mut c, nls)?),
            ExprOpcode::ArrayVariable => {
                let name = variable_name(&mut c, nls)?;
                stack.push(format!("{}()", name));
            }
            ExprOpcode::StartIndex => {
                let name = variable_name(&mut c, nls)?;
                stack.push(name);
                stack.entries.push(Entry::IndexOpen);
            }
            ExprOpcode::ArraySeparator => stack.push(SEPARATOR.to_string()),
            ExprOpcode::EndIndex => {
                c.skip(1)?;
                let args = stack.pop_index_args()?;
                let name = stack.pop("reading an indexed variable")?;
                stack.push(format!("{}({})", name, args));
            }
            _ => unreachable!("binary operators are handled above"),
        }
    }

    stack.pop("reading the expression result")
}
