//! Turn compiled commands into flat [`Line`]s: mnemonic lookup plus attribute
//! names and decompiled values.

use std::slice::Iter;

use yuris_nls::TextDecoder;

use crate::error::{DecompileError, Result};
use crate::expr::decompile_expr;
use crate::format::{Attribute, Command, CommandDefinition, Script};
use crate::line::{Line, Mnemonic};

struct Resolver<'a> {
    definition: &'a CommandDefinition,
    nls: &'a dyn TextDecoder,
    attributes: Iter<'a, Attribute>,
}

impl<'a> Resolver<'a> {
    fn next_attribute(&mut self, instruction: usize) -> Result<&'a Attribute> {
        self.attributes
            .next()
            .ok_or(DecompileError::MissingAttribute { instruction })
    }

    fn attribute_name(&self, cmd: &Command, attr: &Attribute) -> String {
        match self.definition.attribute_name(cmd.opcode, attr.id) {
            Some(name) => name.to_string(),
            None => {
                log::warn!("no name for attribute {} of opcode 0x{:02X}", attr.id, cmd.opcode);
                format!("arg{}", attr.id)
            }
        }
    }

    fn mnemonic(&self, cmd: &Command) -> Mnemonic {
        match self.definition.mnemonic(cmd.opcode) {
            Some(name) => Mnemonic::from(name),
            None => {
                log::warn!("opcode 0x{:02X} is missing from the compiler definition", cmd.opcode);
                Mnemonic::Other(format!("CMD_{:02X}", cmd.opcode))
            }
        }
    }

    fn resolve(&mut self, instruction: usize, cmd: &Command) -> Result<Line> {
        let mut line = Line::new(self.mnemonic(cmd));

        match line.mnemonic {
            Mnemonic::If | Mnemonic::Else | Mnemonic::Loop => {
                if cmd.attribute_count > 0 {
                    let attr = self.next_attribute(instruction)?;
                    let value = decompile_expr(&attr.value, self.nls)?;
                    line.push_arg(self.attribute_name(cmd, attr), value);
                    // Only the condition is rendered.
                    for _ in 1..cmd.attribute_count {
                        self.next_attribute(instruction)?;
                    }
                }
            }
            Mnemonic::Let => {
                if cmd.attribute_count != 2 {
                    log::warn!(
                        "LET at instruction {} declares {} attributes",
                        instruction,
                        cmd.attribute_count
                    );
                }
                let dest = self.next_attribute(instruction)?;
                let src = self.next_attribute(instruction)?;
                let op = match dest.sub_type() {
                    1 => "+=",
                    2 => "-=",
                    _ => "=",
                };
                line.push_arg("Operand1", decompile_expr(&dest.value, self.nls)?);
                line.push_arg("Operation", op);
                line.push_arg("Operand2", decompile_expr(&src.value, self.nls)?);
            }
            _ => {
                for _ in 0..cmd.attribute_count {
                    let attr = self.next_attribute(instruction)?;
                    let value = decompile_expr(&attr.value, self.nls)?;
                    line.push_arg(self.attribute_name(cmd, attr), value);
                }
            }
        }

        Ok(line)
    }
}

/// Resolve every command of `script`, in instruction order.
pub fn resolve_commands(
    script: &Script,
    definition: &CommandDefinition,
    nls: &dyn TextDecoder,
) -> Result<Vec<Line>> {
    let mut resolver = Resolver {
        definition,
        nls,
        attributes: script.attributes.iter(),
    };

    let lines = script
        .commands
        .iter()
        .enumerate()
        .map(|(i, cmd)| resolver.resolve(i, cmd))
        .collect::<Result<Vec<_>>>()?;

    let leftover = resolver.attributes.len();
    if leftover > 0 {
        log::warn!("{} attributes were not consumed by any command", leftover);
    }
    Ok(lines)
}
