//! Rebuild block nesting from the flat command stream.
//!
//! The compiled stream only marks nesting through opener/closer pairs:
//!
//! | opener          | closer                | body order | closer re-pushed |
//! |-----------------|-----------------------|------------|------------------|
//! | `LABEL`         | `RETURN`              | source     | no (it is the last child) |
//! | `WORD`          | `RETURNCODE`          | source     | no (it is the last child) |
//! | `IF` / `ELSE`   | `IFEND` / `IFBLEND`   | source     | `IFEND` only     |
//! | `LOOP`          | `LOOPEND`             | reversed   | yes              |
//!
//! Closed openers are pushed back marked `visited`, so a later closer walks
//! past them instead of matching them again. A `RETURN`/`RETURNCODE` that finds
//! no opener is wrapped in an empty frame; the other closers fail with
//! [`DecompileError::StackUnderflow`].

use std::iter::Peekable;
use std::slice::Iter;

use crate::error::{DecompileError, Result};
use crate::format::Label;
use crate::line::{Line, Mnemonic};

/// Mutable state of one reconstruction pass.
pub struct ReconstructContext<'a> {
    stack: Vec<Line>,
    instruction: usize,
    labels: Peekable<Iter<'a, Label>>,
}

impl<'a> ReconstructContext<'a> {
    /// `labels` must already be filtered to one script and sorted by offset.
    pub fn new(labels: &'a [Label]) -> Self {
        Self {
            stack: Vec::new(),
            instruction: 0,
            labels: labels.iter().peekable(),
        }
    }

    #[inline]
    pub fn instruction(&self) -> usize {
        self.instruction
    }

    #[inline]
    pub fn stack(&self) -> &[Line] {
        &self.stack
    }

    fn insert_labels(&mut self) {
        while let Some(label) = self
            .labels
            .next_if(|l| l.offset as usize == self.instruction)
        {
            self.stack.push(Line::label(label.name.clone()));
        }
    }

    fn pop(&mut self, context: &'static str) -> Result<Line> {
        self.stack
            .pop()
            .ok_or(DecompileError::StackUnderflow { context })
    }

    /// Collect lines starting at `curr` until an open `opener` turns up, then
    /// attach them to it and push it back.
    ///
    /// With `underflow` set, running out of stack is an error instead of
    /// producing an empty frame.
    fn close_block(
        &mut self,
        mut curr: Line,
        is_opener: impl Fn(&Line) -> bool,
        reverse: bool,
        underflow: Option<&'static str>,
    ) -> Result<()> {
        let mut children = Vec::new();
        let mut frame = loop {
            if is_opener(&curr) {
                break curr;
            }
            children.push(curr);
            match (self.stack.pop(), underflow) {
                (Some(next), _) => curr = next,
                (None, Some(context)) => return Err(DecompileError::StackUnderflow { context }),
                (None, None) => break Line::empty_frame(),
            }
        };

        if reverse {
            children.reverse();
        }
        frame.visited = true;
        frame.children = children;
        self.stack.push(frame);
        Ok(())
    }

    /// Feed the next resolved command.
    pub fn push_command(&mut self, line: Line) -> Result<()> {
        self.insert_labels();

        match line.mnemonic {
            Mnemonic::Return => {
                self.close_block(line, |l| l.is_open(&Mnemonic::Label), true, None)?;
            }
            Mnemonic::ReturnCode => {
                self.close_block(line, |l| l.is_open(&Mnemonic::Word), true, None)?;
            }
            Mnemonic::IfEnd | Mnemonic::IfBlEnd => {
                const CONTEXT: &str = "closing a conditional block";
                let curr = self.pop(CONTEXT)?;
                self.close_block(
                    curr,
                    |l| l.is_open(&Mnemonic::If) || l.is_open(&Mnemonic::Else),
                    true,
                    Some(CONTEXT),
                )?;
                if line.mnemonic == Mnemonic::IfEnd {
                    self.stack.push(line);
                }
            }
            Mnemonic::LoopEnd => {
                const CONTEXT: &str = "closing a loop block";
                let curr = self.pop(CONTEXT)?;
                self.close_block(curr, |l| l.is_open(&Mnemonic::Loop), false, Some(CONTEXT))?;
                self.stack.push(line);
            }
            _ => self.stack.push(line),
        }

        self.instruction += 1;
        Ok(())
    }

    /// Emit labels that sit right after the last command and drain the stack.
    pub fn finish(mut self) -> Vec<Line> {
        self.insert_labels();
        for label in self.labels {
            log::warn!(
                "label {} at offset {} is past the end of the script ({} instructions)",
                label.name,
                label.offset,
                self.instruction
            );
        }
        self.stack
    }
}

/// Reconstruct the statement tree of one script.
pub fn reconstruct(lines: impl IntoIterator<Item = Line>, labels: &[Label]) -> Result<Vec<Line>> {
    let mut ctx = ReconstructContext::new(labels);
    for line in lines {
        ctx.push_command(line)?;
    }
    Ok(ctx.finish())
}
