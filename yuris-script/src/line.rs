use std::fmt;

/// Command mnemonics the decompiler gives special treatment. Anything else
/// from the compiler definition is carried verbatim in [`Mnemonic::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Let,
    Label,
    If,
    Else,
    IfEnd,
    IfBlEnd,
    Loop,
    LoopEnd,
    LoopBreak,
    LoopContinue,
    End,
    Return,
    ReturnCode,
    Word,
    SInt,
    SStr,
    Int,
    Str,
    Other(String),
}

impl Mnemonic {
    pub fn as_str(&self) -> &str {
        match self {
            Mnemonic::Let => "LET",
            Mnemonic::Label => "LABEL",
            Mnemonic::If => "IF",
            Mnemonic::Else => "ELSE",
            Mnemonic::IfEnd => "IFEND",
            Mnemonic::IfBlEnd => "IFBLEND",
            Mnemonic::Loop => "LOOP",
            Mnemonic::LoopEnd => "LOOPEND",
            Mnemonic::LoopBreak => "LOOPBREAK",
            Mnemonic::LoopContinue => "LOOPCONTINUE",
            Mnemonic::End => "END",
            Mnemonic::Return => "RETURN",
            Mnemonic::ReturnCode => "RETURNCODE",
            Mnemonic::Word => "WORD",
            Mnemonic::SInt => "S_INT",
            Mnemonic::SStr => "S_STR",
            Mnemonic::Int => "INT",
            Mnemonic::Str => "STR",
            Mnemonic::Other(s) => s,
        }
    }
}

impl From<&str> for Mnemonic {
    fn from(s: &str) -> Self {
        match s {
            "LET" => Mnemonic::Let,
            "LABEL" => Mnemonic::Label,
            "IF" => Mnemonic::If,
            "ELSE" => Mnemonic::Else,
            "IFEND" => Mnemonic::IfEnd,
            "IFBLEND" => Mnemonic::IfBlEnd,
            "LOOP" => Mnemonic::Loop,
            "LOOPEND" => Mnemonic::LoopEnd,
            "LOOPBREAK" => Mnemonic::LoopBreak,
            "LOOPCONTINUE" => Mnemonic::LoopContinue,
            "END" => Mnemonic::End,
            "RETURN" => Mnemonic::Return,
            "RETURNCODE" => Mnemonic::ReturnCode,
            "WORD" => Mnemonic::Word,
            "S_INT" => Mnemonic::SInt,
            "S_STR" => Mnemonic::SStr,
            "INT" => Mnemonic::Int,
            "STR" => Mnemonic::Str,
            other => Mnemonic::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decompiled statement, possibly owning a block body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub mnemonic: Mnemonic,
    pub names: Vec<String>,
    pub values: Vec<String>,
    pub children: Vec<Line>,
    /// Set once this line's block has been closed and its body attached.
    pub visited: bool,
}

impl Line {
    pub fn new(mnemonic: Mnemonic) -> Self {
        Self {
            mnemonic,
            names: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            visited: false,
        }
    }

    pub fn label(name: impl Into<String>) -> Self {
        let mut line = Line::new(Mnemonic::Label);
        line.push_arg("LabelName", name);
        line
    }

    /// Parent for a body whose opener was never found on the stack.
    pub fn empty_frame() -> Self {
        Line::new(Mnemonic::Other(String::new()))
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_arg(name, value);
        self
    }

    pub fn push_arg(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.names.push(name.into());
        self.values.push(value.into());
    }

    #[inline]
    pub fn value(&self, i: usize) -> Option<&str> {
        self.values.get(i).map(String::as_str)
    }

    #[inline]
    pub fn name(&self, i: usize) -> Option<&str> {
        self.names.get(i).map(String::as_str)
    }

    /// True for an opener that can still take a body.
    #[inline]
    pub fn is_open(&self, mnemonic: &Mnemonic) -> bool {
        !self.visited && self.mnemonic == *mnemonic
    }
}
