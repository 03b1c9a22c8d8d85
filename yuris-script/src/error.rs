/// Coarse classification of a [`DecompileError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not the expected resource type or version.
    Format,
    /// A read or decrypt went past the end of the buffer.
    Bounds,
    /// The bytecode pops more than it pushed.
    StackUnderflow,
}

#[derive(thiserror::Error, Debug)]
pub enum DecompileError {
    #[error("invalid magic in {resource}: expected {expected:?}, found {found:02x?}")]
    InvalidMagic {
        resource: &'static str,
        expected: &'static str,
        found: [u8; 4],
    },

    #[error("instruction size does not match instruction count: count={count}, size=0x{size:X}")]
    SizeMismatch { count: u32, size: u32 },

    #[error("read out of bounds: offset=0x{offset:X}, len=0x{len:X}, buffer_len=0x{size:X}")]
    OutOfBounds { offset: usize, len: usize, size: usize },

    #[error(
        "script data cannot be decrypted with key 0x{key:08X}: region 0x{offset:X}+0x{len:X} exceeds buffer_len=0x{size:X}"
    )]
    BadKey {
        key: u32,
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("attribute stream exhausted at instruction {instruction}")]
    MissingAttribute { instruction: usize },

    #[error("stack underflow while {context}")]
    StackUnderflow { context: &'static str },
}

impl DecompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecompileError::InvalidMagic { .. } | DecompileError::SizeMismatch { .. } => {
                ErrorKind::Format
            }
            DecompileError::OutOfBounds { .. }
            | DecompileError::BadKey { .. }
            | DecompileError::MissingAttribute { .. } => ErrorKind::Bounds,
            DecompileError::StackUnderflow { .. } => ErrorKind::StackUnderflow,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecompileError>;
