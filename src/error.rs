use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons a ROM could not be placed in memory.
/// Memory is left untouched whenever one of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error while reading ROM: {0}")]
    Read(#[from] io::Error),

    #[error("ROM is too large, the program region holds at most {max} bytes")]
    TooLarge { max: usize },
}

/// A recoverable condition raised by a guest instruction.
///
/// The machine logs these, steps over the faulting instruction and keeps
/// running; the host decides whether a fault is worth stopping for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("unknown opcode {0:#06X}")]
    UnknownOpcode(u16),

    #[error("call at {pc:#05X} exceeds the stack depth")]
    StackOverflow { pc: u16 },

    #[error("return at {pc:#05X} with an empty stack")]
    StackUnderflow { pc: u16 },
}
