use std::io;

use thiserror::Error;

use crate::opcode::Opcode;

/// Reasons a ROM could not be placed into memory. A failed load leaves the
/// previous machine state untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("could not read ROM: {0}")]
    Io(#[from] io::Error),
}

/// Diagnostics raised by a single instruction. None of these stop the
/// machine: the instruction is skipped and execution carries on.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("stack overflow: call at {pc:#05x} with all 16 stack slots in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05x} with an empty stack")]
    StackUnderflow { pc: u16 },

    #[error("unimplemented opcode {opcode:04X} at {pc:#05x}")]
    UnimplementedOpcode { pc: u16, opcode: Opcode },
}

/// Errors that end a host run loop.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Load(#[from] LoadError),
}
