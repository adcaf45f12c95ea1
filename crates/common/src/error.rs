//! Decode errors for P-code instruction streams.

use thiserror::Error;

/// Errors that occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Opcode 0x00 is illegal and always rejected.
    #[error("illegal opcode 0x00")]
    IllegalOpcode,

    /// Opcode byte is not one of the eight defined opcodes.
    #[error("invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    /// The reserved byte of an instruction slot was nonzero.
    #[error("nonzero reserved byte: {0:#04x}")]
    ReservedByte(u8),

    /// Byte stream length is not a multiple of 8.
    #[error("invalid byte stream length: {0} (must be multiple of 8)")]
    InvalidLength(usize),
}
