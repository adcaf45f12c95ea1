//! Program representation for P-code instruction streams.
//!
//! A program is a sequence of 64-bit instructions. Binary files (.pcb)
//! are raw concatenations of 8-byte instructions with no header.

use crate::error::DecodeError;
use crate::instruction::Instruction;

/// A P-code program: a sequence of instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new program from a vector of instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Encode the entire program to bytes.
    ///
    /// Each instruction becomes 8 bytes. The result length is always
    /// `instructions.len() * 8`.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.instructions.len() * 8);
        for instr in &self.instructions {
            bytes.extend_from_slice(&instr.encode());
        }
        bytes
    }

    /// Decode a byte slice into a program.
    ///
    /// The byte slice length must be a multiple of 8. Each 8-byte chunk
    /// is decoded as one instruction.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() % 8 != 0 {
            return Err(DecodeError::InvalidLength(bytes.len()));
        }

        let mut instructions = Vec::with_capacity(bytes.len() / 8);
        for chunk in bytes.chunks_exact(8) {
            let arr: [u8; 8] = chunk.try_into().expect("chunks_exact guarantees 8 bytes");
            instructions.push(Instruction::decode(arr)?);
        }

        Ok(Self { instructions })
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
