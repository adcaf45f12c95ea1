//! Instruction encoding and decoding for the P-code instruction set.
//!
//! Every instruction is exactly 64 bits (8 bytes), encoded little-endian:
//! ```text
//! Byte 0:   opcode (u8)
//! Byte 1:   reserved, must be zero
//! Bytes 2-3: level (u16, little-endian)
//! Bytes 4-7: arg (i32, little-endian)
//! ```

use std::fmt;

use crate::error::DecodeError;
use crate::opcode::{Opcode, Opr};

/// A single P-code instruction.
///
/// Instructions are addressed by their index in the code array; that index
/// is the jump/call target encoding. An instruction is immutable once
/// emitted (the compiler backpatches jump placeholders before the program
/// is finalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub op: Opcode,
    /// Lexical level difference for LOD/STO/CAL. Zero otherwise.
    pub level: u16,
    /// Literal value, stack address, code index, or OPR sub-code,
    /// depending on the opcode.
    pub arg: i32,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(op: Opcode, level: u16, arg: i32) -> Self {
        Self { op, level, arg }
    }

    /// `LIT 0 value` — push a literal.
    pub fn lit(value: i32) -> Self {
        Self::new(Opcode::Lit, 0, value)
    }

    /// `OPR 0 code` — perform an operation.
    pub fn opr(code: Opr) -> Self {
        Self::new(Opcode::Opr, 0, code as i32)
    }

    /// `LOD level addr` — load a variable.
    pub fn lod(level: u16, addr: i32) -> Self {
        Self::new(Opcode::Lod, level, addr)
    }

    /// `STO level addr` — store into a variable.
    pub fn sto(level: u16, addr: i32) -> Self {
        Self::new(Opcode::Sto, level, addr)
    }

    /// `CAL level target` — call a procedure.
    pub fn cal(level: u16, target: i32) -> Self {
        Self::new(Opcode::Cal, level, target)
    }

    /// `INT 0 slots` — adjust the stack top.
    pub fn int(slots: i32) -> Self {
        Self::new(Opcode::Int, 0, slots)
    }

    /// `JMP 0 target` — unconditional jump.
    pub fn jmp(target: i32) -> Self {
        Self::new(Opcode::Jmp, 0, target)
    }

    /// `JPC 0 target` — jump if the popped condition is zero.
    pub fn jpc(target: i32) -> Self {
        Self::new(Opcode::Jpc, 0, target)
    }

    /// Encode this instruction to 8 bytes (little-endian).
    pub fn encode(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0] = self.op as u8;
        bytes[2..4].copy_from_slice(&self.level.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.arg.to_le_bytes());
        bytes
    }

    /// Decode 8 bytes into an instruction (little-endian).
    pub fn decode(bytes: [u8; 8]) -> Result<Self, DecodeError> {
        let op = Opcode::try_from(bytes[0])?;
        if bytes[1] != 0 {
            return Err(DecodeError::ReservedByte(bytes[1]));
        }
        let level = u16::from_le_bytes([bytes[2], bytes[3]]);
        let arg = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        Ok(Self { op, level, arg })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.op.mnemonic(), self.level, self.arg)
    }
}
