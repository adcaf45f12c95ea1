//! Opcode definitions for the P-code instruction set.

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// The `#[repr(u8)]` attribute ensures each variant has a stable byte value
/// in the binary encoding.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Push a literal value onto the stack.
    Lit = 0x01,
    /// Perform an operation selected by the `arg` field (see [`Opr`]).
    Opr = 0x02,
    /// Load a value: push `s[base(level) + arg]`.
    Lod = 0x03,
    /// Store a value: pop into `s[base(level) + arg]`.
    Sto = 0x04,
    /// Call the procedure at code index `arg`, linking through `base(level)`.
    Cal = 0x05,
    /// Adjust the stack top by `arg` slots (reserve or release frame space).
    Int = 0x06,
    /// Unconditional jump to code index `arg`.
    Jmp = 0x07,
    /// Pop the condition; jump to code index `arg` if it is zero.
    Jpc = 0x08,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 8] = [
    Opcode::Lit,
    Opcode::Opr,
    Opcode::Lod,
    Opcode::Sto,
    Opcode::Cal,
    Opcode::Int,
    Opcode::Jmp,
    Opcode::Jpc,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Err(DecodeError::IllegalOpcode),
            0x01 => Ok(Opcode::Lit),
            0x02 => Ok(Opcode::Opr),
            0x03 => Ok(Opcode::Lod),
            0x04 => Ok(Opcode::Sto),
            0x05 => Ok(Opcode::Cal),
            0x06 => Ok(Opcode::Int),
            0x07 => Ok(Opcode::Jmp),
            0x08 => Ok(Opcode::Jpc),
            other => Err(DecodeError::InvalidOpcode(other)),
        }
    }
}

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Lit => "LIT",
            Opcode::Opr => "OPR",
            Opcode::Lod => "LOD",
            Opcode::Sto => "STO",
            Opcode::Cal => "CAL",
            Opcode::Int => "INT",
            Opcode::Jmp => "JMP",
            Opcode::Jpc => "JPC",
        }
    }
}

/// OPR sub-codes: the operation dispatch table for `OPR 0 code`.
///
/// Codes 0..=6 are control and arithmetic, 7..=13 the boolean-producing
/// comparison family (7 is the unary parity test), 14..=15 logical
/// connectives. Any other `arg` value on an OPR instruction is an invalid
/// opcode at runtime.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opr {
    /// Return from the current procedure, preserving one value for the caller.
    Return = 0,
    /// Negate the top of stack in place.
    Neg = 1,
    Add = 2,
    Sub = 3,
    Mul = 4,
    Div = 5,
    Mod = 6,
    /// Replace the top of stack with its parity bit.
    Odd = 7,
    Eq = 8,
    Ne = 9,
    Lt = 10,
    Ge = 11,
    Gt = 12,
    Le = 13,
    And = 14,
    Or = 15,
}

/// All valid OPR sub-codes, in numeric order.
pub const ALL_OPRS: [Opr; 16] = [
    Opr::Return,
    Opr::Neg,
    Opr::Add,
    Opr::Sub,
    Opr::Mul,
    Opr::Div,
    Opr::Mod,
    Opr::Odd,
    Opr::Eq,
    Opr::Ne,
    Opr::Lt,
    Opr::Ge,
    Opr::Gt,
    Opr::Le,
    Opr::And,
    Opr::Or,
];

impl Opr {
    /// Decode an OPR instruction's `arg` field. `None` for unknown codes.
    pub fn from_arg(arg: i32) -> Option<Opr> {
        match arg {
            0 => Some(Opr::Return),
            1 => Some(Opr::Neg),
            2 => Some(Opr::Add),
            3 => Some(Opr::Sub),
            4 => Some(Opr::Mul),
            5 => Some(Opr::Div),
            6 => Some(Opr::Mod),
            7 => Some(Opr::Odd),
            8 => Some(Opr::Eq),
            9 => Some(Opr::Ne),
            10 => Some(Opr::Lt),
            11 => Some(Opr::Ge),
            12 => Some(Opr::Gt),
            13 => Some(Opr::Le),
            14 => Some(Opr::And),
            15 => Some(Opr::Or),
            _ => None,
        }
    }
}
