//! P-code common types and instruction encoding.
//!
//! This crate provides the foundational data structures for the P-code
//! instruction set:
//!
//! - [`Opcode`] — the eight machine opcodes
//! - [`Opr`] — OPR operation sub-codes
//! - [`Instruction`] — the 64-bit instruction struct with encode/decode
//! - [`Program`] — a sequence of instructions
//! - [`DecodeError`] — errors from decoding byte streams
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use opcode::Opr;
pub use program::Program;
