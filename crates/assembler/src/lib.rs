//! Textual assembler and disassembler for P-code.
//!
//! The assembly format is the machine's numeric form spelled out, one
//! instruction per line:
//!
//! ```text
//! INT 0 1      ; one local
//! LIT 0 5
//! STO 0 3
//! OPR 0 0      ; return
//! ```
//!
//! `;` starts a comment. Every instruction takes exactly two numeric
//! operands, the lexical level and the argument, matching the binary
//! encoding one to one. [`disassemble`] is the exact inverse of
//! [`assemble`] for any valid program.

pub mod disassembler;
pub mod error;
pub mod lexer;
pub mod parser;

pub use disassembler::disassemble;
pub use error::AsmError;

use pcode_common::Program;

/// Assemble source text into a program.
pub fn assemble(source: &str) -> Result<Program, AsmError> {
    parser::parse(source)
}
