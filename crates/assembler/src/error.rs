//! Assembler errors, each carrying the 1-based source line.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("line {line}: unknown mnemonic `{text}`")]
    UnknownMnemonic { line: usize, text: String },

    #[error("line {line}: expected {expected} more operand(s)")]
    MissingArgument { line: usize, expected: usize },

    #[error("line {line}: invalid number `{text}`")]
    InvalidNumber { line: usize, text: String },

    #[error("line {line}: unexpected token `{text}`")]
    UnexpectedToken { line: usize, text: String },
}
