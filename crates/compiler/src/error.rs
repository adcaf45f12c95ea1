//! Compile-time errors.
//!
//! Every variant carries the 1-based source line for diagnostics.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("line {line}: unexpected character {ch:?}")]
    UnexpectedChar { line: usize, ch: char },

    #[error("line {line}: numeric literal out of range: {text}")]
    NumberOverflow { line: usize, text: String },

    #[error("line {line}: undeclared variable `{name}`")]
    UndeclaredVariable { line: usize, name: String },

    #[error("line {line}: variable `{name}` already declared")]
    DuplicateVariable { line: usize, name: String },

    #[error("line {line}: malformed statement: {text}")]
    MalformedStatement { line: usize, text: String },

    #[error("line {line}: malformed expression: {detail}")]
    MalformedExpression { line: usize, detail: String },
}
