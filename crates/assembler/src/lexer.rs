//! Whitespace-splitting lexer for assembly text.
//!
//! Assembly is line-oriented: one instruction per line, fields
//! separated by whitespace, `;` starting a comment that runs to the
//! end of the line. Numbers are decimal or `0x` hex, optionally
//! negative.

use crate::error::AsmError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A candidate mnemonic.
    Word(String),
    Number(i64),
}

/// Lex one line; comments and blank lines yield an empty vector.
pub fn tokenize(text: &str, line: usize) -> Result<Vec<Token>, AsmError> {
    let code = text.split(';').next().unwrap_or("");
    let mut tokens = Vec::new();

    for field in code.split_whitespace() {
        if looks_numeric(field) {
            tokens.push(Token::Number(parse_number(field, line)?));
        } else if field.chars().all(|c| c.is_ascii_alphabetic()) {
            tokens.push(Token::Word(field.to_string()));
        } else {
            return Err(AsmError::UnexpectedToken {
                line,
                text: field.to_string(),
            });
        }
    }

    Ok(tokens)
}

fn looks_numeric(field: &str) -> bool {
    let digits = field.strip_prefix('-').unwrap_or(field);
    digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn parse_number(field: &str, line: usize) -> Result<i64, AsmError> {
    let invalid = || AsmError::InvalidNumber {
        line,
        text: field.to_string(),
    };
    let (negative, digits) = match field.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, field),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).map_err(|_| invalid())?
    } else {
        digits.parse::<i64>().map_err(|_| invalid())?
    };
    Ok(if negative { -magnitude } else { magnitude })
}
