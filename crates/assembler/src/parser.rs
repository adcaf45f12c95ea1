//! Parses token lines into instructions.
//!
//! Every instruction uses the same three-field form: `MNEMONIC level
//! arg`. Mnemonics are case-insensitive; operands must fit their
//! encoded widths (level in `u16`, arg in `i32`).

use pcode_common::{Instruction, Opcode, Program};

use crate::error::AsmError;
use crate::lexer::{tokenize, Token};

/// Assemble full source text into a program.
pub fn parse(source: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let tokens = tokenize(raw, line)?;
        if tokens.is_empty() {
            continue;
        }
        instructions.push(parse_instruction(&tokens, line)?);
    }

    Ok(Program::new(instructions))
}

fn parse_instruction(tokens: &[Token], line: usize) -> Result<Instruction, AsmError> {
    let op = match &tokens[0] {
        Token::Word(word) => mnemonic_to_opcode(word).ok_or_else(|| {
            AsmError::UnknownMnemonic {
                line,
                text: word.clone(),
            }
        })?,
        Token::Number(n) => {
            return Err(AsmError::UnexpectedToken {
                line,
                text: n.to_string(),
            })
        }
    };

    if tokens.len() < 3 {
        return Err(AsmError::MissingArgument {
            line,
            expected: 3 - tokens.len(),
        });
    }
    if tokens.len() > 3 {
        return Err(AsmError::UnexpectedToken {
            line,
            text: token_text(&tokens[3]),
        });
    }

    let level = operand(&tokens[1], line)?;
    let level = u16::try_from(level).map_err(|_| AsmError::InvalidNumber {
        line,
        text: level.to_string(),
    })?;
    let arg = operand(&tokens[2], line)?;
    let arg = i32::try_from(arg).map_err(|_| AsmError::InvalidNumber {
        line,
        text: arg.to_string(),
    })?;

    Ok(Instruction::new(op, level, arg))
}

fn operand(token: &Token, line: usize) -> Result<i64, AsmError> {
    match token {
        Token::Number(n) => Ok(*n),
        Token::Word(word) => Err(AsmError::UnexpectedToken {
            line,
            text: word.clone(),
        }),
    }
}

fn token_text(token: &Token) -> String {
    match token {
        Token::Word(word) => word.clone(),
        Token::Number(n) => n.to_string(),
    }
}

fn mnemonic_to_opcode(word: &str) -> Option<Opcode> {
    match word.to_ascii_uppercase().as_str() {
        "LIT" => Some(Opcode::Lit),
        "OPR" => Some(Opcode::Opr),
        "LOD" => Some(Opcode::Lod),
        "STO" => Some(Opcode::Sto),
        "CAL" => Some(Opcode::Cal),
        "INT" => Some(Opcode::Int),
        "JMP" => Some(Opcode::Jmp),
        "JPC" => Some(Opcode::Jpc),
        _ => None,
    }
}
