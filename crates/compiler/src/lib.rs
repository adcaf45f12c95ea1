//! Compiler from a small imperative expression language to P-code.
//!
//! The source language is line-oriented:
//!
//! ```text
//! // declarations come first, then statements
//! var n
//! var f
//! n = 5
//! f = 1
//! while n > 0 do f = f * n; n = n - 1
//! ```
//!
//! Each program compiles to a flat instruction list that runs in the
//! machine's outermost frame: a leading `INT` reserves one slot per
//! declared variable and a trailing `OPR 0 0` returns, halting the
//! machine. Variables live at frame offsets handed out in declaration
//! order starting at 3, recorded in [`Compiled::symbols`] so callers
//! can read final values back out of a halted machine.
//!
//! # Example
//!
//! ```
//! use pcode_compiler::compile;
//!
//! let compiled = compile("var a\nvar b\na = 8\nb = a + 8").unwrap();
//! assert_eq!(compiled.symbols["a"], 3);
//! assert_eq!(compiled.symbols["b"], 4);
//! ```

pub mod codegen;
pub mod error;
pub mod lexer;

pub use error::CompileError;

use std::collections::BTreeMap;

use pcode_common::{Instruction, Opr, Program};

use codegen::{Codegen, Parser, KEYWORDS};
use lexer::{tokenize, Token};

/// A compiled program together with its variable layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub program: Program,
    /// Variable name to frame offset, in name order.
    pub symbols: BTreeMap<String, i32>,
}

/// Compile source text to a P-code program.
///
/// Declarations (`var NAME`) are collected in a first pass over the
/// whole source, so they may appear on any line; statements compile
/// in order of appearance. `//` starts a comment that runs to the end
/// of the line; blank lines are ignored.
pub fn compile(source: &str) -> Result<Compiled, CompileError> {
    let mut gen = Codegen::new();
    let mut body: Vec<(usize, String, Vec<Token>)> = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = match raw.split_once("//") {
            Some((before, _)) => before.trim(),
            None => raw.trim(),
        };
        if text.is_empty() {
            continue;
        }
        let tokens = tokenize(text, line)?;

        if matches!(tokens.first(), Some(Token::Ident(kw)) if kw == "var") {
            declare(&mut gen, &tokens, line, text)?;
            continue;
        }

        body.push((line, text.to_string(), tokens));
    }

    gen.emit(Instruction::int(gen.var_count()));
    for (line, text, tokens) in &body {
        let mut parser = Parser::new(tokens, *line, text);
        gen.statement_list(&mut parser)?;
    }
    gen.emit(Instruction::opr(Opr::Return));

    let (code, symbols) = gen.into_parts();
    Ok(Compiled {
        program: Program::new(code),
        symbols,
    })
}

fn declare(
    gen: &mut Codegen,
    tokens: &[Token],
    line: usize,
    text: &str,
) -> Result<(), CompileError> {
    match tokens {
        [Token::Ident(_), Token::Ident(name)]
        | [Token::Ident(_), Token::Ident(name), Token::Semi]
            if !KEYWORDS.contains(&name.as_str()) =>
        {
            gen.declare(name, line)
        }
        _ => Err(CompileError::MalformedStatement {
            line,
            text: text.to_string(),
        }),
    }
}
