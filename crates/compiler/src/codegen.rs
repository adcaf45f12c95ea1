//! Statement parsing and code emission.
//!
//! The compiler is deliberately naive: each statement is parsed by
//! recursive descent and instructions are emitted in a single forward
//! pass, with jump targets backpatched once the enclosed code is known.
//! Expressions compile to postorder stack code, so left-associative
//! chains evaluate strictly left to right.

use std::collections::BTreeMap;

use pcode_common::{Instruction, Opr};

use crate::error::CompileError;
use crate::lexer::Token;

pub(crate) const KEYWORDS: &[&str] = &["var", "if", "then", "while", "do"];

/// Cursor over one line's tokens.
pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
    text: &'a str,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Token], line: usize, text: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
            text,
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn malformed_statement(&self) -> CompileError {
        CompileError::MalformedStatement {
            line: self.line,
            text: self.text.to_string(),
        }
    }

    fn malformed_expression(&self, detail: impl Into<String>) -> CompileError {
        CompileError::MalformedExpression {
            line: self.line,
            detail: detail.into(),
        }
    }
}

/// Emits instructions and owns the symbol table.
pub(crate) struct Codegen {
    code: Vec<Instruction>,
    symbols: BTreeMap<String, i32>,
}

impl Codegen {
    pub(crate) fn new() -> Self {
        Self {
            code: Vec::new(),
            symbols: BTreeMap::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<Instruction>, BTreeMap<String, i32>) {
        (self.code, self.symbols)
    }

    pub(crate) fn var_count(&self) -> i32 {
        self.symbols.len() as i32
    }

    pub(crate) fn emit(&mut self, instr: Instruction) {
        self.code.push(instr);
    }

    /// Declare a variable at the next free frame offset. The first
    /// local sits at offset 3, just past the frame's link words.
    pub(crate) fn declare(&mut self, name: &str, line: usize) -> Result<(), CompileError> {
        if self.symbols.contains_key(name) {
            return Err(CompileError::DuplicateVariable {
                line,
                name: name.to_string(),
            });
        }
        let offset = 3 + self.symbols.len() as i32;
        self.symbols.insert(name.to_string(), offset);
        Ok(())
    }

    /// Parse and emit one full line of statements.
    pub(crate) fn statement_list(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        self.sequence(p)?;
        if !p.at_end() {
            return Err(p.malformed_statement());
        }
        Ok(())
    }

    /// `;`-separated statements; a trailing `;` is allowed. An `if` or
    /// `while` body is a sequence too, so it extends to the end of the
    /// line.
    fn sequence(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        self.statement(p)?;
        while let Some(Token::Semi) = p.peek() {
            p.next();
            if p.at_end() {
                break;
            }
            self.statement(p)?;
        }
        Ok(())
    }

    fn statement(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        match p.peek() {
            Some(Token::Ident(kw)) if kw == "if" => {
                p.next();
                self.expression(p)?;
                self.expect_keyword(p, "then")?;
                let jpc_at = self.code.len();
                self.emit(Instruction::jpc(0));
                self.sequence(p)?;
                self.patch(jpc_at);
                Ok(())
            }
            Some(Token::Ident(kw)) if kw == "while" => {
                p.next();
                let head = self.code.len() as i32;
                self.expression(p)?;
                self.expect_keyword(p, "do")?;
                let jpc_at = self.code.len();
                self.emit(Instruction::jpc(0));
                self.sequence(p)?;
                self.emit(Instruction::jmp(head));
                self.patch(jpc_at);
                Ok(())
            }
            Some(Token::Ident(name)) => {
                if KEYWORDS.contains(&name.as_str()) {
                    return Err(p.malformed_statement());
                }
                let offset = self.lookup(name, p.line)?;
                p.next();
                match p.next() {
                    Some(Token::Assign) => {}
                    _ => return Err(p.malformed_statement()),
                }
                self.expression(p)?;
                self.emit(Instruction::sto(0, offset));
                Ok(())
            }
            _ => Err(p.malformed_statement()),
        }
    }

    fn expect_keyword(&self, p: &mut Parser, kw: &str) -> Result<(), CompileError> {
        match p.next() {
            Some(Token::Ident(word)) if word == kw => Ok(()),
            _ => Err(p.malformed_statement()),
        }
    }

    /// Point a pending JPC at the current end of code.
    fn patch(&mut self, at: usize) {
        self.code[at].arg = self.code.len() as i32;
    }

    fn lookup(&self, name: &str, line: usize) -> Result<i32, CompileError> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::UndeclaredVariable {
                line,
                name: name.to_string(),
            })
    }

    // Expression grammar, loosest binding first:
    //   expr  :=  and { "||" and }
    //   and   :=  cmp { "&&" cmp }
    //   cmp   :=  add { ("=="|"!="|"<"|"<="|">"|">=") add }
    //   add   :=  mul { ("+"|"-") mul }
    //   mul   :=  unary { ("*"|"/"|"%") unary }
    //   unary :=  "-" unary | primary
    //   primary := NUMBER | IDENT | "(" expr ")"

    pub(crate) fn expression(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        self.and_expr(p)?;
        while let Some(Token::OrOr) = p.peek() {
            p.next();
            self.and_expr(p)?;
            self.emit(Instruction::opr(Opr::Or));
        }
        Ok(())
    }

    fn and_expr(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        self.comparison(p)?;
        while let Some(Token::AndAnd) = p.peek() {
            p.next();
            self.comparison(p)?;
            self.emit(Instruction::opr(Opr::And));
        }
        Ok(())
    }

    fn comparison(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        self.additive(p)?;
        loop {
            let op = match p.peek() {
                Some(Token::EqEq) => Opr::Eq,
                Some(Token::NotEq) => Opr::Ne,
                Some(Token::Lt) => Opr::Lt,
                Some(Token::Le) => Opr::Le,
                Some(Token::Gt) => Opr::Gt,
                Some(Token::Ge) => Opr::Ge,
                _ => return Ok(()),
            };
            p.next();
            self.additive(p)?;
            self.emit(Instruction::opr(op));
        }
    }

    fn additive(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        self.multiplicative(p)?;
        loop {
            let op = match p.peek() {
                Some(Token::Plus) => Opr::Add,
                Some(Token::Minus) => Opr::Sub,
                _ => return Ok(()),
            };
            p.next();
            self.multiplicative(p)?;
            self.emit(Instruction::opr(op));
        }
    }

    fn multiplicative(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        self.unary(p)?;
        loop {
            let op = match p.peek() {
                Some(Token::Star) => Opr::Mul,
                Some(Token::Slash) => Opr::Div,
                Some(Token::Percent) => Opr::Mod,
                _ => return Ok(()),
            };
            p.next();
            self.unary(p)?;
            self.emit(Instruction::opr(op));
        }
    }

    fn unary(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        if let Some(Token::Minus) = p.peek() {
            p.next();
            // A negated literal folds into a single LIT.
            if let Some(Token::Number(n)) = p.peek() {
                let value = self.literal(-n, p)?;
                p.next();
                self.emit(Instruction::lit(value));
                return Ok(());
            }
            self.unary(p)?;
            self.emit(Instruction::opr(Opr::Neg));
            return Ok(());
        }
        self.primary(p)
    }

    fn primary(&mut self, p: &mut Parser) -> Result<(), CompileError> {
        match p.next() {
            Some(Token::Number(n)) => {
                let value = self.literal(*n, p)?;
                self.emit(Instruction::lit(value));
                Ok(())
            }
            Some(Token::Ident(name)) => {
                if KEYWORDS.contains(&name.as_str()) {
                    return Err(p.malformed_expression(format!(
                        "keyword `{name}` in expression"
                    )));
                }
                let offset = self.lookup(name, p.line)?;
                self.emit(Instruction::lod(0, offset));
                Ok(())
            }
            Some(Token::LParen) => {
                self.expression(p)?;
                match p.next() {
                    Some(Token::RParen) => Ok(()),
                    _ => Err(p.malformed_expression("expected `)`")),
                }
            }
            Some(token) => Err(p.malformed_expression(format!("unexpected {token:?}"))),
            None => Err(p.malformed_expression("expression ended early")),
        }
    }

    fn literal(&self, n: i64, p: &Parser) -> Result<i32, CompileError> {
        i32::try_from(n).map_err(|_| CompileError::NumberOverflow {
            line: p.line,
            text: n.to_string(),
        })
    }
}
