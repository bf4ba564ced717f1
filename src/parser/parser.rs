use tracing::debug;

use crate::{
    error::{CompileError, Result},
    lexer::{Token, TokenKind},
};

use super::{Arena, BinExpr, BinOpKind, Expr, Id, IfPred, Program, Scope, Stmt, Term};

/// Deepest allowed stack of open parentheses and braces.
pub const MAX_NESTING: usize = 256;

#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
    arena: &'a mut Arena,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, arena: &'a mut Arena) -> Self {
        Self {
            tokens,
            index: 0,
            depth: 0,
            arena,
        }
    }

    pub fn parse(&mut self) -> Result<Program> {
        let program = self.parse_program()?;
        debug!(
            statements = program.0.len(),
            arena_used = self.arena.used(),
            "parsed program"
        );
        Ok(program)
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    fn peek_is(&self, offset: usize, kind: TokenKind) -> bool {
        self.peek(offset).is_some_and(|t| t.kind == kind)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.index].clone();
        self.index += 1;
        t
    }

    fn consume(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek_is(0, kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Line of the last consumed token, or of the pending one at the very start.
    fn line(&self) -> usize {
        self.index
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .or_else(|| self.peek(0))
            .map_or(1, |t| t.line)
    }

    fn error_expected(&self, expected: impl Into<String>) -> CompileError {
        CompileError::expected(expected, self.line())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        self.consume(kind)
            .ok_or_else(|| self.error_expected(kind.to_string()))
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth == MAX_NESTING {
            return Err(CompileError::NestingTooDeep {
                limit: MAX_NESTING,
                line: self.line(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// program = stmt*
    fn parse_program(&mut self) -> Result<Program> {
        let mut stmts = vec![];

        while self.peek(0).is_some() {
            let Some(stmt) = self.parse_stmt()? else {
                let line = self.peek(0).map_or_else(|| self.line(), |t| t.line);
                return Err(CompileError::InvalidStatement { line });
            };
            stmts.push(stmt);
        }

        Ok(Program(stmts))
    }

    /// stmt = "exit" "(" expr ")" ";"
    ///      | "let" ident "=" expr ";"
    ///      | ident "=" expr ";"
    ///      | scope
    ///      | "if" "(" expr ")" scope if_pred?
    fn parse_stmt(&mut self) -> Result<Option<Id<Stmt>>> {
        let stmt = if self.consume(TokenKind::Exit).is_some() {
            self.expect(TokenKind::OpenParen)?;
            let expr = self.expect_expr()?;
            self.expect(TokenKind::CloseParen)?;
            self.expect(TokenKind::SemiColon)?;
            Stmt::Exit(expr)
        } else if self.consume(TokenKind::Let).is_some() {
            let ident = self.expect(TokenKind::Ident)?;
            self.expect(TokenKind::Equal)?;
            let expr = self.expect_expr()?;
            self.expect(TokenKind::SemiColon)?;
            Stmt::Let(ident, expr)
        } else if self.peek_is(0, TokenKind::Ident) && self.peek_is(1, TokenKind::Equal) {
            let ident = self.advance();
            self.index += 1;
            let expr = self.expect_expr()?;
            self.expect(TokenKind::SemiColon)?;
            Stmt::Assign(ident, expr)
        } else if self.peek_is(0, TokenKind::OpenCurlyBrace) {
            Stmt::Scope(self.parse_scope()?)
        } else if self.consume(TokenKind::If).is_some() {
            self.expect(TokenKind::OpenParen)?;
            let expr = self.expect_expr()?;
            self.expect(TokenKind::CloseParen)?;
            let scope = self.parse_scope()?;
            let pred = self.parse_if_pred()?;
            Stmt::If(expr, scope, pred)
        } else {
            return Ok(None);
        };

        self.arena.alloc(stmt).map(Some)
    }

    /// scope = "{" stmt* "}"
    fn parse_scope(&mut self) -> Result<Id<Scope>> {
        self.expect(TokenKind::OpenCurlyBrace)?;
        self.enter()?;

        let mut stmts = vec![];
        while let Some(stmt) = self.parse_stmt()? {
            stmts.push(stmt);
        }

        self.expect(TokenKind::CloseCurlyBrace)?;
        self.leave();
        self.arena.alloc(Scope(stmts))
    }

    /// if_pred = "elif" "(" expr ")" scope if_pred?
    ///         | "else" scope
    ///
    /// The chain is read front to back and linked back to front, so a long
    /// `elif` ladder does not grow the call stack.
    fn parse_if_pred(&mut self) -> Result<Option<Id<IfPred>>> {
        let mut elifs = vec![];
        while self.consume(TokenKind::Elif).is_some() {
            self.expect(TokenKind::OpenParen)?;
            let expr = self.expect_expr()?;
            self.expect(TokenKind::CloseParen)?;
            elifs.push((expr, self.parse_scope()?));
        }

        let mut next = if self.consume(TokenKind::Else).is_some() {
            let scope = self.parse_scope()?;
            Some(self.arena.alloc(IfPred::Else(scope))?)
        } else {
            None
        };

        for (expr, scope) in elifs.into_iter().rev() {
            next = Some(self.arena.alloc(IfPred::Elif(expr, scope, next))?);
        }

        Ok(next)
    }

    fn expect_expr(&mut self) -> Result<Id<Expr>> {
        self.parse_expr(0)?
            .ok_or_else(|| self.error_expected("expression"))
    }

    /// expr = term (binop expr)*
    ///
    /// Operators at or above `min_prec` are folded into the running left hand
    /// side, and the right hand side only takes strictly tighter operators,
    /// which keeps every level left associative.
    fn parse_expr(&mut self, min_prec: u8) -> Result<Option<Id<Expr>>> {
        let Some(term) = self.parse_term()? else {
            return Ok(None);
        };
        let mut lhs = self.arena.alloc(Expr::Term(term))?;

        loop {
            let Some(op) = self.peek(0) else {
                break;
            };
            let Some(prec) = op.kind.binary_precedence() else {
                break;
            };
            if prec < min_prec {
                break;
            }

            let op = self.advance();
            let rhs = self
                .parse_expr(prec + 1)?
                .ok_or_else(|| self.error_expected("expression"))?;

            let kind = match op.kind {
                TokenKind::Plus => BinOpKind::Add,
                TokenKind::Minus => BinOpKind::Sub,
                TokenKind::Star => BinOpKind::Mul,
                TokenKind::Slash => BinOpKind::Div,
                _ => unreachable!("binary_precedence only accepts arithmetic operators"),
            };
            let bin = self.arena.alloc(BinExpr { kind, lhs, rhs })?;
            lhs = self.arena.alloc(Expr::Binary(bin))?;
        }

        Ok(Some(lhs))
    }

    /// term = int_lit
    ///      | ident
    ///      | "(" expr ")"
    fn parse_term(&mut self) -> Result<Option<Id<Term>>> {
        let term = if let Some(t) = self.consume(TokenKind::IntLit) {
            Term::IntLit(t)
        } else if let Some(t) = self.consume(TokenKind::Ident) {
            Term::Ident(t)
        } else if self.consume(TokenKind::OpenParen).is_some() {
            self.enter()?;
            let expr = self.expect_expr()?;
            self.expect(TokenKind::CloseParen)?;
            self.leave();
            Term::Paren(expr)
        } else {
            return Ok(None);
        };

        self.arena.alloc(term).map(Some)
    }
}
