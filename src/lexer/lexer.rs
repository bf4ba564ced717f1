use tracing::trace;

use crate::error::{CompileError, Result};

use super::{
    token::{KEYWORDS, ONE_SYMBOL_TOKENS},
    Token, TokenKind,
};

#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    tokens: Vec<Token>,
    index: usize,
    line: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            tokens: vec![],
            index: 0,
            line: 1,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn new_token(&mut self, kind: TokenKind, value: Option<String>) {
        trace!(?kind, ?value, line = self.line, "token");
        self.tokens.push(Token {
            kind,
            line: self.line,
            value,
        });
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let s: String = self.chars[self.index..]
            .iter()
            .take_while(|&&c| pred(c))
            .collect();
        self.index += s.chars().count();
        s
    }

    /// Literals must fit the signed 64-bit word every value lives in.
    fn parse_number(&mut self) -> Result<()> {
        let s = self.take_while(|c| c.is_ascii_digit());
        if s.parse::<i64>().is_err() {
            return Err(CompileError::IntegerOutOfRange {
                literal: s,
                line: self.line,
            });
        }
        self.new_token(TokenKind::IntLit, Some(s));
        Ok(())
    }

    fn parse_identifier(&mut self) {
        let s = self.take_while(|c| c.is_ascii_alphanumeric());

        if let Some(kind) = KEYWORDS.get(s.as_str()) {
            self.new_token(*kind, None);
        } else {
            self.new_token(TokenKind::Ident, Some(s));
        }
    }

    fn skip_line_comment(&mut self) {
        self.index += 2;
        while self.peek(0).is_some_and(|c| c != '\n') {
            self.index += 1;
        }
    }

    /// An unterminated comment swallows the rest of the input.
    fn skip_block_comment(&mut self) {
        self.index += 2;
        while let Some(c) = self.peek(0) {
            if c == '*' && self.peek(1) == Some('/') {
                self.index += 2;
                return;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.index += 1;
        }
    }

    fn _tokenize(&mut self) -> Result<()> {
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphabetic() {
                self.parse_identifier();
            } else if c.is_ascii_digit() {
                self.parse_number()?;
            } else if c == '/' && self.peek(1) == Some('/') {
                self.skip_line_comment();
            } else if c == '/' && self.peek(1) == Some('*') {
                self.skip_block_comment();
            } else if let Some(kind) = ONE_SYMBOL_TOKENS.get(&c) {
                self.new_token(*kind, None);
                self.index += 1;
            } else if c == '\n' {
                self.line += 1;
                self.index += 1;
            } else if c.is_ascii_whitespace() {
                self.index += 1;
            } else {
                return Err(CompileError::InvalidCharacter {
                    ch: c,
                    line: self.line,
                });
            }
        }

        Ok(())
    }

    pub fn tokenize(source: &str) -> Result<Vec<Token>> {
        let mut lexer = Lexer::new(source);
        lexer._tokenize()?;

        Ok(lexer.tokens)
    }
}
