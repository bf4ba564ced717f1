//! Errors shared by every stage of the pipeline.
//!
//! Each stage stops at the first problem and hands it back up through `?`.
//! Only the binary decides how to report it.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("invalid character `{ch}` on line {line}")]
    InvalidCharacter { ch: char, line: usize },

    #[error("expected {expected} on line {line}")]
    Expected { expected: String, line: usize },

    #[error("integer literal `{literal}` does not fit in 64 bits on line {line}")]
    IntegerOutOfRange { literal: String, line: usize },

    #[error("nesting deeper than {limit} levels on line {line}")]
    NestingTooDeep { limit: usize, line: usize },

    #[error("invalid statement on line {line}")]
    InvalidStatement { line: usize },

    #[error("undeclared identifier `{name}` on line {line}")]
    UndeclaredIdentifier { name: String, line: usize },

    #[error("identifier `{name}` is already declared in this scope (line {line})")]
    DuplicateIdentifier { name: String, line: usize },

    #[error("arena exhausted: requested {requested} bytes with {remaining} of {capacity} left")]
    ArenaExhausted {
        requested: usize,
        remaining: usize,
        capacity: usize,
    },

    #[error("no exit statement found")]
    NoExitStatement,
}

impl CompileError {
    pub fn expected(expected: impl Into<String>, line: usize) -> Self {
        Self::Expected {
            expected: expected.into(),
            line,
        }
    }
}
