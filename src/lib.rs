//! Compiler for the Hydrogen scripting language.
//!
//! Source text goes through three stages, each finishing before the next
//! starts: [`lexer`] turns it into tokens, [`parser`] builds an arena-owned
//! syntax tree, and [`codegen`] walks that tree once to produce NASM assembly
//! for x86-64 Linux.

pub mod codegen;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;

use tracing::debug;

use codegen::Codegen;
use lexer::Lexer;
use parser::{Arena, Parser, DEFAULT_ARENA_CAPACITY};

pub use error::{CompileError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Byte budget for syntax tree nodes.
    pub arena_capacity: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            arena_capacity: DEFAULT_ARENA_CAPACITY,
        }
    }
}

pub fn compile(source: &str) -> Result<String> {
    compile_with(source, &CompileOptions::default())
}

pub fn compile_with(source: &str, options: &CompileOptions) -> Result<String> {
    let tokens = Lexer::tokenize(source)?;
    debug!(tokens = tokens.len(), "tokenized source");

    let mut arena = Arena::with_capacity(options.arena_capacity);
    let program = Parser::new(tokens, &mut arena).parse()?;
    if !program.has_exit(&arena) {
        return Err(CompileError::NoExitStatement);
    }
    debug!(
        used = arena.used(),
        capacity = arena.capacity(),
        "arena usage"
    );

    Codegen::new(&arena).generate(&program)
}
