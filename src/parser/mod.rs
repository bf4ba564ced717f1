mod arena;
mod ast;
mod parser;

pub use arena::*;
pub use ast::*;
pub use parser::*;
