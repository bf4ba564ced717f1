mod codegen;
mod variables;

pub use codegen::*;
