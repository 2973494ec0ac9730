pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod span;
pub mod symbols;
pub mod token;
pub mod typecheck;
pub mod types;
