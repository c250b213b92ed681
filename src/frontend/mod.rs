//! Frontend module - Lexer, Parser, input structure

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod structure;
