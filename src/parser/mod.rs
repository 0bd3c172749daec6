//! Parser for the Luming layout notation

pub mod ast;
pub mod document;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use document::{parse, parse_with_resolver, ParsedDocument};
pub use grammar::{parse_structure, parse_tokens};
