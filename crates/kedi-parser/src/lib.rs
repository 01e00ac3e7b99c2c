//! Kedi parser: converts a token stream into a syntax tree.

mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser, MAX_BLOCK_DEPTH, MAX_EXPR_DEPTH};
