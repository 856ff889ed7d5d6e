//! Tokenization (spec.md §6 "Source file format"). Out of scope per
//! spec.md §1 in the sense that no elaborate tokenization-table engineering
//! is expected here -- this is a plain hand-written scanner, not a
//! generated lexer, grounded in the token-enum style of
//! `examples/LouisJackman-language-x`'s `lexing::tokens` rather than in
//! `mmcc` (whose surface syntax is host Lisp macros, not a conventional
//! token stream).

pub mod lexer;
pub mod token;

pub use lexer::{lex, Lexer};
pub use token::Token;
