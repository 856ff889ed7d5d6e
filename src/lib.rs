//! `mvsc`: a compiler for mvs-calculus, a small statically-typed
//! expression-oriented language built around mutable value semantics
//! (spec.md §1). The crate root wires together the phases of spec.md §2:
//! lexer and parser (external-collaborator-shaped but implemented plainly,
//! spec.md §1), type checker, capture analysis, escape analysis, code
//! generator (an abstract-machine interpreter, see `codegen/mod.rs`), and
//! the runtime library the generated calls target.

pub mod capture;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod escape;
pub mod lexing;
pub mod object;
pub mod parsing;
pub mod runtime;
pub mod symbol;
pub mod typeck;
pub mod types;

pub use config::Config;
pub use driver::{CompileError, Compiler};
