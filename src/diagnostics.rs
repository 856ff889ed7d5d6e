//! Error handling (spec.md §7).
//!
//! Lex and parse errors halt compilation of that program as soon as they are
//! produced (spec.md: "Parse errors: reported, compilation of that program
//! halts"). Type errors accumulate in a [`Diagnostics`] sink across the whole
//! program: each ill-typed subtree is marked [`crate::types::ty::Type::Error`]
//! and checking continues in sibling subtrees, the way `mmcc`'s `ty::TyKind`
//! has its own `Error` variant that downstream passes refuse to see
//! (`panic!("unreachable")` in `build_mir.rs`) because code generation never
//! runs once any `Error` survives to the end of type checking.

use thiserror::Error;

use crate::types::Span;

/// A single compiler diagnostic, severity-tagged the way §7's user-visible
/// format implies (`L:C: error: <message>`), though the line/column
/// computation and source excerpt rendering are left to an external
/// diagnostic-formatting collaborator (spec.md §1 Out of scope).
#[derive(Debug, Clone)]
pub struct Diagnostic {
  pub span: Span,
  pub message: String,
}

impl Diagnostic {
  #[must_use] pub fn new(span: Span, message: impl Into<String>) -> Self {
    Self { span, message: message.into() }
  }
}

/// Lex errors (spec.md §7 "Lex/parse").
#[derive(Debug, Error)]
pub enum LexError {
  #[error("{0}: invalid token")]
  InvalidToken(Span),
  #[error("{0}: invalid literal: {1}")]
  InvalidLiteral(Span, String),
}

/// Parse errors (spec.md §7 "Lex/parse").
#[derive(Debug, Error)]
pub enum ParseError {
  #[error("{0}: unexpected token: {1}")]
  UnexpectedToken(Span, String),
  #[error("{0}: missing expected token: {1}")]
  MissingToken(Span, String),
  #[error("{0}: missing property annotation")]
  MissingAnnotation(Span),
  #[error(transparent)]
  Lex(#[from] LexError),
}

/// Type errors (spec.md §7 "Type"), accumulated rather than propagated with `?`.
#[derive(Debug, Error, Clone)]
pub enum TypeError {
  #[error("{0}: undefined binding {1:?}")]
  UndefinedBinding(Span, String),
  #[error("{0}: undefined type {1:?}")]
  UndefinedType(Span, String),
  #[error("{0}: invalid use of `_`")]
  InvalidWildcard(Span),
  #[error("{0}: no member named {1:?} on this struct")]
  MissingMember(Span, String),
  #[error("{0}: invalid argument count: expected {1}, found {2}")]
  InvalidArgCount(Span, usize, usize),
  #[error("{0}: called value is not a function")]
  NotAFunction(Span),
  #[error("{0}: indexing into a non-array type")]
  NotAnArray(Span),
  #[error("{0}: ambiguous element type for empty array literal")]
  AmbiguousEmptyArray(Span),
  #[error("{0}: lvalue is not mutable")]
  ImmutableLvalue(Span),
  #[error("{0}: `inout` argument is not mutable")]
  ImmutableInout(Span),
  #[error("{0}: exclusive access violation between two `inout` arguments")]
  ExclusiveAccessViolation(Span),
  #[error("{0}: duplicate declaration of {1:?}")]
  DuplicateDeclaration(Span, String),
  #[error("{0}: no operator overload for these operand types")]
  UndefinedOperator(Span),
  #[error("{0}: ambiguous operator reference")]
  AmbiguousOperator(Span),
  #[error("{0}: invalid conversion")]
  InvalidConversion(Span),
  #[error("{0}: binding has neither a signature nor an initializer")]
  MissingSignatureOrInit(Span),
  #[error("{0}: type mismatch")]
  TypeMismatch(Span),
}

/// Accumulates type errors across an entire compilation; drained once at the
/// end (spec.md §7: "after all types have been checked, if any Error remains,
/// code generation does not run").
#[derive(Debug, Default)]
pub struct Diagnostics {
  errors: Vec<TypeError>,
}

impl Diagnostics {
  #[must_use] pub fn new() -> Self { Self::default() }

  pub fn report(&mut self, e: TypeError) { self.errors.push(e); }

  #[must_use] pub fn has_errors(&self) -> bool { !self.errors.is_empty() }

  #[must_use] pub fn errors(&self) -> &[TypeError] { &self.errors }

  pub fn into_errors(self) -> Vec<TypeError> { self.errors }
}
