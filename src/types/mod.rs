//! Shared data model: spans, interned indices, and the semantic type
//! system shared between the type checker and the code generator.

pub mod ast;
pub mod entity;
pub mod ty;

use std::fmt;

/// A location in a source file, used for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct Span {
  pub start: u32,
  pub end: u32,
}

impl Span {
  #[must_use] pub fn new(start: u32, end: u32) -> Self { Self { start, end } }

  #[must_use] pub fn to(self, other: Span) -> Span { Span::new(self.start, other.end) }
}

impl fmt::Display for Span {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}", self.start, self.end)
  }
}

/// A value tagged with the source span it was produced from.
#[derive(Clone, Debug)]
pub struct Spanned<T> {
  pub span: Span,
  pub k: T,
}

impl<T> Spanned<T> {
  #[must_use] pub fn new(span: Span, k: T) -> Self { Self { span, k } }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
    Spanned { span: self.span, k: f(self.k) }
  }
}

/// Declares a newtype wrapping `u32`, used as an opaque key into the
/// capture-analysis and escape-analysis side tables (`im::HashMap`-keyed,
/// not a dense vector: ids are assigned in typing order, not contiguous
/// allocation order, so there is no array to index into).
#[macro_export]
macro_rules! mk_idx {
  ($(#[$attr:meta])* $name:ident) => {
    $(#[$attr])*
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct $name(pub u32);

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", stringify!($name), self.0)
      }
    }
  }
}

mk_idx!(
  /// Index of a local binding, assigned in declaration order within one compilation.
  BindingId
);

mk_idx!(
  /// Index of a function literal, assigned in declaration order within one
  /// compilation; used to key the capture-analysis and escape-analysis
  /// side tables keyed off a typed AST node without needing to carry their
  /// results inline in the node itself.
  FuncId
);
