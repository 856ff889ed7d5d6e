//! The surface AST (spec.md §3 "AST entities"): the node kinds produced by
//! the parser and consumed by the type checker.
//!
//! Per spec.md §9's design note, paths are encoded as a distinguished enum
//! connected to `Expr` by an explicit coercion (`ExprKind::Path`) rather than
//! as a predicate-extracted variant: "every path is a valid expression, but
//! some expressions are not paths", and keeping two small enums wired
//! together by one constructor is easier to pattern-match exhaustively over
//! than a single enum with a "is this a path" escape hatch.

use crate::symbol::Symbol;
use crate::types::ty::Mutability;
use crate::types::Span;

/// A type signature, mirroring [`crate::types::ty::Type`] but as written by
/// the programmer, with struct references left as unresolved names.
#[derive(Debug, Clone, PartialEq)]
pub enum Sign {
  Int,
  Float,
  Named(Symbol),
  Array(Box<Sign>),
  Func(Vec<Sign>, Box<Sign>),
  Inout(Box<Sign>),
  Any,
}

/// `struct NAME { (let|var) NAME (: sign)?; ... }`.
#[derive(Debug, Clone)]
pub struct StructDecl {
  pub span: Span,
  pub name: Symbol,
  pub fields: Vec<FieldDecl>,
}

/// One field of a [`StructDecl`]: always has a signature (fields are never
/// initializer-inferred, unlike local bindings).
#[derive(Debug, Clone)]
pub struct FieldDecl {
  pub span: Span,
  pub mutability: Mutability,
  pub name: Symbol,
  pub signature: Sign,
}

/// A local `let`/`var` binding target. Requires either `signature` or an
/// initializer on the owning [`ExprKind::Binding`] (spec.md §4.1, §7
/// "Annotation": "binding without signature and without initializer").
#[derive(Debug, Clone)]
pub struct BindingDecl {
  pub span: Span,
  pub mutability: Mutability,
  pub name: Symbol,
  pub signature: Option<Sign>,
}

/// A function literal parameter: `NAME : sign`, where `sign` may be `inout T`.
#[derive(Debug, Clone)]
pub struct ParamDecl {
  pub span: Span,
  pub name: Symbol,
  pub signature: Sign,
}

/// A path: a syntactic form denoting a memory location (spec.md GLOSSARY).
#[derive(Debug, Clone)]
pub enum Path {
  /// A bare name, including the reserved wildcard `_` (legal only as an
  /// assignment lvalue; checked in the type checker, not the parser).
  Name(Span, Symbol),
  Prop(Box<Path>, Span, Symbol),
  Elem(Box<Path>, Span, Box<Expr>),
}

impl Path {
  #[must_use] pub fn span(&self) -> Span {
    match self {
      Path::Name(s, _) => *s,
      Path::Prop(_, s, _) => *s,
      Path::Elem(_, s, _) => *s,
    }
  }
}

#[derive(Debug, Clone)]
pub struct Expr {
  pub span: Span,
  pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
  Int(i64),
  Float(f64),
  /// An array literal; empty without an expected type is a type error
  /// (spec.md §4.1 "Literals").
  Array(Vec<Expr>),
  /// A struct literal `Name(a, b, ...)`, positional per declared field order.
  Struct(Symbol, Vec<Expr>),
  /// `(params) -> sign { body }`.
  Func(Vec<ParamDecl>, Sign, Box<Expr>),
  Call(Box<Expr>, Vec<Expr>),
  /// `lhs OP rhs`, with the operator kept as surface text and resolved to an
  /// [`crate::types::entity::OperKind`] by the type checker.
  Infix(Box<Expr>, Span, Symbol, Box<Expr>),
  /// A bare operator reference used as a value, e.g. `+` in `[+, -]`.
  Oper(Span, Symbol),
  /// `&path`.
  Inout(Box<Path>),
  /// `(let|var) NAME (: sign)? = init in body`.
  Binding(BindingDecl, Box<Expr>, Box<Expr>),
  /// `fun NAME(...) -> sign { ... } in body` -- a recursively-bound named function.
  FuncBinding(Span, Symbol, Box<Expr>, Box<Expr>),
  /// `lvalue = rvalue in body`.
  Assign(Path, Box<Expr>, Box<Expr>),
  /// `if cond ? succ ! fail`.
  Cond(Box<Expr>, Box<Expr>, Box<Expr>),
  /// `value as sign`.
  Cast(Box<Expr>, Sign),
  Path(Path),
  /// A node already marked ill-typed before reaching the checker (reserved
  /// for internal construction; the parser never emits this).
  Error,
}

/// The whole compilation unit (spec.md §3 `Program`).
#[derive(Debug, Clone)]
pub struct Program {
  pub types: Vec<StructDecl>,
  pub entry: Expr,
}
