//! The typed AST produced by the type checker.
//!
//! Per spec.md §9's design note "In-place mutation of the AST during type
//! checking": rather than decorate the parser's `Expr` nodes in place, the
//! checker here returns a fresh tree with every node carrying its resolved
//! [`Type`]. This sidesteps the node-identity-coupled "expected type" slot
//! spec.md §4.1 describes as the original's approach, at the cost of one
//! extra tree -- a cost `mmcc` itself accepts for its own HIR/MIR/VCode
//! chain (three representations, not one mutated in place).

use std::rc::Rc;

use crate::symbol::Symbol;
use crate::types::entity::{Intrinsic, OperKind};
use crate::types::ty::{Mutability, StructShape, Type};
use crate::types::{BindingId, FuncId, Span};

#[derive(Debug, Clone)]
pub struct TPath {
  pub span: Span,
  pub ty: Type,
  pub mutability: Mutability,
  pub kind: TPathKind,
}

#[derive(Debug, Clone)]
pub enum TPathKind {
  Name(Symbol),
  /// A reference to a built-in (spec.md §4.1 "Optional built-ins `uptime`,
  /// `sqrt`"), pre-inserted into Δ rather than Γ, so it cannot also be a
  /// `Name` binding: resolved at the struct-context fallback in
  /// `check_path` rather than an ordinary Γ lookup.
  Intrinsic(Intrinsic),
  Prop(Box<TPath>, Symbol),
  Elem(Box<TPath>, Box<TExpr>),
}

#[derive(Debug, Clone)]
pub struct TParamDecl {
  pub name: Symbol,
  pub ty: Type,
  pub is_inout: bool,
}

#[derive(Debug, Clone)]
pub struct TBindingDecl {
  pub id: BindingId,
  pub mutability: Mutability,
  pub name: Symbol,
  pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct TExpr {
  pub span: Span,
  pub ty: Type,
  pub kind: TExprKind,
}

#[derive(Debug, Clone)]
pub enum TExprKind {
  Int(i64),
  Float(f64),
  Array(Vec<TExpr>),
  Struct(Rc<StructShape>, Vec<TExpr>),
  /// `id` keys the capture-analysis result table (spec.md §4.2) and the
  /// escape-analysis result table for any arrays declared in the body
  /// (spec.md §4.3).
  Func(FuncId, Rc<[TParamDecl]>, Box<TExpr>),
  Call(Box<TExpr>, Vec<TExpr>),
  Infix(OperKind, Box<TExpr>, Box<TExpr>),
  Oper(OperKind),
  Inout(Box<TPath>),
  Binding(TBindingDecl, Box<TExpr>, Box<TExpr>),
  FuncBinding(Symbol, Box<TExpr>, Box<TExpr>),
  /// `_ = rvalue in body`: the rvalue is evaluated and discarded.
  AssignWildcard(Box<TExpr>, Box<TExpr>),
  Assign(TPath, Box<TExpr>, Box<TExpr>),
  Cond(Box<TExpr>, Box<TExpr>, Box<TExpr>),
  Cast(Box<TExpr>, Type),
  Path(TPath),
  Error,
}

impl TExpr {
  #[must_use] pub fn error(span: Span) -> TExpr { TExpr { span, ty: Type::Error, kind: TExprKind::Error } }
}
