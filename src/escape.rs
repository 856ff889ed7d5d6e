//! Escape analysis for local array literals (spec.md §4.3).
//!
//! A local binding whose initializer is an array literal is stack-allocated
//! unless it escapes the scope it was declared in -- by being captured into a
//! closure, returned in tail position, or passed by value to a call -- or
//! unless it simply does not fit the configured stack budget. Escaping
//! bindings are heap-allocated instead. Results are keyed by [`BindingId`],
//! mirroring [`crate::capture`]'s [`FuncId`]-keyed side table.

use hashbrown::HashSet;
use if_chain::if_chain;

use crate::capture::Captures;
use crate::symbol::Symbol;
use crate::typeck::typed_ast::{TBindingDecl, TExpr, TExprKind, TPath, TPathKind};
use crate::types::ty::Type;
use crate::types::BindingId;

/// Which local array-literal bindings must be heap-allocated.
#[derive(Debug, Default)]
pub struct EscapeInfo {
  heap: HashSet<BindingId>,
}

impl EscapeInfo {
  #[must_use] pub fn escapes(&self, id: BindingId) -> bool { self.heap.contains(&id) }
}

/// A rough size estimate in bytes, used only to compare against the
/// configured stack budget -- not the code generator's authoritative layout.
#[must_use] pub fn byte_size(ty: &Type) -> usize {
  match ty {
    Type::Int | Type::Float | Type::Inout(_) => 8,
    Type::Error => 0,
    Type::Any => 16,
    Type::Array(_) => 8,
    Type::Func(..) => 16,
    Type::Struct(shape) => shape.props.iter().map(|p| byte_size(&p.ty)).sum(),
  }
}

#[must_use] pub fn analyze(entry: &TExpr, captures: &Captures, max_stack_bytes: usize) -> EscapeInfo {
  let mut heap = HashSet::new();
  walk(entry, captures, max_stack_bytes, &mut heap);
  EscapeInfo { heap }
}

fn walk(e: &TExpr, captures: &Captures, budget: usize, heap: &mut HashSet<BindingId>) {
  match &e.kind {
    TExprKind::Int(_) | TExprKind::Float(_) | TExprKind::Oper(_) | TExprKind::Error => {}
    TExprKind::Array(elems) => for el in elems { walk(el, captures, budget, heap) },
    TExprKind::Struct(_, args) => for a in args { walk(a, captures, budget, heap) },
    TExprKind::Func(_, _, body) => walk(body, captures, budget, heap),
    TExprKind::Call(callee, args) => {
      walk(callee, captures, budget, heap);
      for a in args { walk(a, captures, budget, heap) }
    }
    TExprKind::Infix(_, lhs, rhs) => { walk(lhs, captures, budget, heap); walk(rhs, captures, budget, heap) }
    TExprKind::Inout(path) => walk_path(path, captures, budget, heap),
    TExprKind::Binding(decl, init, body) => {
      walk(init, captures, budget, heap);
      walk(body, captures, budget, heap);
      record_array_binding(decl, init, body, captures, budget, heap);
    }
    TExprKind::FuncBinding(_, func, body) => { walk(func, captures, budget, heap); walk(body, captures, budget, heap) }
    TExprKind::AssignWildcard(rvalue, body) => { walk(rvalue, captures, budget, heap); walk(body, captures, budget, heap) }
    TExprKind::Assign(path, rvalue, body) => {
      walk_path(path, captures, budget, heap);
      walk(rvalue, captures, budget, heap);
      walk(body, captures, budget, heap);
    }
    TExprKind::Cond(c, t, f) => { walk(c, captures, budget, heap); walk(t, captures, budget, heap); walk(f, captures, budget, heap) }
    TExprKind::Cast(value, _) => walk(value, captures, budget, heap),
    TExprKind::Path(path) => walk_path(path, captures, budget, heap),
  }
}

fn walk_path(p: &TPath, captures: &Captures, budget: usize, heap: &mut HashSet<BindingId>) {
  if let TPathKind::Elem(base, index) = &p.kind {
    walk_path(base, captures, budget, heap);
    walk(index, captures, budget, heap);
  } else if let TPathKind::Prop(base, _) = &p.kind {
    walk_path(base, captures, budget, heap);
  }
}

fn record_array_binding(decl: &TBindingDecl, init: &TExpr, scope: &TExpr, captures: &Captures, budget: usize, heap: &mut HashSet<BindingId>) {
  if_chain! {
    if let TExprKind::Array(elems) = &init.kind;
    if let Type::Array(elem_ty) = &init.ty;
    let total_size = elems.len() * byte_size(elem_ty);
    if total_size > budget
      || captured_in(scope, decl.name, captures)
      || tail_root_names(scope).contains(&decl.name)
      || passed_by_value(scope, decl.name);
    then { heap.insert(decl.id); }
  }
}

fn captured_in(e: &TExpr, name: Symbol, captures: &Captures) -> bool {
  match &e.kind {
    TExprKind::Func(id, _, body) => captures.of(*id).contains(&name) || captured_in(body, name, captures),
    TExprKind::Array(elems) => elems.iter().any(|el| captured_in(el, name, captures)),
    TExprKind::Struct(_, args) => args.iter().any(|a| captured_in(a, name, captures)),
    TExprKind::Call(callee, args) => captured_in(callee, name, captures) || args.iter().any(|a| captured_in(a, name, captures)),
    TExprKind::Infix(_, lhs, rhs) => captured_in(lhs, name, captures) || captured_in(rhs, name, captures),
    TExprKind::Inout(_) => false,
    TExprKind::Binding(_, init, body) => captured_in(init, name, captures) || captured_in(body, name, captures),
    TExprKind::FuncBinding(_, func, body) => captured_in(func, name, captures) || captured_in(body, name, captures),
    TExprKind::AssignWildcard(rvalue, body) => captured_in(rvalue, name, captures) || captured_in(body, name, captures),
    TExprKind::Assign(_, rvalue, body) => captured_in(rvalue, name, captures) || captured_in(body, name, captures),
    TExprKind::Cond(c, t, f) => captured_in(c, name, captures) || captured_in(t, name, captures) || captured_in(f, name, captures),
    TExprKind::Cast(value, _) => captured_in(value, name, captures),
    _ => false,
  }
}

fn passed_by_value(e: &TExpr, name: Symbol) -> bool {
  match &e.kind {
    TExprKind::Call(callee, args) => {
      args.iter().any(|a| matches!(&a.kind, TExprKind::Path(p) if root_name(p) == Some(name)))
        || passed_by_value(callee, name)
        || args.iter().any(|a| passed_by_value(a, name))
    }
    TExprKind::Array(elems) => elems.iter().any(|el| passed_by_value(el, name)),
    TExprKind::Struct(_, args) => args.iter().any(|a| passed_by_value(a, name)),
    TExprKind::Func(_, _, body) => passed_by_value(body, name),
    TExprKind::Infix(_, lhs, rhs) => passed_by_value(lhs, name) || passed_by_value(rhs, name),
    TExprKind::Binding(_, init, body) => passed_by_value(init, name) || passed_by_value(body, name),
    TExprKind::FuncBinding(_, func, body) => passed_by_value(func, name) || passed_by_value(body, name),
    TExprKind::AssignWildcard(rvalue, body) => passed_by_value(rvalue, name) || passed_by_value(body, name),
    TExprKind::Assign(_, rvalue, body) => passed_by_value(rvalue, name) || passed_by_value(body, name),
    TExprKind::Cond(c, t, f) => passed_by_value(c, name) || passed_by_value(t, name) || passed_by_value(f, name),
    TExprKind::Cast(value, _) => passed_by_value(value, name),
    _ => false,
  }
}

/// The names directly produced in tail position of `e` -- the value `e`
/// ultimately evaluates to without any further computation, following
/// through `let`/`fun`/`=`/`if` bodies. Used to detect a local array being
/// returned from its own declaring scope.
fn tail_root_names(e: &TExpr) -> Vec<Symbol> {
  match &e.kind {
    TExprKind::Path(p) => root_name(p).into_iter().collect(),
    TExprKind::Binding(_, _, body)
    | TExprKind::FuncBinding(_, _, body)
    | TExprKind::AssignWildcard(_, body)
    | TExprKind::Assign(_, _, body) => tail_root_names(body),
    TExprKind::Cond(_, t, f) => {
      let mut names = tail_root_names(t);
      names.extend(tail_root_names(f));
      names
    }
    _ => Vec::new(),
  }
}

fn root_name(p: &TPath) -> Option<Symbol> {
  match &p.kind {
    TPathKind::Name(n) => Some(*n),
    TPathKind::Intrinsic(_) => None,
    TPathKind::Prop(base, _) | TPathKind::Elem(base, _) => root_name(base),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::capture;
  use crate::parsing::parse;
  use crate::typeck::TypeChecker;

  fn analyze_src(src: &str, budget: usize) -> (TExpr, EscapeInfo) {
    let prog = parse(src).expect("parses");
    let mut tc = TypeChecker::new();
    let texpr = tc.check_program(&prog);
    assert!(!tc.diagnostics().has_errors(), "{:?}", tc.diagnostics().errors());
    let captures = capture::analyze(&texpr);
    let info = analyze(&texpr, &captures, budget);
    (texpr, info)
  }

  fn first_binding_id(e: &TExpr) -> Option<BindingId> {
    match &e.kind {
      TExprKind::Binding(decl, _, _) => Some(decl.id),
      _ => None,
    }
  }

  #[test]
  fn small_non_escaping_array_stays_on_stack() {
    let (texpr, info) = analyze_src("let a : [Int] = [1, 2, 3] in 0", 4096);
    let id = first_binding_id(&texpr).expect("has a binding");
    assert!(!info.escapes(id));
  }

  #[test]
  fn array_returned_in_tail_position_escapes() {
    let (texpr, info) = analyze_src("let a : [Int] = [1, 2, 3] in a", 4096);
    let id = first_binding_id(&texpr).expect("has a binding");
    assert!(info.escapes(id));
  }

  #[test]
  fn array_over_budget_escapes_regardless() {
    let (texpr, info) = analyze_src("let a : [Int] = [1, 2, 3] in 0", 8);
    let id = first_binding_id(&texpr).expect("has a binding");
    assert!(info.escapes(id));
  }
}
