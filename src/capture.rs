//! Capture analysis (spec.md §4.2): for every function literal, the set of
//! names it reads from its defining scope rather than from its own
//! parameters or local bindings.
//!
//! Results are keyed by [`FuncId`] rather than folded back into the typed
//! AST node itself, the same division of labor `mmcc` uses between a typed
//! tree and the side tables its later passes (`build_mir`, `build_vcode`)
//! attach to it by index.

use hashbrown::HashMap;
use im::HashSet as ImHashSet;
use smallvec::SmallVec;

use crate::symbol::Symbol;
use crate::typeck::typed_ast::{TExpr, TExprKind, TPath, TPathKind};
use crate::types::FuncId;

/// Most closures in practice capture a handful of names; inlining the
/// first few avoids a heap allocation per function literal.
type CaptureList = SmallVec<[Symbol; 4]>;

/// Capture sets for every function literal in one compilation, each sorted
/// by name for a deterministic closure-layout order (spec.md §4.2).
#[derive(Debug, Default)]
pub struct Captures {
  map: HashMap<FuncId, CaptureList>,
}

impl Captures {
  #[must_use] pub fn of(&self, id: FuncId) -> &[Symbol] {
    self.map.get(&id).map_or(&[], SmallVec::as_slice)
  }
}

/// Runs capture analysis over an entire checked program.
#[must_use] pub fn analyze(entry: &TExpr) -> Captures {
  let mut map = HashMap::new();
  free_vars(entry, &ImHashSet::new(), &mut map);
  Captures { map }
}

fn sorted(names: ImHashSet<Symbol>) -> CaptureList {
  let mut v: CaptureList = names.into_iter().collect();
  v.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
  v
}

/// Returns the names `e` reads that are not in `bound`. As a side effect,
/// records every function literal's own capture set (relative to *its own*
/// parameters, independent of `bound`) into `out`.
fn free_vars(e: &TExpr, bound: &ImHashSet<Symbol>, out: &mut HashMap<FuncId, CaptureList>) -> ImHashSet<Symbol> {
  match &e.kind {
    TExprKind::Int(_) | TExprKind::Float(_) | TExprKind::Oper(_) | TExprKind::Error => ImHashSet::new(),

    TExprKind::Array(elems) => elems.iter().fold(ImHashSet::new(), |acc, elem| acc.union(free_vars(elem, bound, out))),

    TExprKind::Struct(_, args) => args.iter().fold(ImHashSet::new(), |acc, a| acc.union(free_vars(a, bound, out))),

    TExprKind::Func(id, params, body) => {
      let own_bound: ImHashSet<Symbol> = params.iter().map(|p| p.name).collect();
      let captured = free_vars(body, &own_bound, out);
      out.insert(*id, sorted(captured.clone()));
      captured.into_iter().filter(|s| !bound.contains(s)).collect()
    }

    TExprKind::Call(callee, args) => {
      let mut acc = free_vars(callee, bound, out);
      for a in args { acc = acc.union(free_vars(a, bound, out)); }
      acc
    }

    TExprKind::Infix(_, lhs, rhs) => free_vars(lhs, bound, out).union(free_vars(rhs, bound, out)),

    TExprKind::Inout(path) => free_vars_path(path, bound, out),

    TExprKind::Binding(decl, init, body) => {
      let from_init = free_vars(init, bound, out);
      let inner_bound = bound.update(decl.name);
      from_init.union(free_vars(body, &inner_bound, out))
    }

    TExprKind::FuncBinding(name, func, body) => {
      let inner_bound = bound.update(*name);
      let from_func = free_vars(func, &inner_bound, out);
      from_func.union(free_vars(body, &inner_bound, out))
    }

    TExprKind::AssignWildcard(rvalue, body) => free_vars(rvalue, bound, out).union(free_vars(body, bound, out)),

    TExprKind::Assign(path, rvalue, body) =>
      free_vars_path(path, bound, out).union(free_vars(rvalue, bound, out)).union(free_vars(body, bound, out)),

    TExprKind::Cond(c, t, f) =>
      free_vars(c, bound, out).union(free_vars(t, bound, out)).union(free_vars(f, bound, out)),

    TExprKind::Cast(value, _) => free_vars(value, bound, out),

    TExprKind::Path(path) => free_vars_path(path, bound, out),
  }
}

fn free_vars_path(p: &TPath, bound: &ImHashSet<Symbol>, out: &mut HashMap<FuncId, CaptureList>) -> ImHashSet<Symbol> {
  match &p.kind {
    TPathKind::Name(name) => {
      if bound.contains(name) { ImHashSet::new() } else { ImHashSet::unit(*name) }
    }
    // A built-in (spec.md §4.1) is resolved through Δ, not Γ, so it is
    // never a free variable to lift into a closure's environment.
    TPathKind::Intrinsic(_) => ImHashSet::new(),
    TPathKind::Prop(base, _) => free_vars_path(base, bound, out),
    TPathKind::Elem(base, index) => free_vars_path(base, bound, out).union(free_vars(index, bound, out)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parsing::parse;
  use crate::typeck::TypeChecker;

  fn captures_for_first_func(src: &str) -> Vec<String> {
    let prog = parse(src).expect("parses");
    let mut tc = TypeChecker::new();
    let texpr = tc.check_program(&prog);
    assert!(!tc.diagnostics().has_errors(), "{:?}", tc.diagnostics().errors());
    let captures = analyze(&texpr);
    let id = first_func_id(&texpr).expect("has a func literal");
    captures.of(id).iter().map(|s| s.as_str()).collect()
  }

  fn first_func_id(e: &TExpr) -> Option<FuncId> {
    match &e.kind {
      TExprKind::Func(id, _, _) => Some(*id),
      TExprKind::Binding(_, init, body) => first_func_id(init).or_else(|| first_func_id(body)),
      TExprKind::FuncBinding(_, func, body) => first_func_id(func).or_else(|| first_func_id(body)),
      _ => None,
    }
  }

  #[test]
  fn closure_captures_outer_let() {
    let names = captures_for_first_func("let n : Int = 1 in (x : Int) -> Int { x + n }");
    assert_eq!(names, vec!["n".to_owned()]);
  }

  #[test]
  fn closure_with_no_free_variables_captures_nothing() {
    let names = captures_for_first_func("(x : Int) -> Int { x + 1 }");
    assert!(names.is_empty());
  }
}
