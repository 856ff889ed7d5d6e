//! Overlap analysis (spec.md §4.1.1), used by the exclusive-access check on
//! `inout` call arguments (spec.md §8 invariant 3).
//!
//! The analysis is conservative: it is allowed to report "may overlap" for
//! paths that can never actually alias at runtime (e.g. two dynamically
//! indexed elements that happen to always differ), but never the reverse.

use crate::typeck::typed_ast::{TExpr, TExprKind, TPath, TPathKind};

fn strip_one(p: &TPath) -> &TPath {
  match &p.kind {
    TPathKind::Prop(base, _) | TPathKind::Elem(base, _) => base,
    TPathKind::Name(_) | TPathKind::Intrinsic(_) => p,
  }
}

fn index_may_match(a: &TExpr, b: &TExpr) -> bool {
  match (&a.kind, &b.kind) {
    (TExprKind::Int(x), TExprKind::Int(y)) => x == y,
    _ => true,
  }
}

/// Whether two paths may denote overlapping memory (spec.md §4.1.1).
#[must_use] pub fn may_overlap(p: &TPath, q: &TPath) -> bool {
  match (&p.kind, &q.kind) {
    (TPathKind::Name(a), TPathKind::Name(b)) => a == b,
    (TPathKind::Prop(pb, pf), TPathKind::Prop(qb, qf)) => pf == qf && may_overlap(pb, qb),
    (TPathKind::Elem(pb, pi), TPathKind::Elem(qb, qi)) =>
      index_may_match(pi, qi) && may_overlap(pb, qb),
    // An intrinsic (spec.md §4.1) is never `Var`, so `check_inout` never lets
    // one reach here as an `inout` argument path; treated as a leaf like
    // `Name` so `strip_one` can't loop on it.
    (TPathKind::Intrinsic(a), TPathKind::Intrinsic(b)) => a == b,
    (TPathKind::Name(_) | TPathKind::Intrinsic(_), _) => may_overlap(p, strip_one(q)),
    (_, TPathKind::Name(_) | TPathKind::Intrinsic(_)) => may_overlap(strip_one(p), q),
    _ => may_overlap(strip_one(p), strip_one(q)),
  }
}

/// Checks every pair of `inout` argument paths in one call for exclusive
/// access (spec.md §4.1 "Call": "for every pair of arguments that correspond
/// to `Inout` parameters, their paths must be non-overlapping"). Returns the
/// index pair of the first violation found, if any.
#[must_use] pub fn first_violation(paths: &[&TPath]) -> Option<(usize, usize)> {
  for i in 0..paths.len() {
    for j in (i + 1)..paths.len() {
      if may_overlap(paths[i], paths[j]) { return Some((i, j)) }
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::symbol::intern;
  use crate::types::ty::{Mutability, Type};
  use crate::types::Span;

  fn name(n: &str) -> TPath {
    TPath { span: Span::default(), ty: Type::Int, mutability: Mutability::Var, kind: TPathKind::Name(intern(n)) }
  }
  fn prop(base: TPath, f: &str) -> TPath {
    TPath { span: Span::default(), ty: Type::Int, mutability: Mutability::Var, kind: TPathKind::Prop(Box::new(base), intern(f)) }
  }
  fn int_lit(n: i64) -> TExpr {
    TExpr { span: Span::default(), ty: Type::Int, kind: TExprKind::Int(n) }
  }
  fn elem(base: TPath, idx: TExpr) -> TPath {
    TPath { span: Span::default(), ty: Type::Int, mutability: Mutability::Var, kind: TPathKind::Elem(Box::new(base), Box::new(idx)) }
  }

  #[test]
  fn same_name_overlaps() {
    assert!(may_overlap(&name("x"), &name("x")));
    assert!(!may_overlap(&name("x"), &name("y")));
  }

  #[test]
  fn different_fields_of_same_base_do_not_overlap() {
    let p = prop(name("p"), "f");
    let q = prop(name("p"), "s");
    assert!(!may_overlap(&p, &q));
  }

  #[test]
  fn same_field_of_same_base_overlaps() {
    let p = prop(name("p"), "f");
    let q = prop(name("p"), "f");
    assert!(may_overlap(&p, &q));
  }

  #[test]
  fn literal_distinct_indices_do_not_overlap() {
    let p = elem(name("a"), int_lit(0));
    let q = elem(name("a"), int_lit(1));
    assert!(!may_overlap(&p, &q));
  }

  #[test]
  fn dynamic_indices_conservatively_overlap() {
    let dyn_idx = TExpr { span: Span::default(), ty: Type::Int, kind: TExprKind::Path(name("i")) };
    let p = elem(name("a"), dyn_idx.clone());
    let q = elem(name("a"), int_lit(1));
    assert!(may_overlap(&p, &q));
  }

  #[test]
  fn prefix_path_overlaps_with_its_extension() {
    let p = name("num");
    let q = name("num");
    assert!(may_overlap(&p, &q));
  }

  #[test]
  fn exclusive_access_reports_first_violation() {
    let a = name("num");
    let b = name("num");
    assert_eq!(first_violation(&[&a, &b]), Some((0, 1)));
  }
}
