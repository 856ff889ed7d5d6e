//! The typing context `Γ` (spec.md §4.1): name → (mutability, type).
//!
//! Backed by `im::HashMap`, a persistent (structurally shared) map. This
//! gives "save and restore Γ around scopes" (spec.md §5) for free: a scope
//! extends `Γ` by cloning it (an O(1) pointer bump, not a deep copy) and
//! inserting one binding, checks its body against the extended clone, and
//! the caller's own `Γ` is untouched and still in scope afterward --
//! no explicit "remove the binding on exit" bookkeeping is needed, unlike an
//! in-place-mutated `HashMap` which would require exactly that.

use im::{HashMap as ImHashMap, HashSet as ImHashSet};

use crate::symbol::Symbol;
use crate::types::ty::{Mutability, Type};

#[derive(Clone, Debug, Default)]
pub struct TypingContext {
  map: ImHashMap<Symbol, (Mutability, Type)>,
  /// Names bound by a `FuncBinding` (spec.md §1 Non-goals: "Named functions
  /// cannot capture local bindings (anonymous functions can)"). A named
  /// function's own body is checked against [`Self::named_funcs_only`]
  /// rather than the ambient `self`, so only the recursive pool of visible
  /// named functions -- never an enclosing `let`/`var` or parameter -- is
  /// reachable from inside it.
  named_funcs: ImHashSet<Symbol>,
}

impl TypingContext {
  #[must_use] pub fn new() -> Self { Self::default() }

  #[must_use] pub fn get(&self, name: Symbol) -> Option<(Mutability, Type)> {
    self.map.get(&name).cloned()
  }

  /// Returns a new context extending `self` with one more ordinary binding
  /// (a `let`/`var` or function parameter). Does not mutate `self`.
  #[must_use] pub fn extended(&self, name: Symbol, mutability: Mutability, ty: Type) -> Self {
    let mut map = self.map.clone();
    map.insert(name, (mutability, ty));
    Self { map, named_funcs: self.named_funcs.clone() }
  }

  /// Returns a new context extending `self` with a `FuncBinding`'s own name,
  /// marked as a named function rather than an ordinary local: reachable
  /// from inside any named function's body nested below this point, not
  /// just from ordinary (capturing) expression contexts.
  #[must_use] pub fn extended_named_func(&self, name: Symbol, ty: Type) -> Self {
    let mut map = self.map.clone();
    map.insert(name, (Mutability::Let, ty));
    Self { map, named_funcs: self.named_funcs.update(name) }
  }

  /// Downgrades every existing binding to `Let` (spec.md §4.1 "Func": "closures
  /// cannot mutate their captures"). Used when entering a function literal's
  /// body, before its own parameters are added back on top.
  #[must_use] pub fn downgraded(&self) -> Self {
    let map = self.map.iter().map(|(k, (_, t))| (*k, (Mutability::Let, t.clone()))).collect();
    Self { map, named_funcs: self.named_funcs.clone() }
  }

  /// The context a `FuncBinding`'s own literal body is checked against:
  /// every ordinary local binding is dropped, leaving only the pool of
  /// named functions already in scope (so mutual reference between
  /// sibling/enclosing named functions still works, since those compile to
  /// direct-dispatch global code rather than a closure environment -- spec.md
  /// §4.4 "Function dispatch").
  #[must_use] pub fn named_funcs_only(&self) -> Self {
    let map = self.map.iter()
      .filter(|(k, _)| self.named_funcs.contains(k))
      .map(|(k, v)| (*k, v.clone()))
      .collect();
    Self { map, named_funcs: self.named_funcs.clone() }
  }

  pub fn iter(&self) -> impl Iterator<Item = (Symbol, &(Mutability, Type))> {
    self.map.iter().map(|(k, v)| (*k, v))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::symbol::intern;

  #[test]
  fn extended_context_does_not_affect_the_original() {
    let base = TypingContext::new();
    let extended = base.extended(intern("x"), Mutability::Var, Type::Int);
    assert!(base.get(intern("x")).is_none());
    assert_eq!(extended.get(intern("x")), Some((Mutability::Var, Type::Int)));
  }

  #[test]
  fn downgrade_demotes_var_to_let() {
    let ctx = TypingContext::new().extended(intern("x"), Mutability::Var, Type::Int);
    let down = ctx.downgraded();
    assert_eq!(down.get(intern("x")), Some((Mutability::Let, Type::Int)));
  }

  #[test]
  fn named_funcs_only_drops_ordinary_locals_but_keeps_named_functions() {
    let ctx = TypingContext::new()
      .extended(intern("n"), Mutability::Let, Type::Int)
      .extended_named_func(intern("helper"), Type::func(vec![], Type::Int));
    let filtered = ctx.named_funcs_only();
    assert!(filtered.get(intern("n")).is_none());
    assert!(filtered.get(intern("helper")).is_some());
  }
}
