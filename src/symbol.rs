//! Global string interner.
//!
//! Every identifier in a program (struct names, field names, bindings,
//! parameters) is interned once and referred to by a cheap `Copy` [`Symbol`]
//! from then on, the way `mmcc`'s `types::entity` module expects a
//! `crate::symbol::Interner` and a free `intern` function to already exist.

use std::cell::RefCell;
use std::fmt;

use hashbrown::HashMap;

/// An interned string. Equality and hashing are by interned index, not by
/// content, so comparing two symbols is a single integer compare.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    with_interner(|i| write!(f, "{:?}", i.resolve(*self)))
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    with_interner(|i| write!(f, "{}", i.resolve(*self)))
  }
}

impl Symbol {
  #[must_use] pub fn into_usize(self) -> usize { self.0 as usize }
  #[must_use] pub fn as_str(self) -> String { with_interner(|i| i.resolve(self).to_owned()) }
}

/// The interner itself: a bidirectional map between strings and indices.
#[derive(Default)]
pub struct Interner {
  strings: Vec<Box<str>>,
  lookup: HashMap<Box<str>, Symbol>,
}

impl Interner {
  fn intern(&mut self, s: &str) -> Symbol {
    if let Some(&sym) = self.lookup.get(s) { return sym }
    let sym = Symbol(self.strings.len() as u32);
    let boxed: Box<str> = s.into();
    self.strings.push(boxed.clone());
    self.lookup.insert(boxed, sym);
    sym
  }

  fn resolve(&self, sym: Symbol) -> &str { &self.strings[sym.into_usize()] }
}

thread_local! {
  static INTERNER: RefCell<Interner> = RefCell::new(Interner::default());
}

fn with_interner<R>(f: impl FnOnce(&Interner) -> R) -> R {
  INTERNER.with(|i| f(&i.borrow()))
}

/// Interns a string, returning a [`Symbol`] that can be copied and compared cheaply.
pub fn intern(s: &str) -> Symbol {
  INTERNER.with(|i| i.borrow_mut().intern(s))
}

/// Builds a dense lookup table from symbol index to `T`, for small fixed sets of
/// well-known symbols (keywords, builtin names). Mirrors `mmcc`'s
/// `init_dense_symbol_map`, used by `PrimOp`-style enums to resolve a symbol to
/// a primitive in O(1) once interned.
#[must_use] pub fn init_dense_symbol_map<T: Copy>(pairs: &[(Symbol, T)]) -> Box<[Option<T>]> {
  let max = pairs.iter().map(|(s, _)| s.into_usize()).max().map_or(0, |m| m + 1);
  let mut map = vec![None; max].into_boxed_slice();
  for &(s, t) in pairs { map[s.into_usize()] = Some(t); }
  map
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interning_is_idempotent() {
    let a = intern("foo");
    let b = intern("foo");
    let c = intern("bar");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.as_str(), "foo");
  }
}
