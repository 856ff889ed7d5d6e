//! The struct context `Δ` (spec.md §4.1): previously declared structs, plus
//! the built-in `Unit` struct and the optional `uptime`/`sqrt` intrinsics.
//!
//! This is a direct generalization of `mmcc`'s `types::entity` module, which
//! plays the same role for MMC: a table of "things that have already been
//! typechecked and can now be referred to", keyed by interned [`Symbol`],
//! plus a `make_prims!`-style macro for small fixed enumerations of
//! primitives that need a name <-> keyword mapping. Here that macro builds
//! the first-class operator kinds (spec.md §4.1 "Infix / Oper") instead of
//! MMC's much larger `PrimOp` set.

use std::rc::Rc;

use hashbrown::HashMap;

use crate::symbol::{init_dense_symbol_map, intern, Symbol};
use crate::types::ty::{StructShape, Type};

macro_rules! make_prims {
  {$($(#[$attr0:meta])* enum $name:ident {
    $($(#[$attr:meta])* $x:ident: $e:expr,)*
  })*} => {
    $(
      $(#[$attr0])*
      #[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
      pub enum $name { $($(#[$attr])* $x),* }

      impl $name {
        /// All variants paired with their surface-syntax spelling.
        #[must_use] pub fn all() -> &'static [(Self, &'static str)] {
          &[$(($name::$x, $e)),*]
        }

        /// Convert a surface-syntax spelling into this type.
        #[allow(clippy::should_implement_trait)]
        #[must_use] pub fn from_str(s: &str) -> Option<Self> {
          match s { $($e => Some(Self::$x),)* _ => None }
        }

        /// Get the symbol for this primitive's surface spelling.
        #[must_use] pub fn as_symbol(self) -> Symbol {
          use std::sync::OnceLock;
          static INTERNED: OnceLock<Vec<Symbol>> = OnceLock::new();
          let table = INTERNED.get_or_init(|| vec![$(intern($e)),*]);
          table[self as usize]
        }

        /// Resolve an interned symbol back to this primitive, in O(1) after
        /// the first call, via a dense lookup table.
        #[must_use] pub fn from_symbol(s: Symbol) -> Option<Self> {
          let pairs: Vec<_> = Self::all().iter().map(|&(v, e)| (intern(e), v)).collect();
          let map = init_dense_symbol_map(&pairs);
          map.get(s.into_usize()).copied().flatten()
        }
      }
    )*
  }
}

make_prims! {
  /// Equality operators: work on any type, return `Int` (spec.md §4.1).
  enum EqOp {
    Eq: "==",
    Ne: "!=",
  }

  /// Ordered-comparison operators: numeric operands only, return `Int`.
  enum CmpOp {
    Lt: "<",
    Le: "<=",
    Ge: ">=",
    Gt: ">",
  }

  /// Arithmetic operators: numeric operands, return the operand type.
  enum ArithOp {
    Add: "+",
    Sub: "-",
    Mul: "*",
    Div: "/",
  }
}

/// A first-class operator reference (spec.md §3 `Oper(kind)`, §4.1 "Infix / Oper").
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum OperKind {
  Eq(EqOp),
  Cmp(CmpOp),
  Arith(ArithOp),
}

impl OperKind {
  #[must_use] pub fn from_str(s: &str) -> Option<Self> {
    EqOp::from_str(s).map(OperKind::Eq)
      .or_else(|| CmpOp::from_str(s).map(OperKind::Cmp))
      .or_else(|| ArithOp::from_str(s).map(OperKind::Arith))
  }

  #[must_use] pub fn as_str(self) -> &'static str {
    match self {
      OperKind::Eq(op) => EqOp::all()[op as usize].1,
      OperKind::Cmp(op) => CmpOp::all()[op as usize].1,
      OperKind::Arith(op) => ArithOp::all()[op as usize].1,
    }
  }

  #[must_use] fn is_numeric(ty: &Type) -> bool { matches!(ty, Type::Int | Type::Float) }

  /// The result type of applying this operator to two operands of the given
  /// types, or `None` if this operator is undefined for them (spec.md
  /// §4.1: equality works "on any type", ordered comparison and arithmetic
  /// are numeric-only). Both operand types must already agree -- the
  /// caller is expected to have checked the right-hand side against the
  /// left's type as its expected type first.
  #[must_use] pub fn result_for(self, lhs: &Type, rhs: &Type) -> Option<Type> {
    if lhs.has_error() || rhs.has_error() || lhs != rhs { return None }
    match self {
      OperKind::Eq(_) => Some(Type::Int),
      OperKind::Cmp(_) => Self::is_numeric(lhs).then_some(Type::Int),
      OperKind::Arith(_) => Self::is_numeric(lhs).then(|| lhs.clone()),
    }
  }

  /// Whether this operator kind, used as a first-class value (spec.md
  /// §4.1 "Oper"), can satisfy an expected function type `(params) -> ret`.
  /// Equality is polymorphic over any single operand type `T`; comparison
  /// and arithmetic require `T` to be numeric.
  #[must_use] pub fn matches_signature(self, params: &[Type], ret: &Type) -> bool {
    let [t0, t1] = params else { return false };
    if t0 != t1 { return false }
    match self {
      OperKind::Eq(_) => *ret == Type::Int,
      OperKind::Cmp(_) => Self::is_numeric(t0) && *ret == Type::Int,
      OperKind::Arith(_) => Self::is_numeric(t0) && *ret == *t0,
    }
  }
}

/// A built-in function not written in mvs-calculus itself (spec.md §4.1:
/// "Optional built-ins `uptime: () -> Float`, `sqrt: (Float) -> Float`").
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Intrinsic {
  Uptime,
  Sqrt,
}

impl Intrinsic {
  #[must_use] pub fn name(self) -> &'static str {
    match self { Intrinsic::Uptime => "uptime", Intrinsic::Sqrt => "sqrt" }
  }

  #[must_use] pub fn ty(self) -> Type {
    match self {
      Intrinsic::Uptime => Type::func(vec![], Type::Float),
      Intrinsic::Sqrt => Type::func(vec![Type::Float], Type::Float),
    }
  }
}

/// Something that has already been processed and can be referred to by name:
/// a previously declared struct, or a builtin intrinsic. Mirrors `mmcc`'s
/// `Entity` enum, minus the parts of MMC's richer entity set (procedures,
/// type definitions, globals) that have no counterpart here.
#[derive(Debug, Clone)]
pub enum Entity {
  Struct(Rc<StructShape>),
  Intrinsic(Intrinsic),
}

/// The struct context `Δ`: name → struct type, pre-populated with the
/// built-in `Unit` struct and the optional intrinsics (spec.md §4.1).
#[derive(Debug, Clone)]
pub struct StructContext {
  map: HashMap<Symbol, Entity>,
}

impl Default for StructContext {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(intern("Unit"), Entity::Struct(Rc::new(StructShape {
      name: intern("Unit"),
      props: Rc::from(Vec::new()),
    })));
    map.insert(intern(Intrinsic::Uptime.name()), Entity::Intrinsic(Intrinsic::Uptime));
    map.insert(intern(Intrinsic::Sqrt.name()), Entity::Intrinsic(Intrinsic::Sqrt));
    Self { map }
  }
}

impl StructContext {
  #[must_use] pub fn new() -> Self { Self::default() }

  #[must_use] pub fn get(&self, name: Symbol) -> Option<&Entity> { self.map.get(&name) }

  #[must_use] pub fn get_struct(&self, name: Symbol) -> Option<&Rc<StructShape>> {
    match self.map.get(&name) {
      Some(Entity::Struct(s)) => Some(s),
      _ => None,
    }
  }

  /// Registers a newly checked struct declaration. Returns `false` (and
  /// leaves the context unchanged) if the name is already declared --
  /// spec.md §7 "duplicate struct/param/property declaration".
  pub fn declare(&mut self, shape: Rc<StructShape>) -> bool {
    if self.map.contains_key(&shape.name) { return false }
    self.map.insert(shape.name, Entity::Struct(shape));
    true
  }

  #[must_use] pub fn unit(&self) -> Type {
    Type::Struct(self.get_struct(intern("Unit")).expect("Unit is always present").clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn oper_kind_round_trips_through_symbols() {
    for &(op, name) in ArithOp::all() {
      assert_eq!(ArithOp::from_str(name), Some(op));
      assert_eq!(OperKind::Arith(op).as_str(), name);
    }
  }

  #[test]
  fn unit_is_preregistered() {
    let ctx = StructContext::new();
    assert!(ctx.get_struct(intern("Unit")).is_some());
    assert!(matches!(ctx.get(intern("uptime")), Some(Entity::Intrinsic(Intrinsic::Uptime))));
  }

  #[test]
  fn duplicate_struct_declaration_rejected() {
    let mut ctx = StructContext::new();
    let shape = Rc::new(StructShape { name: intern("P"), props: Rc::from(Vec::new()) });
    assert!(ctx.declare(shape.clone()));
    assert!(!ctx.declare(shape));
  }
}
