//! Semantic types (spec.md §3 "Semantic types").
//!
//! Types are compared structurally (`#[derive(PartialEq)]`), the same way
//! `mmcc`'s `ty::TyKind` is a plain recursive sum type rather than an
//! interned handle when structural sharing isn't performance-critical.
//! `Struct` carries its own resolved field list rather than just a name, so
//! a `Type` is self-contained and comparable without consulting the struct
//! context `Δ` -- this gives "nominal equality by name + ordered props" for
//! free via the derived `PartialEq` on [`StructShape`].

use std::rc::Rc;

use bitflags::bitflags;

use crate::symbol::Symbol;

/// Mutability qualifier, ordered `Let < Var` (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mutability {
  Let,
  Var,
}

impl Mutability {
  /// The mutability of a path through a field: `min(base.mut, field.mut)`,
  /// i.e. transitive immutability (spec.md §4.1, invariant 2 in §8).
  #[must_use] pub fn meet(self, other: Mutability) -> Mutability { self.min(other) }
}

/// One field of a struct: `(mutability, name, ElemType)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prop {
  pub mutability: Mutability,
  pub name: Symbol,
  pub ty: Type,
}

/// The resolved shape of a declared struct: name plus ordered fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructShape {
  pub name: Symbol,
  pub props: Rc<[Prop]>,
}

impl StructShape {
  #[must_use] pub fn field(&self, name: Symbol) -> Option<&Prop> {
    self.props.iter().find(|p| p.name == name)
  }
}

/// A semantic type (spec.md §3).
///
/// `Inout` only ever appears as a parameter type or at `&path` positions --
/// enforced by the type checker, not by this representation, matching the
/// rest of the pack's preference for "smart enum, dumb invariant checked at
/// the one place it matters" over encoding every invariant in the type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
  Int,
  Float,
  /// Sentinel for ill-typed subtrees (spec.md §3, §7): absorbing in every
  /// type operator so a single error doesn't cascade into unrelated ones.
  Error,
  Struct(Rc<StructShape>),
  Array(Rc<Type>),
  Func(Rc<[Type]>, Rc<Type>),
  Inout(Rc<Type>),
  /// The existential escape hatch used by `Cast` (spec.md §4.1, §4.5): an
  /// inline-or-boxed value plus a witness metatype. Not enumerated among the
  /// "Semantic types" in spec.md §3, but required by the `Cast` rule and the
  /// abstract machine's existential representation, so it is added here
  /// rather than left unrepresentable.
  Any,
}

bitflags! {
  /// Cached classification bits for a [`Type`], computed once per shape
  /// rather than re-walked at every call site.
  #[derive(Clone, Copy, Debug, PartialEq, Eq)]
  pub struct TypeFlags: u8 {
    /// No `Array` and no `Func`, deeply: values may be copied bitwise.
    const TRIVIAL = 1 << 0;
    /// Not `Int`, `Float`, `Inout`, or `Error`: passed/returned by address.
    const ADDRESS_ONLY = 1 << 1;
    /// Contains `Error` somewhere, so should not be reported on further.
    const HAS_ERROR = 1 << 2;
  }
}

impl Type {
  #[must_use] pub fn array(elem: Type) -> Type { Type::Array(Rc::new(elem)) }
  #[must_use] pub fn func(params: Vec<Type>, output: Type) -> Type {
    Type::Func(params.into(), Rc::new(output))
  }
  #[must_use] pub fn inout(base: Type) -> Type { Type::Inout(Rc::new(base)) }

  #[must_use] pub fn flags(&self) -> TypeFlags {
    match self {
      Type::Int | Type::Float | Type::Inout(_) =>
        TypeFlags::TRIVIAL,
      Type::Error => TypeFlags::HAS_ERROR,
      Type::Struct(shape) => {
        let mut f = TypeFlags::ADDRESS_ONLY | TypeFlags::TRIVIAL;
        for p in shape.props.iter() {
          let pf = p.ty.flags();
          if !pf.contains(TypeFlags::TRIVIAL) { f.remove(TypeFlags::TRIVIAL); }
          if pf.contains(TypeFlags::HAS_ERROR) { f.insert(TypeFlags::HAS_ERROR); }
        }
        f
      }
      Type::Array(_) | Type::Func(..) | Type::Any => TypeFlags::ADDRESS_ONLY,
    }
  }

  #[must_use] pub fn is_trivial(&self) -> bool { self.flags().contains(TypeFlags::TRIVIAL) }

  #[must_use] pub fn is_address_only(&self) -> bool { self.flags().contains(TypeFlags::ADDRESS_ONLY) }

  #[must_use] pub fn has_error(&self) -> bool { self.flags().contains(TypeFlags::HAS_ERROR) }

  /// The depth of the type tree; finite by the no-mutual-recursion invariant
  /// (spec.md §3). Used only for sanity-checking in debug builds and tests,
  /// not enforced as a recursion guard (the struct DAG check in the struct
  /// context does that).
  #[must_use] pub fn depth(&self) -> usize {
    match self {
      Type::Int | Type::Float | Type::Error | Type::Any => 1,
      Type::Inout(t) | Type::Array(t) => 1 + t.depth(),
      Type::Struct(s) => 1 + s.props.iter().map(|p| p.ty.depth()).max().unwrap_or(0),
      Type::Func(ps, o) => 1 + ps.iter().map(Type::depth).max().unwrap_or(0).max(o.depth()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::symbol::intern;

  #[test]
  fn trivial_struct_is_trivial() {
    let shape = StructShape {
      name: intern("P"),
      props: Rc::from(vec![
        Prop { mutability: Mutability::Var, name: intern("f"), ty: Type::Int },
        Prop { mutability: Mutability::Var, name: intern("s"), ty: Type::Int },
      ]),
    };
    let ty = Type::Struct(Rc::new(shape));
    assert!(ty.is_trivial());
    assert!(ty.is_address_only());
  }

  #[test]
  fn array_is_not_trivial() {
    let ty = Type::array(Type::Int);
    assert!(!ty.is_trivial());
    assert!(ty.is_address_only());
  }

  #[test]
  fn mutability_meet_is_min() {
    assert_eq!(Mutability::Let.meet(Mutability::Var), Mutability::Let);
    assert_eq!(Mutability::Var.meet(Mutability::Var), Mutability::Var);
  }
}
