//! The abstract machine's runtime value representation (spec.md §4.5) and
//! the interpreter that evaluates the typed AST directly against it.
//!
//! spec.md §4.5 describes a metatype/closure-object/existential protocol
//! aimed at a native lowering. This workspace targets a tree-walking
//! evaluator instead of a native backend (spec.md §1: "we describe the
//! abstract machine... rather than any specific backend"), so the four
//! pieces spec.md splits across `build_mir.rs`/`build_vcode.rs`-equivalent
//! lowering passes collapse to two files here: this module (the value
//! types a running program manipulates) and [`interp`] (the evaluator).
//! See `DESIGN.md` for the full accounting of what that consolidation
//! drops relative to a from-scratch native `CG`.

pub mod interp;

use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::array::CowArray;
use crate::typeck::typed_ast::{TExpr, TParamDecl};
use crate::types::entity::{Intrinsic, OperKind};
use crate::types::ty::Type;
use crate::symbol::Symbol;

/// A variable slot: shared and mutated in place, so that a closure's
/// captured environment and the defining scope's bindings are the same
/// storage (spec.md §4.4's "alias avoidance" for `Let` captures, and the
/// ordinary case of an `Inout` write reaching through an arbitrarily deep
/// call stack without threading a mutated environment back up by hand).
pub type Cell = Rc<RefCell<Value>>;

/// The interpreter's environment: name to variable cell. Persistent
/// (`im::HashMap`) so that entering a nested scope is an O(log n) `insert`
/// that leaves every sibling scope's view of the map untouched, mirroring
/// [`crate::typeck::context::TypingContext`]'s use of the same structure for
/// Γ's save/restore discipline.
pub type Env = im::HashMap<Symbol, Cell>;

/// A runtime value. Address-only types (spec.md §3) are represented here by
/// a reference-counted handle (`Rc`/[`CowArray`]) rather than literally "an
/// address into owned storage" -- this workspace's evaluator owns garbage
/// collection by construction (Rust's `Drop`) instead of emitting explicit
/// `drop` calls the way a native `CG` would.
#[derive(Debug, Clone)]
pub enum Value {
  Int(i64),
  Float(f64),
  /// The canonical empty struct's only value.
  Unit,
  /// Fields stored positionally in declaration order (spec.md §4.5
  /// "Structs: laid out as a packed record of their fields").
  Struct(Rc<Vec<Value>>),
  Array(CowArray<Value>),
  Closure(Rc<ClosureVal>),
  /// A first-class operator reference (spec.md §4.4: "a function with no
  /// captures"); kept as a bare tag rather than wrapped in a `ClosureVal`
  /// since it never closes over an environment.
  Oper(OperKind),
  /// A reference to a built-in (spec.md §4.1 "Optional built-ins"), kept as
  /// a bare tag the same way [`Value::Oper`] is: neither closes over an
  /// environment, so neither needs a [`ClosureVal`].
  Intrinsic(Intrinsic),
  /// The existential escape hatch (spec.md §4.5): a value plus the static
  /// type it was cast from, used to check a downcast back out of `Any`.
  Any(Rc<AnyVal>),
}

impl Value {
  #[must_use] pub fn as_int(&self) -> i64 {
    match self { Value::Int(n) => *n, _ => unreachable!("type checker guarantees Int here") }
  }

  #[must_use] pub fn as_float(&self) -> f64 {
    match self { Value::Float(f) => *f, _ => unreachable!("type checker guarantees Float here") }
  }

  /// `Cond`'s condition is `Int`, used as a boolean (spec.md §4.1: "c: Int
  /// (used as Boolean)"); nonzero is true, matching the abstract machine's
  /// `c != 0` branch test (spec.md §4.4's `Cond` lowering row).
  #[must_use] pub fn truthy(&self) -> bool { self.as_int() != 0 }
}

/// A closure object (spec.md §4.5 "Any-closure"): parameters, body, and an
/// environment holding only the captures [`crate::capture`] computed for
/// this function literal, in no particular runtime order (the sorted order
/// spec.md §4.2 requires is a code-generation-layout concern this
/// tree-walking evaluator, which looks captures up by name, has no need
/// for).
#[derive(Debug)]
pub struct ClosureVal {
  /// Identifies the originating function literal (spec.md §4.5 "code
  /// pointer"): two closures are only equal if they share this id, i.e.
  /// both ultimately came from copying the same `Func` node (spec.md §8
  /// invariant 6).
  pub func_id: crate::types::FuncId,
  pub params: Rc<[TParamDecl]>,
  pub body: Rc<TExpr>,
  pub env: Env,
}

/// The boxed value living behind an `Any` (spec.md §4.5 "Existential").
/// `ty` is the witness: the static type the value was cast *from*, checked
/// against the target type on the way back out.
#[derive(Debug, Clone)]
pub struct AnyVal {
  pub ty: Type,
  pub value: Value,
}

/// Structural equality over runtime values (spec.md §4.1 `eq`/`ne`: "on any
/// type"), including the closure-equality rule of spec.md §8 invariant 6:
/// two closures compare equal iff they share a `func_id` (same code) and
/// have element-wise equal environments.
#[must_use] pub fn values_equal(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Int(x), Value::Int(y)) => x == y,
    (Value::Float(x), Value::Float(y)) => x == y,
    (Value::Unit, Value::Unit) => true,
    (Value::Struct(xs), Value::Struct(ys)) =>
      xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| values_equal(x, y)),
    (Value::Array(xs), Value::Array(ys)) =>
      xs.as_slice().len() == ys.as_slice().len()
        && xs.as_slice().iter().zip(ys.as_slice().iter()).all(|(x, y)| values_equal(x, y)),
    (Value::Closure(x), Value::Closure(y)) => closures_equal(x, y),
    (Value::Oper(x), Value::Oper(y)) => x == y,
    (Value::Intrinsic(x), Value::Intrinsic(y)) => x == y,
    (Value::Any(x), Value::Any(y)) => x.ty == y.ty && values_equal(&x.value, &y.value),
    _ => false,
  }
}

fn closures_equal(a: &ClosureVal, b: &ClosureVal) -> bool {
  a.func_id == b.func_id
    && a.env.len() == b.env.len()
    && a.env.iter().all(|(name, cell)| {
      b.env.get(name).is_some_and(|other| values_equal(&cell.borrow(), &other.borrow()))
    })
}
