//! The evaluator: walks a checked [`TExpr`] directly against [`Value`]s.
//!
//! `Inout` arguments are passed copy-in/copy-out: the current value at the
//! path is read before the call, handed to the callee as an ordinary owned
//! value, and the callee's final value for that parameter is written back
//! to the path after the call returns. This is observationally identical to
//! true aliasing only because the type checker's exclusive-access check
//! (spec.md §4.1.1) already forbids two simultaneously-live `Inout`
//! arguments from overlapping -- the same guarantee a native `CG` leans on
//! to uniquify-then-alias a path's address directly (spec.md §4.4) rather
//! than copy it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::capture::Captures;
use crate::codegen::{values_equal, AnyVal, Cell, ClosureVal, Env, Value};
use crate::runtime::array::CowArray;
use crate::symbol::Symbol;
use crate::typeck::typed_ast::{TExpr, TExprKind, TPath, TPathKind};
use crate::types::entity::{Intrinsic, OperKind};
use crate::types::ty::Type;
use crate::runtime;

/// Evaluates a fully checked program (spec.md §2 step 6: "code generator
/// lowers the typed AST"; here, interprets it directly).
#[must_use] pub fn run(entry: &TExpr, captures: &Captures) -> Value {
  eval(entry, &Env::new(), captures)
}

fn eval(e: &TExpr, env: &Env, captures: &Captures) -> Value {
  match &e.kind {
    TExprKind::Int(n) => Value::Int(*n),
    TExprKind::Float(f) => Value::Float(*f),
    TExprKind::Error => unreachable!("code generation never runs over a program with Error nodes"),

    TExprKind::Array(elems) => {
      let vs = elems.iter().map(|el| eval(el, env, captures)).collect();
      Value::Array(CowArray::array_init(vs))
    }

    TExprKind::Struct(shape, args) => {
      if shape.props.is_empty() { return Value::Unit }
      let vs = args.iter().map(|a| eval(a, env, captures)).collect();
      Value::Struct(Rc::new(vs))
    }

    TExprKind::Func(id, params, body) => Value::Closure(Rc::new(make_closure(*id, params, body, env, captures))),

    TExprKind::Oper(op) => Value::Oper(*op),

    TExprKind::Call(callee, args) => eval_call(callee, args, env, captures),

    TExprKind::Infix(op, lhs, rhs) => {
      let l = eval(lhs, env, captures);
      let r = eval(rhs, env, captures);
      apply_oper(*op, l, r)
    }

    TExprKind::Inout(path) => read_path(path, env, captures),

    TExprKind::Binding(decl, init, body) => {
      let v = eval(init, env, captures);
      let inner = env.update(decl.name, Rc::new(RefCell::new(v)));
      eval(body, &inner, captures)
    }

    TExprKind::FuncBinding(name, func, body) => {
      let cell: Cell = Rc::new(RefCell::new(Value::Unit));
      let inner = env.update(*name, cell.clone());
      let func_val = eval(func, &inner, captures);
      *cell.borrow_mut() = func_val;
      eval(body, &inner, captures)
    }

    TExprKind::AssignWildcard(rvalue, body) => {
      eval(rvalue, env, captures);
      eval(body, env, captures)
    }

    TExprKind::Assign(path, rvalue, body) => {
      // spec.md §4.4/§5: the lvalue's location is produced *before* the
      // rvalue is evaluated, not after -- resolve the path first so a
      // side-effecting rvalue (e.g. one that mutates an index variable
      // through `inout`) cannot retarget where the write lands.
      let (root, steps) = resolve_path(path, env, captures);
      let v = eval(rvalue, env, captures);
      write_resolved(&root, &steps, env, v);
      eval(body, env, captures)
    }

    TExprKind::Cond(c, t, f) => {
      if eval(c, env, captures).truthy() { eval(t, env, captures) } else { eval(f, env, captures) }
    }

    TExprKind::Cast(value, target_ty) => eval_cast(value, target_ty, env, captures),

    TExprKind::Path(path) => match &path.kind {
      TPathKind::Intrinsic(i) => Value::Intrinsic(*i),
      _ => read_path(path, env, captures),
    },
  }
}

fn make_closure(id: crate::types::FuncId, params: &Rc<[crate::typeck::typed_ast::TParamDecl]>, body: &TExpr, env: &Env, captures: &Captures) -> ClosureVal {
  let mut captured_env = Env::new();
  for name in captures.of(id) {
    if let Some(cell) = env.get(name) { captured_env.insert(*name, cell.clone()); }
  }
  ClosureVal { func_id: id, params: params.clone(), body: Rc::new(body.clone()), env: captured_env }
}

fn eval_call(callee: &TExpr, args: &[TExpr], env: &Env, captures: &Captures) -> Value {
  match eval(callee, env, captures) {
    Value::Closure(closure) => eval_closure_call(&closure, args, env, captures),
    Value::Oper(op) => {
      let l = eval(&args[0], env, captures);
      let r = eval(&args[1], env, captures);
      apply_oper(op, l, r)
    }
    Value::Intrinsic(i) => eval_intrinsic_call(i, args, env, captures),
    _ => unreachable!("type checker guarantees the callee is a function"),
  }
}

/// Calls into the runtime library directly (spec.md §4.1 "Optional
/// built-ins"; spec.md §4.6 names the underlying `uptime_nanoseconds`/`sqrt`
/// routines this dispatches to).
fn eval_intrinsic_call(i: Intrinsic, args: &[TExpr], env: &Env, captures: &Captures) -> Value {
  match i {
    Intrinsic::Uptime => Value::Float(runtime::uptime_nanoseconds() as f64),
    Intrinsic::Sqrt => {
      let x = eval(&args[0], env, captures).as_float();
      Value::Float(runtime::sqrt(x))
    }
  }
}

fn eval_closure_call(closure: &ClosureVal, args: &[TExpr], caller_env: &Env, captures: &Captures) -> Value {
  let mut call_env = closure.env.clone();
  let mut writebacks: Vec<(&TPath, Symbol)> = Vec::new();
  for (param, arg) in closure.params.iter().zip(args) {
    let value = if param.is_inout {
      let TExprKind::Inout(path) = &arg.kind else { unreachable!("type checker guarantees an Inout argument here") };
      writebacks.push((path, param.name));
      read_path(path, caller_env, captures)
    } else {
      eval(arg, caller_env, captures)
    };
    call_env.insert(param.name, Rc::new(RefCell::new(value)));
  }
  let result = eval(&closure.body, &call_env, captures);
  for (path, name) in writebacks {
    let new_value = call_env.get(&name).expect("just inserted above").borrow().clone();
    write_path(path, caller_env, captures, new_value);
  }
  result
}

fn apply_oper(op: OperKind, lhs: Value, rhs: Value) -> Value {
  use crate::types::entity::{ArithOp, CmpOp, EqOp};
  // Equality is polymorphic over any operand type (spec.md §4.1), so it is
  // resolved before the numeric-only arms below ever see the values.
  if let OperKind::Eq(eq) = op {
    let equal = values_equal(&lhs, &rhs);
    return Value::Int(i64::from(match eq { EqOp::Eq => equal, EqOp::Ne => !equal }));
  }
  match (lhs, rhs) {
    (Value::Int(a), Value::Int(b)) => match op {
      OperKind::Cmp(CmpOp::Lt) => Value::Int(i64::from(a < b)),
      OperKind::Cmp(CmpOp::Le) => Value::Int(i64::from(a <= b)),
      OperKind::Cmp(CmpOp::Ge) => Value::Int(i64::from(a >= b)),
      OperKind::Cmp(CmpOp::Gt) => Value::Int(i64::from(a > b)),
      OperKind::Arith(ArithOp::Add) => Value::Int(a.wrapping_add(b)),
      OperKind::Arith(ArithOp::Sub) => Value::Int(a.wrapping_sub(b)),
      OperKind::Arith(ArithOp::Mul) => Value::Int(a.wrapping_mul(b)),
      OperKind::Arith(ArithOp::Div) => Value::Int(a / b),
      OperKind::Eq(_) => unreachable!("handled above"),
    },
    (Value::Float(a), Value::Float(b)) => match op {
      OperKind::Cmp(CmpOp::Lt) => Value::Int(i64::from(a < b)),
      OperKind::Cmp(CmpOp::Le) => Value::Int(i64::from(a <= b)),
      OperKind::Cmp(CmpOp::Ge) => Value::Int(i64::from(a >= b)),
      OperKind::Cmp(CmpOp::Gt) => Value::Int(i64::from(a > b)),
      OperKind::Arith(ArithOp::Add) => Value::Float(a + b),
      OperKind::Arith(ArithOp::Sub) => Value::Float(a - b),
      OperKind::Arith(ArithOp::Mul) => Value::Float(a * b),
      OperKind::Arith(ArithOp::Div) => Value::Float(a / b),
      OperKind::Eq(_) => unreachable!("handled above"),
    },
    _ => unreachable!("type checker guarantees matching numeric operand types for ordered/arithmetic operators"),
  }
}

/// This workspace's resolution of spec.md §9's open question "the semantics
/// of `Cast` when both sides are `Any` but the witness differs": the
/// downcast panics, the same way every other already-type-checked
/// invariant violation in this evaluator is a logic error rather than a
/// recoverable runtime condition.
fn eval_cast(value: &TExpr, target_ty: &Type, env: &Env, captures: &Captures) -> Value {
  let v = eval(value, env, captures);
  match target_ty {
    Type::Any => Value::Any(Rc::new(AnyVal { ty: value.ty.clone(), value: v })),
    _ => match v {
      Value::Any(any) => {
        assert!(&any.ty == target_ty, "downcast from Any to a mismatched witness type");
        any.value.clone()
      }
      other => other,
    },
  }
}

enum PathStep { Prop(usize), Elem(usize) }

fn resolve_path(p: &TPath, env: &Env, captures: &Captures) -> (Symbol, Vec<PathStep>) {
  match &p.kind {
    TPathKind::Name(name) => (*name, Vec::new()),
    TPathKind::Intrinsic(_) =>
      unreachable!("a bare intrinsic reference is handled directly in eval's Path arm, and can never be the base of a Prop/Elem (its type is never Struct/Array) or the target of an Inout (its mutability is Let)"),
    TPathKind::Prop(base, field) => {
      let (root, mut steps) = resolve_path(base, env, captures);
      steps.push(PathStep::Prop(field_index(&base.ty, *field)));
      (root, steps)
    }
    TPathKind::Elem(base, index) => {
      let (root, mut steps) = resolve_path(base, env, captures);
      let i = eval(index, env, captures).as_int();
      steps.push(PathStep::Elem(i as usize));
      (root, steps)
    }
  }
}

fn field_index(struct_ty: &Type, field: Symbol) -> usize {
  let Type::Struct(shape) = struct_ty else { unreachable!("type checker guarantees a struct base here") };
  shape.props.iter().position(|p| p.name == field).expect("type checker guarantees the field exists")
}

fn read_path(p: &TPath, env: &Env, captures: &Captures) -> Value {
  let (root, steps) = resolve_path(p, env, captures);
  let cell = env.get(&root).expect("type checker guarantees the binding exists");
  let mut v = cell.borrow().clone();
  for step in &steps {
    v = match (step, v) {
      (PathStep::Prop(i), Value::Struct(fields)) => fields[*i].clone(),
      (PathStep::Elem(i), Value::Array(arr)) => arr.get(*i).expect("type checker guarantees the index is in bounds").clone(),
      _ => unreachable!("type checker guarantees the path's shape matches its value"),
    };
  }
  v
}

fn write_path(p: &TPath, env: &Env, captures: &Captures, new_value: Value) {
  let (root, steps) = resolve_path(p, env, captures);
  write_resolved(&root, &steps, env, new_value);
}

/// Installs `new_value` through an already-resolved `(root, steps)` pair,
/// without re-evaluating any index expressions along the way. Used by
/// `Assign` so the lvalue's address is fixed before the rvalue runs.
fn write_resolved(root: &Symbol, steps: &[PathStep], env: &Env, new_value: Value) {
  let cell = env.get(root).expect("type checker guarantees the binding exists");
  let mut guard = cell.borrow_mut();
  apply_steps(&mut guard, steps, new_value);
}

/// Uniquifies (spec.md §4.6) each array storage block on the way down
/// before writing the leaf, via [`CowArray::array_uniq`].
fn apply_steps(v: &mut Value, steps: &[PathStep], new_value: Value) {
  match steps.split_first() {
    None => *v = new_value,
    Some((PathStep::Prop(i), rest)) => match v {
      Value::Struct(fields) => apply_steps(&mut Rc::make_mut(fields)[*i], rest, new_value),
      _ => unreachable!("type checker guarantees a struct base here"),
    },
    Some((PathStep::Elem(i), rest)) => match v {
      Value::Array(arr) => apply_steps(&mut arr.array_uniq()[*i], rest, new_value),
      _ => unreachable!("type checker guarantees an array base here"),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::capture;
  use crate::parsing::parse;
  use crate::typeck::TypeChecker;

  fn run_src(src: &str) -> Value {
    let prog = parse(src).expect("parses");
    let mut tc = TypeChecker::new();
    let texpr = tc.check_program(&prog);
    assert!(!tc.diagnostics().has_errors(), "{:?}", tc.diagnostics().errors());
    let captures = capture::analyze(&texpr);
    run(&texpr, &captures)
  }

  #[test]
  fn arithmetic_evaluates() {
    assert_eq!(run_src("1 + 2 * 3").as_int(), 7);
  }

  #[test]
  fn let_binding_round_trips_the_value() {
    assert_eq!(run_src("let x : Int = 41 in x + 1").as_int(), 42);
  }

  #[test]
  fn cond_branches_on_condition() {
    assert_eq!(run_src("if 0 ? 1 ! 2").as_int(), 2);
    assert_eq!(run_src("if 1 ? 1 ! 2").as_int(), 1);
  }

  #[test]
  fn recursive_function_computes_factorial() {
    let src = "fun fact (n : Int) -> Int { if n <= 1 ? 1 ! n * fact(n - 1) } in fact(5)";
    assert_eq!(run_src(src).as_int(), 120);
  }

  #[test]
  fn closure_captures_outer_binding_by_value() {
    let src = "let n : Int = 10 in let f : (Int) -> Int = (x : Int) -> Int { x + n } in f(5)";
    assert_eq!(run_src(src).as_int(), 15);
  }

  #[test]
  fn inout_argument_mutates_caller_binding() {
    let src = "fun incr (x : inout Int) -> Int { x = x + 1 in x } in \
               var n : Int = 1 in _ = incr(&n) in n";
    assert_eq!(run_src(src).as_int(), 2);
  }

  #[test]
  fn array_copy_then_mutate_preserves_the_original() {
    let src = "let a : [Int] = [1, 2, 3] in var b : [Int] = a in b[0] = 99 in a[0]";
    assert_eq!(run_src(src).as_int(), 1);
  }

  #[test]
  fn closures_copied_from_the_same_binding_compare_equal() {
    let src = "let f : () -> Int = () -> Int { 1 } in let g : () -> Int = f in f == g";
    assert_eq!(run_src(src).as_int(), 1);
  }

  #[test]
  fn closures_from_distinct_literals_compare_unequal() {
    let src = "let f : () -> Int = () -> Int { 1 } in let g : () -> Int = () -> Int { 1 } in f == g";
    assert_eq!(run_src(src).as_int(), 0);
  }

  #[test]
  fn operator_reference_used_as_a_first_class_value() {
    let src = "let ops : [(Int, Int) -> Int] = [+, -] in ops[0](10, 1)";
    assert_eq!(run_src(src).as_int(), 11);
  }

  #[test]
  fn struct_equality_is_structural() {
    let src = "struct P { var f : Int; var s : Int } in P(1, 2) == P(1, 2)";
    assert_eq!(run_src(src).as_int(), 1);
  }

  #[test]
  fn sqrt_builtin_calls_into_the_runtime() {
    assert_eq!(run_src("sqrt(9.0)").as_float(), 3.0);
  }

  #[test]
  fn uptime_builtin_returns_a_nonnegative_float() {
    assert!(run_src("uptime()").as_float() >= 0.0);
  }
}
