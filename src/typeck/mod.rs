//! The bidirectional type checker (spec.md §4.1).
//!
//! Checking is expressed as one function, [`TypeChecker::check_expr`], taking
//! an *expected type* parameter the way `mmcc`'s own lowering passes thread an
//! expected-shape hint through recursive calls -- except here the parameter
//! is a plain `Option<&Type>` argument rather than a field mutated and
//! restored around each call (spec.md §9's design note explicitly calls out
//! the mutated-slot approach as something to avoid).
//!
//! Type errors do not abort checking: each ill-typed subtree is marked
//! [`Type::Error`] and its error recorded in [`Diagnostics`], and checking
//! continues through sibling subtrees (spec.md §7).

pub mod context;
pub mod overlap;
pub mod typed_ast;

use std::rc::Rc;

use crate::diagnostics::{Diagnostics, TypeError};
use crate::symbol::{intern, Symbol};
use crate::types::ast::{BindingDecl, Expr, ExprKind, ParamDecl, Path, Program, Sign, StructDecl};
use crate::types::entity::{OperKind, StructContext};
use crate::types::ty::{Mutability, Prop, StructShape, Type};
use crate::types::{BindingId, FuncId, Span};

use context::TypingContext;
use typed_ast::{TBindingDecl, TExpr, TExprKind, TParamDecl, TPath, TPathKind};

pub struct TypeChecker {
  structs: StructContext,
  diags: Diagnostics,
  next_binding: u32,
  next_func: u32,
}

impl Default for TypeChecker {
  fn default() -> Self {
    Self { structs: StructContext::new(), diags: Diagnostics::new(), next_binding: 0, next_func: 0 }
  }
}

impl TypeChecker {
  #[must_use] pub fn new() -> Self { Self::default() }

  #[must_use] pub fn diagnostics(&self) -> &Diagnostics { &self.diags }
  pub fn into_diagnostics(self) -> Diagnostics { self.diags }
  #[must_use] pub fn structs(&self) -> &StructContext { &self.structs }

  fn alloc_binding(&mut self) -> BindingId {
    let id = BindingId(self.next_binding);
    self.next_binding += 1;
    id
  }

  fn alloc_func(&mut self) -> FuncId {
    let id = FuncId(self.next_func);
    self.next_func += 1;
    id
  }

  fn err(&mut self, e: TypeError) { self.diags.report(e); }

  /// Checks the whole program: every struct declaration, in order, then the
  /// entry expression with no expected type.
  pub fn check_program(&mut self, prog: &Program) -> TExpr {
    for decl in &prog.types { self.check_struct_decl(decl); }
    let ctx = TypingContext::new();
    self.check_expr(&ctx, &prog.entry, None)
  }

  fn check_struct_decl(&mut self, decl: &StructDecl) {
    let mut seen: Vec<Symbol> = Vec::new();
    let mut props = Vec::with_capacity(decl.fields.len());
    for field in &decl.fields {
      if seen.contains(&field.name) {
        self.err(TypeError::DuplicateDeclaration(field.span, field.name.as_str().to_owned()));
        continue;
      }
      seen.push(field.name);
      let ty = self.resolve_sign(&field.signature, field.span);
      props.push(Prop { mutability: field.mutability, name: field.name, ty });
    }
    let shape = Rc::new(StructShape { name: decl.name, props: Rc::from(props) });
    if !self.structs.declare(shape) {
      self.err(TypeError::DuplicateDeclaration(decl.span, decl.name.as_str().to_owned()));
    }
  }

  fn resolve_sign(&mut self, sign: &Sign, span: Span) -> Type {
    match sign {
      Sign::Int => Type::Int,
      Sign::Float => Type::Float,
      Sign::Any => Type::Any,
      Sign::Named(name) => match self.structs.get_struct(*name) {
        Some(shape) => Type::Struct(shape.clone()),
        None => {
          self.err(TypeError::UndefinedType(span, name.as_str().to_owned()));
          Type::Error
        }
      },
      Sign::Array(inner) => Type::array(self.resolve_sign(inner, span)),
      Sign::Func(params, ret) => {
        let params = params.iter().map(|p| self.resolve_sign(p, span)).collect();
        let ret = self.resolve_sign(ret, span);
        Type::Func(params, Rc::new(ret))
      }
      Sign::Inout(inner) => Type::inout(self.resolve_sign(inner, span)),
    }
  }

  // ---------------------------------------------------------------- paths

  fn check_path(&mut self, ctx: &TypingContext, path: &Path) -> TPath {
    match path {
      Path::Name(span, name) => {
        if *name == intern("_") {
          self.err(TypeError::InvalidWildcard(*span));
          return TPath { span: *span, ty: Type::Error, mutability: Mutability::Let, kind: TPathKind::Name(*name) };
        }
        match ctx.get(*name) {
          Some((mutability, ty)) => TPath { span: *span, ty, mutability, kind: TPathKind::Name(*name) },
          None => match self.structs.get(*name) {
            Some(crate::types::entity::Entity::Intrinsic(i)) => {
              let i = *i;
              TPath { span: *span, ty: i.ty(), mutability: Mutability::Let, kind: TPathKind::Intrinsic(i) }
            }
            _ => {
              self.err(TypeError::UndefinedBinding(*span, name.as_str().to_owned()));
              TPath { span: *span, ty: Type::Error, mutability: Mutability::Let, kind: TPathKind::Name(*name) }
            }
          },
        }
      }
      Path::Prop(base, span, field) => {
        let tbase = self.check_path(ctx, base);
        if tbase.ty.has_error() {
          return TPath { span: *span, ty: Type::Error, mutability: Mutability::Let, kind: TPathKind::Prop(Box::new(tbase), *field) };
        }
        match &tbase.ty {
          Type::Struct(shape) => match shape.field(*field) {
            Some(prop) => {
              let ty = prop.ty.clone();
              let mutability = tbase.mutability.meet(prop.mutability);
              TPath { span: *span, ty, mutability, kind: TPathKind::Prop(Box::new(tbase), *field) }
            }
            None => {
              self.err(TypeError::MissingMember(*span, field.as_str().to_owned()));
              TPath { span: *span, ty: Type::Error, mutability: Mutability::Let, kind: TPathKind::Prop(Box::new(tbase), *field) }
            }
          },
          _ => {
            self.err(TypeError::MissingMember(*span, field.as_str().to_owned()));
            TPath { span: *span, ty: Type::Error, mutability: Mutability::Let, kind: TPathKind::Prop(Box::new(tbase), *field) }
          }
        }
      }
      Path::Elem(base, span, index) => {
        let tbase = self.check_path(ctx, base);
        if tbase.ty.has_error() {
          let tidx = self.check_expr(ctx, index, Some(&Type::Int));
          return TPath { span: *span, ty: Type::Error, mutability: Mutability::Let, kind: TPathKind::Elem(Box::new(tbase), Box::new(tidx)) };
        }
        match &tbase.ty {
          Type::Array(elem) => {
            let elem = (**elem).clone();
            let tidx = self.check_expr(ctx, index, Some(&Type::Int));
            let mutability = tbase.mutability;
            TPath { span: *span, ty: elem, mutability, kind: TPathKind::Elem(Box::new(tbase), Box::new(tidx)) }
          }
          _ => {
            self.err(TypeError::NotAnArray(*span));
            let tidx = self.check_expr(ctx, index, Some(&Type::Int));
            TPath { span: *span, ty: Type::Error, mutability: Mutability::Let, kind: TPathKind::Elem(Box::new(tbase), Box::new(tidx)) }
          }
        }
      }
    }
  }

  // ------------------------------------------------------------ expressions

  pub fn check_expr(&mut self, ctx: &TypingContext, e: &Expr, expected: Option<&Type>) -> TExpr {
    let span = e.span;
    match &e.kind {
      ExprKind::Int(n) => TExpr { span, ty: Type::Int, kind: TExprKind::Int(*n) },
      ExprKind::Float(f) => TExpr { span, ty: Type::Float, kind: TExprKind::Float(*f) },

      ExprKind::Array(elems) => self.check_array(ctx, span, elems, expected),
      ExprKind::Struct(name, args) => self.check_struct_literal(ctx, span, *name, args),
      ExprKind::Func(params, ret_sign, body) => self.check_func(ctx, span, params, ret_sign, body),
      ExprKind::Call(callee, args) => self.check_call(ctx, span, callee, args),
      ExprKind::Infix(lhs, op_span, op, rhs) => self.check_infix(ctx, span, lhs, *op_span, *op, rhs),
      ExprKind::Oper(op_span, op) => self.check_oper(span, *op_span, *op, expected),
      ExprKind::Inout(path) => self.check_inout(ctx, span, path),
      ExprKind::Binding(decl, init, body) => self.check_binding(ctx, span, decl, init, body, expected),
      ExprKind::FuncBinding(name_span, name, func, body) =>
        self.check_func_binding(ctx, span, *name_span, *name, func, body, expected),
      ExprKind::Assign(path, rvalue, body) => self.check_assign(ctx, span, path, rvalue, body, expected),
      ExprKind::Cond(c, t, f) => self.check_cond(ctx, span, c, t, f, expected),
      ExprKind::Cast(value, sign) => self.check_cast(ctx, span, value, sign),
      ExprKind::Path(path) => {
        let tpath = self.check_path(ctx, path);
        let ty = tpath.ty.clone();
        TExpr { span, ty, kind: TExprKind::Path(tpath) }
      }
      ExprKind::Error => TExpr::error(span),
    }
  }

  fn check_array(&mut self, ctx: &TypingContext, span: Span, elems: &[Expr], expected: Option<&Type>) -> TExpr {
    let expected_elem = match expected {
      Some(Type::Array(elem)) => Some((**elem).clone()),
      _ => None,
    };
    if elems.is_empty() {
      return match expected_elem {
        Some(elem_ty) => TExpr { span, ty: Type::array(elem_ty), kind: TExprKind::Array(Vec::new()) },
        None => {
          self.err(TypeError::AmbiguousEmptyArray(span));
          TExpr::error(span)
        }
      };
    }
    let mut checked = Vec::with_capacity(elems.len());
    let first = self.check_expr(ctx, &elems[0], expected_elem.as_ref());
    let elem_ty = first.ty.clone();
    checked.push(first);
    for elem in &elems[1..] {
      let t = self.check_expr(ctx, elem, Some(&elem_ty));
      if !t.ty.has_error() && t.ty != elem_ty {
        self.err(TypeError::TypeMismatch(t.span));
      }
      checked.push(t);
    }
    TExpr { span, ty: Type::array(elem_ty), kind: TExprKind::Array(checked) }
  }

  fn check_struct_literal(&mut self, ctx: &TypingContext, span: Span, name: Symbol, args: &[Expr]) -> TExpr {
    let Some(shape) = self.structs.get_struct(name).cloned() else {
      self.err(TypeError::UndefinedType(span, name.as_str().to_owned()));
      for a in args { self.check_expr(ctx, a, None); }
      return TExpr::error(span);
    };
    if args.len() != shape.props.len() {
      self.err(TypeError::InvalidArgCount(span, shape.props.len(), args.len()));
    }
    let mut checked = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
      let expected = shape.props.get(i).map(|p| p.ty.clone());
      checked.push(self.check_expr(ctx, arg, expected.as_ref()));
    }
    TExpr { span, ty: Type::Struct(shape.clone()), kind: TExprKind::Struct(shape, checked) }
  }

  fn check_func(&mut self, ctx: &TypingContext, span: Span, params: &[ParamDecl], ret_sign: &Sign, body: &Expr) -> TExpr {
    let (func_ty, tparams, ret_ty) = self.signature_of(params, ret_sign, span);
    let body_texpr = self.check_func_body(ctx, &tparams, &ret_ty, body);
    let id = self.alloc_func();
    TExpr { span, ty: func_ty, kind: TExprKind::Func(id, tparams.into(), Box::new(body_texpr)) }
  }

  /// Resolves a function literal's signature without checking its body --
  /// used both for plain `Func` literals and to pre-bind a `FuncBinding`'s
  /// own name before its body is checked, so recursive calls resolve.
  fn signature_of(&mut self, params: &[ParamDecl], ret_sign: &Sign, span: Span) -> (Type, Vec<TParamDecl>, Type) {
    let mut seen: Vec<Symbol> = Vec::new();
    let mut tparams = Vec::with_capacity(params.len());
    let mut param_tys = Vec::with_capacity(params.len());
    for p in params {
      if seen.contains(&p.name) {
        self.err(TypeError::DuplicateDeclaration(p.span, p.name.as_str().to_owned()));
      }
      seen.push(p.name);
      let is_inout = matches!(p.signature, Sign::Inout(_));
      let declared_ty = self.resolve_sign(&p.signature, p.span);
      param_tys.push(declared_ty.clone());
      let base_ty = match &declared_ty { Type::Inout(inner) => (**inner).clone(), other => other.clone() };
      tparams.push(TParamDecl { name: p.name, ty: base_ty, is_inout });
    }
    let ret_ty = self.resolve_sign(ret_sign, span);
    let func_ty = Type::Func(param_tys.into(), Rc::new(ret_ty.clone()));
    (func_ty, tparams, ret_ty)
  }

  fn check_func_body(&mut self, ctx: &TypingContext, tparams: &[TParamDecl], ret_ty: &Type, body: &Expr) -> TExpr {
    let mut inner = ctx.downgraded();
    for p in tparams {
      let mutability = if p.is_inout { Mutability::Var } else { Mutability::Let };
      inner = inner.extended(p.name, mutability, p.ty.clone());
    }
    self.check_expr(&inner, body, Some(ret_ty))
  }

  fn check_call(&mut self, ctx: &TypingContext, span: Span, callee: &Expr, args: &[Expr]) -> TExpr {
    if let ExprKind::Oper(op_span, op) = &callee.kind {
      return self.check_oper_call(ctx, span, *op_span, *op, args);
    }
    let tcallee = self.check_expr(ctx, callee, None);
    let Type::Func(params, ret) = tcallee.ty.clone() else {
      if !tcallee.ty.has_error() { self.err(TypeError::NotAFunction(callee.span)); }
      for a in args { self.check_expr(ctx, a, None); }
      return TExpr::error(span);
    };
    if params.len() != args.len() {
      self.err(TypeError::InvalidArgCount(span, params.len(), args.len()));
    }
    let mut targs = Vec::with_capacity(args.len());
    for (i, a) in args.iter().enumerate() {
      let expected = params.get(i).cloned();
      targs.push(self.check_expr(ctx, a, expected.as_ref()));
    }
    self.check_exclusive_access(span, &params, &targs);
    TExpr { span, ty: (*ret).clone(), kind: TExprKind::Call(Box::new(tcallee), targs) }
  }

  /// spec.md §8 invariant 3: for every pair of arguments bound to `Inout`
  /// parameters, their paths must not overlap.
  fn check_exclusive_access(&mut self, span: Span, params: &[Type], targs: &[TExpr]) {
    let mut inout_paths: Vec<&TPath> = Vec::new();
    for (p, a) in params.iter().zip(targs.iter()) {
      if matches!(p, Type::Inout(_)) {
        if let TExprKind::Inout(path) = &a.kind { inout_paths.push(path); }
      }
    }
    if overlap::first_violation(&inout_paths).is_some() {
      self.err(TypeError::ExclusiveAccessViolation(span));
    }
  }

  fn check_oper_call(&mut self, ctx: &TypingContext, span: Span, op_span: Span, op: Symbol, args: &[Expr]) -> TExpr {
    let Some(kind) = OperKind::from_str(op.as_str()) else {
      self.err(TypeError::UndefinedOperator(op_span));
      for a in args { self.check_expr(ctx, a, None); }
      return TExpr::error(span);
    };
    if args.len() != 2 {
      self.err(TypeError::InvalidArgCount(span, 2, args.len()));
      for a in args { self.check_expr(ctx, a, None); }
      return TExpr::error(span);
    }
    let lhs = self.check_expr(ctx, &args[0], None);
    let rhs = self.check_expr(ctx, &args[1], Some(&lhs.ty));
    if lhs.ty.has_error() || rhs.ty.has_error() { return TExpr::error(span); }
    match kind.result_for(&lhs.ty, &rhs.ty) {
      Some(ret) => TExpr { span, ty: ret, kind: TExprKind::Infix(kind, Box::new(lhs), Box::new(rhs)) },
      None => {
        self.err(TypeError::UndefinedOperator(span));
        TExpr::error(span)
      }
    }
  }

  fn check_infix(&mut self, ctx: &TypingContext, span: Span, lhs: &Expr, op_span: Span, op: Symbol, rhs: &Expr) -> TExpr {
    let Some(kind) = OperKind::from_str(op.as_str()) else {
      self.err(TypeError::UndefinedOperator(op_span));
      self.check_expr(ctx, lhs, None);
      self.check_expr(ctx, rhs, None);
      return TExpr::error(span);
    };
    let tlhs = self.check_expr(ctx, lhs, None);
    let trhs = self.check_expr(ctx, rhs, Some(&tlhs.ty));
    if tlhs.ty.has_error() || trhs.ty.has_error() { return TExpr::error(span); }
    match kind.result_for(&tlhs.ty, &trhs.ty) {
      Some(ret) => TExpr { span, ty: ret, kind: TExprKind::Infix(kind, Box::new(tlhs), Box::new(trhs)) },
      None => {
        self.err(TypeError::UndefinedOperator(span));
        TExpr::error(span)
      }
    }
  }

  fn check_oper(&mut self, span: Span, op_span: Span, op: Symbol, expected: Option<&Type>) -> TExpr {
    let Some(kind) = OperKind::from_str(op.as_str()) else {
      self.err(TypeError::UndefinedOperator(op_span));
      return TExpr::error(span);
    };
    match expected {
      Some(func_ty @ Type::Func(params, ret)) => {
        if kind.matches_signature(params, ret) {
          TExpr { span, ty: func_ty.clone(), kind: TExprKind::Oper(kind) }
        } else {
          self.err(TypeError::UndefinedOperator(span));
          TExpr::error(span)
        }
      }
      _ => {
        self.err(TypeError::AmbiguousOperator(span));
        TExpr::error(span)
      }
    }
  }

  fn check_inout(&mut self, ctx: &TypingContext, span: Span, path: &Path) -> TExpr {
    let tpath = self.check_path(ctx, path);
    if tpath.ty.has_error() { return TExpr::error(span); }
    if tpath.mutability != Mutability::Var {
      self.err(TypeError::ImmutableInout(span));
      return TExpr::error(span);
    }
    let ty = Type::inout(tpath.ty.clone());
    TExpr { span, ty, kind: TExprKind::Inout(Box::new(tpath)) }
  }

  fn check_binding(&mut self, ctx: &TypingContext, span: Span, decl: &BindingDecl, init: &Expr, body: &Expr, expected: Option<&Type>) -> TExpr {
    let declared = decl.signature.as_ref().map(|s| self.resolve_sign(s, decl.span));
    let tinit = self.check_expr(ctx, init, declared.as_ref());
    let binding_ty = match &declared {
      Some(ty) => {
        if !tinit.ty.has_error() && !ty.has_error() && tinit.ty != *ty {
          self.err(TypeError::TypeMismatch(init.span));
        }
        ty.clone()
      }
      None => tinit.ty.clone(),
    };
    let id = self.alloc_binding();
    let tdecl = TBindingDecl { id, mutability: decl.mutability, name: decl.name, ty: binding_ty.clone() };
    let inner = ctx.extended(decl.name, decl.mutability, binding_ty);
    let tbody = self.check_expr(&inner, body, expected);
    TExpr { span, ty: tbody.ty.clone(), kind: TExprKind::Binding(tdecl, Box::new(tinit), Box::new(tbody)) }
  }

  fn check_func_binding(&mut self, ctx: &TypingContext, span: Span, _name_span: Span, name: Symbol, func: &Expr, body: &Expr, expected: Option<&Type>) -> TExpr {
    let ExprKind::Func(params, ret_sign, fn_body) = &func.kind else {
      self.err(TypeError::MissingSignatureOrInit(func.span));
      let tbody = self.check_expr(ctx, body, expected);
      return TExpr { span, ty: tbody.ty.clone(), kind: TExprKind::FuncBinding(name, Box::new(TExpr::error(func.span)), Box::new(tbody)) };
    };
    let (func_ty, tparams, ret_ty) = self.signature_of(params, ret_sign, func.span);
    // spec.md §1 Non-goals: "Named functions cannot capture local bindings
    // (anonymous functions can)". Its own body is checked against only the
    // pool of named functions already in scope (plus itself, for
    // recursion) -- every ordinary `let`/`var`/parameter binding from the
    // enclosing scope is dropped, so referencing one is an undefined-binding
    // error rather than a capture.
    let fn_ctx = ctx.named_funcs_only().extended_named_func(name, func_ty.clone());
    let body_texpr = self.check_func_body(&fn_ctx, &tparams, &ret_ty, fn_body);
    let id = self.alloc_func();
    let tfunc = TExpr { span: func.span, ty: func_ty.clone(), kind: TExprKind::Func(id, tparams.into(), Box::new(body_texpr)) };
    // The expression after `in`, however, is ordinary code: it keeps full
    // visibility of every enclosing binding, plus `name` itself.
    let rec_ctx = ctx.extended_named_func(name, func_ty.clone());
    let tbody = self.check_expr(&rec_ctx, body, expected);
    TExpr { span, ty: tbody.ty.clone(), kind: TExprKind::FuncBinding(name, Box::new(tfunc), Box::new(tbody)) }
  }

  fn check_assign(&mut self, ctx: &TypingContext, span: Span, path: &Path, rvalue: &Expr, body: &Expr, expected: Option<&Type>) -> TExpr {
    if let Path::Name(_, name) = path {
      if *name == intern("_") {
        let trvalue = self.check_expr(ctx, rvalue, None);
        let tbody = self.check_expr(ctx, body, expected);
        return TExpr { span, ty: tbody.ty.clone(), kind: TExprKind::AssignWildcard(Box::new(trvalue), Box::new(tbody)) };
      }
    }
    let tpath = self.check_path(ctx, path);
    if !tpath.ty.has_error() && tpath.mutability != Mutability::Var {
      self.err(TypeError::ImmutableLvalue(span));
    }
    let trvalue = self.check_expr(ctx, rvalue, Some(&tpath.ty));
    if !tpath.ty.has_error() && !trvalue.ty.has_error() && tpath.ty != trvalue.ty {
      self.err(TypeError::TypeMismatch(rvalue.span));
    }
    let tbody = self.check_expr(ctx, body, expected);
    TExpr { span, ty: tbody.ty.clone(), kind: TExprKind::Assign(tpath, Box::new(trvalue), Box::new(tbody)) }
  }

  fn check_cond(&mut self, ctx: &TypingContext, span: Span, c: &Expr, t: &Expr, f: &Expr, expected: Option<&Type>) -> TExpr {
    let tc = self.check_expr(ctx, c, Some(&Type::Int));
    if !tc.ty.has_error() && tc.ty != Type::Int {
      self.err(TypeError::TypeMismatch(c.span));
    }
    let tt = self.check_expr(ctx, t, expected);
    let tf = self.check_expr(ctx, f, expected.or(Some(&tt.ty)));
    if !tt.ty.has_error() && !tf.ty.has_error() && tt.ty != tf.ty {
      self.err(TypeError::TypeMismatch(f.span));
    }
    let ty = if tt.ty.has_error() { tf.ty.clone() } else { tt.ty.clone() };
    TExpr { span, ty, kind: TExprKind::Cond(Box::new(tc), Box::new(tt), Box::new(tf)) }
  }

  fn check_cast(&mut self, ctx: &TypingContext, span: Span, value: &Expr, sign: &Sign) -> TExpr {
    let target = self.resolve_sign(sign, span);
    let tvalue = self.check_expr(ctx, value, None);
    if tvalue.ty.has_error() || target.has_error() { return TExpr::error(span); }
    let ok = target == Type::Any || tvalue.ty == Type::Any || tvalue.ty == target;
    if !ok {
      self.err(TypeError::InvalidConversion(span));
      return TExpr::error(span);
    }
    TExpr { span, ty: target.clone(), kind: TExprKind::Cast(Box::new(tvalue), target) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parsing::parse;

  fn check_src(src: &str) -> TypeChecker {
    let prog = parse(src).expect("parses");
    let mut tc = TypeChecker::new();
    tc.check_program(&prog);
    tc
  }

  #[test]
  fn named_function_cannot_capture_an_enclosing_local() {
    let tc = check_src("let n : Int = 5 in fun f() -> Int { n } in f()");
    assert!(tc.diagnostics().has_errors());
    assert!(matches!(tc.diagnostics().errors(), [TypeError::UndefinedBinding(_, name)] if name == "n"));
  }

  #[test]
  fn anonymous_function_can_capture_an_enclosing_local() {
    let tc = check_src("let n : Int = 5 in let f : () -> Int = () -> Int { n } in f()");
    assert!(!tc.diagnostics().has_errors(), "{:?}", tc.diagnostics().errors());
  }

  #[test]
  fn sibling_named_functions_can_still_call_each_other() {
    let tc = check_src("fun helper() -> Int { 1 } in fun main() -> Int { helper() } in main()");
    assert!(!tc.diagnostics().has_errors(), "{:?}", tc.diagnostics().errors());
  }
}
