//! Recursive-descent parser implementing the grammar of spec.md §6.
//!
//! Kept deliberately plain -- no parser-combinator framework -- because
//! spec.md §1 lists "parser combinator plumbing" as out of scope: the
//! engineering investment belongs in the type checker and code generator,
//! not here. Grounded in the token-stream style of
//! `examples/LouisJackman-language-x`'s parser, adapted to a hand-rolled
//! precedence-climbing expression grammar instead of that project's larger
//! surface language.

use std::collections::HashSet;

use crate::diagnostics::ParseError;
use crate::lexing::{lex, Token};
use crate::symbol::{intern, Symbol};
use crate::types::ast::{
  BindingDecl, Expr, ExprKind, FieldDecl, ParamDecl, Path, Program, Sign, StructDecl,
};
use crate::types::ty::Mutability;
use crate::types::{Span, Spanned};

pub struct Parser {
  toks: Vec<Spanned<Token>>,
  pos: usize,
  /// Struct names declared so far, used to disambiguate `NAME(args)` as a
  /// struct literal vs. a function call (see DESIGN.md for why this is
  /// resolved at parse time rather than left to the type checker: spec.md's
  /// abridged grammar gives `call` only one postfix production, and by the
  /// time the entry expression is parsed every struct has already been
  /// declared, per `program ::= (structDecl 'in')* expr`).
  struct_names: HashSet<Symbol>,
}

impl Parser {
  fn peek(&self) -> &Token { &self.toks[self.pos].k }
  fn peek_span(&self) -> Span { self.toks[self.pos].span }

  fn bump(&mut self) -> Token {
    let t = self.toks[self.pos].k.clone();
    if self.pos + 1 < self.toks.len() { self.pos += 1; }
    t
  }

  fn expect(&mut self, t: &Token) -> Result<(), ParseError> {
    if self.peek() == t { self.bump(); Ok(()) }
    else {
      Err(ParseError::MissingToken(self.peek_span(), format!("{t:?}")))
    }
  }

  fn expect_ident(&mut self) -> Result<Symbol, ParseError> {
    match self.bump() {
      Token::Ident(s) => Ok(s),
      other => Err(ParseError::UnexpectedToken(self.peek_span(), other.describe())),
    }
  }

  fn unexpected<T>(&self) -> Result<T, ParseError> {
    Err(ParseError::UnexpectedToken(self.peek_span(), self.peek().describe()))
  }

  // ---- top level -----------------------------------------------------

  pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let toks = lex(src)?;
    let mut p = Parser { toks, pos: 0, struct_names: HashSet::new() };
    let mut types = Vec::new();
    while *p.peek() == Token::Struct {
      types.push(p.parse_struct_decl()?);
      p.expect(&Token::In)?;
    }
    let entry = p.parse_expr()?;
    if *p.peek() != Token::Eof {
      return Err(ParseError::UnexpectedToken(p.peek_span(), p.peek().describe()));
    }
    Ok(Program { types, entry })
  }

  fn parse_struct_decl(&mut self) -> Result<StructDecl, ParseError> {
    let start = self.peek_span();
    self.expect(&Token::Struct)?;
    let name = self.expect_ident()?;
    self.struct_names.insert(name);
    self.expect(&Token::LBrace)?;
    let mut fields = Vec::new();
    while *self.peek() != Token::RBrace {
      fields.push(self.parse_field_decl()?);
      while *self.peek() == Token::Semi { self.bump(); }
    }
    self.expect(&Token::RBrace)?;
    Ok(StructDecl { span: start.to(self.peek_span()), name, fields })
  }

  fn parse_field_decl(&mut self) -> Result<FieldDecl, ParseError> {
    let start = self.peek_span();
    let mutability = self.parse_mutability()?;
    let name = self.expect_ident()?;
    self.expect(&Token::Colon)?;
    let signature = self.parse_sign()?;
    Ok(FieldDecl { span: start.to(self.peek_span()), mutability, name, signature })
  }

  fn parse_mutability(&mut self) -> Result<Mutability, ParseError> {
    match self.bump() {
      Token::Let => Ok(Mutability::Let),
      Token::Var => Ok(Mutability::Var),
      other => Err(ParseError::UnexpectedToken(self.peek_span(), other.describe())),
    }
  }

  // ---- signatures ------------------------------------------------------

  fn parse_sign(&mut self) -> Result<Sign, ParseError> {
    match self.peek().clone() {
      Token::Ident(s) if s == intern("Int") => { self.bump(); Ok(Sign::Int) }
      Token::Ident(s) if s == intern("Float") => { self.bump(); Ok(Sign::Float) }
      Token::Ident(s) if s == intern("Any") => { self.bump(); Ok(Sign::Any) }
      Token::Ident(s) => { self.bump(); Ok(Sign::Named(s)) }
      Token::LBracket => {
        self.bump();
        let inner = self.parse_sign()?;
        self.expect(&Token::RBracket)?;
        Ok(Sign::Array(Box::new(inner)))
      }
      Token::Inout => { self.bump(); Ok(Sign::Inout(Box::new(self.parse_sign()?))) }
      Token::LParen => {
        self.bump();
        let mut params = Vec::new();
        if *self.peek() != Token::RParen {
          loop {
            params.push(self.parse_sign()?);
            if *self.peek() == Token::Comma { self.bump(); } else { break }
          }
        }
        self.expect(&Token::RParen)?;
        self.expect(&Token::Arrow)?;
        let output = self.parse_sign()?;
        Ok(Sign::Func(params, Box::new(output)))
      }
      _ => self.unexpected(),
    }
  }

  // ---- expressions, by precedence --------------------------------------
  //
  // cmp < cast < add < mul < pre, all left-associative (spec.md §6).

  pub fn parse_expr(&mut self) -> Result<Expr, ParseError> { self.parse_cmp() }

  fn parse_cmp(&mut self) -> Result<Expr, ParseError> {
    let mut lhs = self.parse_cast()?;
    loop {
      let op = match self.peek() {
        Token::EqEq => "==", Token::NotEq => "!=",
        Token::Lt => "<", Token::Le => "<=", Token::Gt => ">", Token::Ge => ">=",
        _ => break,
      };
      let span = self.peek_span();
      self.bump();
      let rhs = self.parse_cast()?;
      let full = lhs.span.to(rhs.span);
      lhs = Expr { span: full, kind: ExprKind::Infix(Box::new(lhs), span, intern(op), Box::new(rhs)) };
    }
    Ok(lhs)
  }

  fn parse_cast(&mut self) -> Result<Expr, ParseError> {
    let value = self.parse_add()?;
    if *self.peek() == Token::As {
      self.bump();
      let sign = self.parse_sign()?;
      let span = value.span;
      return Ok(Expr { span, kind: ExprKind::Cast(Box::new(value), sign) });
    }
    Ok(value)
  }

  fn parse_add(&mut self) -> Result<Expr, ParseError> {
    let mut lhs = self.parse_mul()?;
    loop {
      let op = match self.peek() { Token::Plus => "+", Token::Minus => "-", _ => break };
      let span = self.peek_span();
      self.bump();
      let rhs = self.parse_mul()?;
      let full = lhs.span.to(rhs.span);
      lhs = Expr { span: full, kind: ExprKind::Infix(Box::new(lhs), span, intern(op), Box::new(rhs)) };
    }
    Ok(lhs)
  }

  fn parse_mul(&mut self) -> Result<Expr, ParseError> {
    let mut lhs = self.parse_pre()?;
    loop {
      let op = match self.peek() { Token::Star => "*", Token::Slash => "/", _ => break };
      let span = self.peek_span();
      self.bump();
      let rhs = self.parse_pre()?;
      let full = lhs.span.to(rhs.span);
      lhs = Expr { span: full, kind: ExprKind::Infix(Box::new(lhs), span, intern(op), Box::new(rhs)) };
    }
    Ok(lhs)
  }

  fn parse_pre(&mut self) -> Result<Expr, ParseError> {
    if *self.peek() == Token::Amp {
      let start = self.peek_span();
      self.bump();
      let post = self.parse_post()?;
      let path = expr_to_path(post)?;
      let span = start.to(path.span());
      return Ok(Expr { span, kind: ExprKind::Inout(Box::new(path)) });
    }
    self.parse_post()
  }

  fn parse_post(&mut self) -> Result<Expr, ParseError> {
    let mut e = self.parse_primary()?;
    loop {
      match self.peek().clone() {
        Token::LParen => {
          self.bump();
          let mut args = Vec::new();
          if *self.peek() != Token::RParen {
            loop {
              args.push(self.parse_expr()?);
              if *self.peek() == Token::Comma { self.bump(); } else { break }
            }
          }
          let end = self.peek_span();
          self.expect(&Token::RParen)?;
          let span = e.span.to(end);
          e = if let ExprKind::Path(Path::Name(_, name)) = &e.kind {
            if self.struct_names.contains(name) {
              Expr { span, kind: ExprKind::Struct(*name, args) }
            } else {
              Expr { span, kind: ExprKind::Call(Box::new(e), args) }
            }
          } else {
            Expr { span, kind: ExprKind::Call(Box::new(e), args) }
          };
        }
        Token::LBracket => {
          self.bump();
          let index = self.parse_expr()?;
          let end = self.peek_span();
          self.expect(&Token::RBracket)?;
          let span = e.span.to(end);
          let base = expr_to_path(e)?;
          e = Expr { span, kind: ExprKind::Path(Path::Elem(Box::new(base), span, Box::new(index))) };
        }
        Token::Dot => {
          self.bump();
          let name = self.expect_ident()?;
          let span = e.span.to(self.peek_span());
          let base = expr_to_path(e)?;
          e = Expr { span, kind: ExprKind::Path(Path::Prop(Box::new(base), span, name)) };
        }
        Token::Eq => {
          // assignTail ::= '=' expr 'in' expr
          self.bump();
          let lvalue = expr_to_path(e)?;
          let rvalue = self.parse_expr()?;
          self.expect(&Token::In)?;
          let body = self.parse_expr()?;
          let span = lvalue.span().to(body.span);
          return Ok(Expr { span, kind: ExprKind::Assign(lvalue, Box::new(rvalue), Box::new(body)) });
        }
        _ => break,
      }
    }
    Ok(e)
  }

  fn parse_primary(&mut self) -> Result<Expr, ParseError> {
    let start = self.peek_span();
    match self.peek().clone() {
      Token::Int(n) => { self.bump(); Ok(Expr { span: start, kind: ExprKind::Int(n) }) }
      Token::Float(n) => { self.bump(); Ok(Expr { span: start, kind: ExprKind::Float(n) }) }
      Token::Ident(s) => { self.bump(); Ok(Expr { span: start, kind: ExprKind::Path(Path::Name(start, s)) }) }
      Token::Underscore => { self.bump(); Ok(Expr { span: start, kind: ExprKind::Path(Path::Name(start, intern("_"))) }) }
      Token::LBracket => {
        self.bump();
        let mut elems = Vec::new();
        if *self.peek() != Token::RBracket {
          loop {
            elems.push(self.parse_expr()?);
            if *self.peek() == Token::Comma { self.bump(); } else { break }
          }
        }
        let end = self.peek_span();
        self.expect(&Token::RBracket)?;
        Ok(Expr { span: start.to(end), kind: ExprKind::Array(elems) })
      }
      Token::Let | Token::Var => self.parse_binding_expr(),
      Token::Fun => self.parse_func_binding_expr(),
      Token::LParen if self.looks_like_func_literal() => self.parse_func_expr(),
      Token::LParen => {
        self.bump();
        let e = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        Ok(e)
      }
      Token::If => self.parse_cond_expr(),
      Token::Plus | Token::Minus | Token::Star | Token::Slash
      | Token::EqEq | Token::NotEq | Token::Lt | Token::Le | Token::Gt | Token::Ge => {
        let text = match self.bump() {
          Token::Plus => "+", Token::Minus => "-", Token::Star => "*", Token::Slash => "/",
          Token::EqEq => "==", Token::NotEq => "!=", Token::Lt => "<", Token::Le => "<=",
          Token::Gt => ">", Token::Ge => ">=",
          _ => unreachable!(),
        };
        Ok(Expr { span: start, kind: ExprKind::Oper(start, intern(text)) })
      }
      _ => self.unexpected(),
    }
  }

  /// Distinguishes `(params) -> sign { body }` from a parenthesized
  /// expression by scanning ahead for a matching `)` immediately followed
  /// by `->`. The grammar is LL(k) here with unbounded k in general
  /// (arbitrarily long parameter lists), so a full backtracking attempt is
  /// used instead of a fixed lookahead.
  fn looks_like_func_literal(&self) -> bool {
    let mut depth = 0i32;
    let mut i = self.pos;
    loop {
      match self.toks.get(i).map(|t| &t.k) {
        Some(Token::LParen) => depth += 1,
        Some(Token::RParen) => {
          depth -= 1;
          if depth == 0 {
            return matches!(self.toks.get(i + 1).map(|t| &t.k), Some(Token::Arrow));
          }
        }
        Some(Token::Eof) | None => return false,
        _ => {}
      }
      i += 1;
    }
  }

  fn parse_param_decls(&mut self) -> Result<Vec<ParamDecl>, ParseError> {
    self.expect(&Token::LParen)?;
    let mut params = Vec::new();
    if *self.peek() != Token::RParen {
      loop {
        let start = self.peek_span();
        let name = self.expect_ident()?;
        self.expect(&Token::Colon)?;
        let signature = self.parse_sign()?;
        params.push(ParamDecl { span: start.to(self.peek_span()), name, signature });
        if *self.peek() == Token::Comma { self.bump(); } else { break }
      }
    }
    self.expect(&Token::RParen)?;
    Ok(params)
  }

  fn parse_func_expr(&mut self) -> Result<Expr, ParseError> {
    let start = self.peek_span();
    let params = self.parse_param_decls()?;
    self.expect(&Token::Arrow)?;
    let output = self.parse_sign()?;
    self.expect(&Token::LBrace)?;
    let body = self.parse_expr()?;
    let end = self.peek_span();
    self.expect(&Token::RBrace)?;
    Ok(Expr { span: start.to(end), kind: ExprKind::Func(params, output, Box::new(body)) })
  }

  fn parse_binding_expr(&mut self) -> Result<Expr, ParseError> {
    let start = self.peek_span();
    let mutability = self.parse_mutability()?;
    let name = self.expect_ident()?;
    let signature = if *self.peek() == Token::Colon { self.bump(); Some(self.parse_sign()?) } else { None };
    let decl_span = start.to(self.peek_span());
    self.expect(&Token::Eq)?;
    let init = self.parse_expr()?;
    self.expect(&Token::In)?;
    let body = self.parse_expr()?;
    let decl = BindingDecl { span: decl_span, mutability, name, signature };
    let span = start.to(body.span);
    Ok(Expr { span, kind: ExprKind::Binding(decl, Box::new(init), Box::new(body)) })
  }

  fn parse_func_binding_expr(&mut self) -> Result<Expr, ParseError> {
    let start = self.peek_span();
    self.expect(&Token::Fun)?;
    let name = self.expect_ident()?;
    let literal = self.parse_func_expr()?;
    self.expect(&Token::In)?;
    let body = self.parse_expr()?;
    let span = start.to(body.span);
    Ok(Expr { span, kind: ExprKind::FuncBinding(start, name, Box::new(literal), Box::new(body)) })
  }

  fn parse_cond_expr(&mut self) -> Result<Expr, ParseError> {
    let start = self.peek_span();
    self.expect(&Token::If)?;
    let cond = self.parse_expr()?;
    self.expect(&Token::Question)?;
    let succ = self.parse_expr()?;
    self.expect(&Token::Bang)?;
    let fail = self.parse_expr()?;
    let span = start.to(fail.span);
    Ok(Expr { span, kind: ExprKind::Cond(Box::new(cond), Box::new(succ), Box::new(fail)) })
  }
}

/// Converts an already-parsed expression into a [`Path`], for the positions
/// in the grammar (`&path`, assignment lvalues, element/property bases)
/// that require one. Only `Path` expressions convert; everything else is a
/// parse error at the point of use.
fn expr_to_path(e: Expr) -> Result<Path, ParseError> {
  match e.kind {
    ExprKind::Path(p) => Ok(p),
    other => Err(ParseError::UnexpectedToken(e.span, format!("{other:?} is not a path"))),
  }
}

/// Parses a complete program from source text (spec.md §6).
pub fn parse(src: &str) -> Result<Program, ParseError> {
  Parser::parse_program(src)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_factorial() {
    let prog = parse("fun fact(n: Int) -> Int { if n > 1 ? n * fact(n - 1) ! 1 } in fact(6)").unwrap();
    assert!(prog.types.is_empty());
    assert!(matches!(prog.entry.kind, ExprKind::FuncBinding(..)));
  }

  #[test]
  fn parses_struct_and_cow_example() {
    let src = "struct P { var f: Int; var s: Int } in var p = P(4, 2) in var q = p in q.s = 8 in p.s";
    let prog = parse(src).unwrap();
    assert_eq!(prog.types.len(), 1);
    assert_eq!(prog.types[0].name, intern("P"));
  }

  #[test]
  fn parses_inout_and_oper_literal() {
    let prog = parse("let ops: [(Int, Int) -> Int] = [+, -] in ops[0](10, 1)").unwrap();
    assert!(matches!(prog.entry.kind, ExprKind::Binding(..)));
  }

  #[test]
  fn rejects_unclosed_paren() {
    assert!(parse("(1 + 2").is_err());
  }
}
