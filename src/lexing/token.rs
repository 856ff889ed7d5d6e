//! Token kinds (spec.md §6: reserved keywords and operators).

use crate::symbol::Symbol;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
  Int(i64),
  Float(f64),
  Ident(Symbol),

  // Keywords.
  Struct,
  Let,
  Var,
  Fun,
  If,
  In,
  /// Reserved (spec.md §6 lists it among the keywords) but not produced by
  /// any surface-grammar production in §6's abridged grammar -- there is no
  /// loop construct in mvs-calculus today. Kept as a reserved word so a
  /// program cannot accidentally use it as an identifier.
  While,
  Inout,
  As,

  // Operators and punctuation.
  Plus,
  Minus,
  Star,
  Slash,
  EqEq,
  NotEq,
  Lt,
  Le,
  Gt,
  Ge,
  Eq,
  Amp,
  Question,
  Bang,
  Underscore,
  Arrow,
  Dot,
  Comma,
  Colon,
  Semi,
  LParen,
  RParen,
  LBrace,
  RBrace,
  LBracket,
  RBracket,

  Eof,
}

impl Token {
  #[must_use] pub fn keyword_from_str(s: &str) -> Option<Token> {
    Some(match s {
      "struct" => Token::Struct,
      "let" => Token::Let,
      "var" => Token::Var,
      "fun" => Token::Fun,
      "if" => Token::If,
      "in" => Token::In,
      "while" => Token::While,
      "inout" => Token::Inout,
      "as" => Token::As,
      "_" => Token::Underscore,
      _ => return None,
    })
  }

  #[must_use] pub fn describe(&self) -> String {
    match self {
      Token::Int(n) => n.to_string(),
      Token::Float(n) => n.to_string(),
      Token::Ident(s) => s.to_string(),
      Token::Eof => "end of input".into(),
      other => format!("{other:?}"),
    }
  }
}
