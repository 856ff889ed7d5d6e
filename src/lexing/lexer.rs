//! A plain hand-written scanner over `&str` source text.

use crate::diagnostics::LexError;
use crate::lexing::token::Token;
use crate::symbol::intern;
use crate::types::{Span, Spanned};

pub struct Lexer<'a> {
  src: &'a [u8],
  pos: u32,
}

impl<'a> Lexer<'a> {
  #[must_use] pub fn new(src: &'a str) -> Self { Self { src: src.as_bytes(), pos: 0 } }

  fn peek(&self) -> Option<u8> { self.src.get(self.pos as usize).copied() }
  fn peek2(&self) -> Option<u8> { self.src.get(self.pos as usize + 1).copied() }

  fn bump(&mut self) -> Option<u8> {
    let c = self.peek()?;
    self.pos += 1;
    Some(c)
  }

  fn skip_trivia(&mut self) {
    loop {
      match self.peek() {
        Some(b' ' | b'\t' | b'\r' | b'\n') => { self.pos += 1; }
        Some(b'/') if self.peek2() == Some(b'/') => {
          while !matches!(self.peek(), None | Some(b'\n')) { self.pos += 1; }
        }
        _ => break,
      }
    }
  }

  fn lex_number(&mut self) -> Result<Token, LexError> {
    let start = self.pos;
    while matches!(self.peek(), Some(c) if c.is_ascii_digit()) { self.pos += 1; }
    let mut is_float = false;
    if self.peek() == Some(b'.') && matches!(self.peek2(), Some(c) if c.is_ascii_digit()) {
      is_float = true;
      self.pos += 1;
      while matches!(self.peek(), Some(c) if c.is_ascii_digit()) { self.pos += 1; }
    }
    let text = std::str::from_utf8(&self.src[start as usize..self.pos as usize]).unwrap();
    let span = Span::new(start, self.pos);
    if is_float {
      text.parse::<f64>().map(Token::Float)
        .map_err(|_| LexError::InvalidLiteral(span, text.to_owned()))
    } else {
      text.parse::<i64>().map(Token::Int)
        .map_err(|_| LexError::InvalidLiteral(span, text.to_owned()))
    }
  }

  fn lex_ident(&mut self) -> Token {
    let start = self.pos;
    while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
      self.pos += 1;
    }
    let text = std::str::from_utf8(&self.src[start as usize..self.pos as usize]).unwrap();
    Token::keyword_from_str(text).unwrap_or_else(|| Token::Ident(intern(text)))
  }

  /// Produces the next token, or `Token::Eof` repeatedly once the input is exhausted.
  pub fn next_token(&mut self) -> Result<Spanned<Token>, LexError> {
    self.skip_trivia();
    let start = self.pos;
    let Some(c) = self.peek() else { return Ok(Spanned::new(Span::new(start, start), Token::Eof)) };

    macro_rules! one { ($t:expr) => {{ self.pos += 1; $t }} }
    macro_rules! two { ($t:expr) => {{ self.pos += 2; $t }} }

    let tok = match c {
      b'0'..=b'9' => self.lex_number()?,
      c if c.is_ascii_alphabetic() || c == b'_' => self.lex_ident(),
      b'+' => one!(Token::Plus),
      b'-' if self.peek2() == Some(b'>') => two!(Token::Arrow),
      b'-' => one!(Token::Minus),
      b'*' => one!(Token::Star),
      b'/' => one!(Token::Slash),
      b'=' if self.peek2() == Some(b'=') => two!(Token::EqEq),
      b'=' => one!(Token::Eq),
      b'!' if self.peek2() == Some(b'=') => two!(Token::NotEq),
      b'!' => one!(Token::Bang),
      b'<' if self.peek2() == Some(b'=') => two!(Token::Le),
      b'<' => one!(Token::Lt),
      b'>' if self.peek2() == Some(b'=') => two!(Token::Ge),
      b'>' => one!(Token::Gt),
      b'&' => one!(Token::Amp),
      b'?' => one!(Token::Question),
      b'.' => one!(Token::Dot),
      b',' => one!(Token::Comma),
      b':' => one!(Token::Colon),
      b';' => one!(Token::Semi),
      b'(' => one!(Token::LParen),
      b')' => one!(Token::RParen),
      b'{' => one!(Token::LBrace),
      b'}' => one!(Token::RBrace),
      b'[' => one!(Token::LBracket),
      b']' => one!(Token::RBracket),
      _ => return Err(LexError::InvalidToken(Span::new(start, start + 1))),
    };
    Ok(Spanned::new(Span::new(start, self.pos), tok))
  }
}

/// Lexes a whole source string into a token stream terminated by `Eof`.
/// Stops at the first error (spec.md §7: lex errors halt compilation of
/// that program).
pub fn lex(src: &str) -> Result<Vec<Spanned<Token>>, LexError> {
  let mut lexer = Lexer::new(src);
  let mut out = Vec::new();
  loop {
    let tok = lexer.next_token()?;
    let done = tok.k == Token::Eof;
    out.push(tok);
    if done { break }
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lexes_a_function_declaration() {
    let toks = lex("fun fact(n: Int) -> Int { n }").unwrap();
    let kinds: Vec<_> = toks.iter().map(|t| &t.k).collect();
    assert_eq!(kinds[0], &Token::Fun);
    assert!(kinds.contains(&&Token::Arrow));
    assert_eq!(*kinds.last().unwrap(), &Token::Eof);
  }

  #[test]
  fn lexes_floats_and_comparisons() {
    let toks = lex("2.0 >= 1 // trailing comment\n").unwrap();
    assert_eq!(toks[0].k, Token::Float(2.0));
    assert_eq!(toks[1].k, Token::Ge);
    assert_eq!(toks[2].k, Token::Int(1));
  }

  #[test]
  fn rejects_unknown_characters() {
    assert!(lex("1 @ 2").is_err());
  }
}
