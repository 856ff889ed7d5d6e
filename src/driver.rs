//! The compiler pipeline, wired end to end (spec.md §2): lex+parse, type
//! check, capture analysis, escape analysis, then either run the abstract
//! machine interpreter or serialize its object form.
//!
//! This is the library surface `main.rs` calls into, kept separate from the
//! CLI (spec.md §1 "command-line driver" is named as an external
//! collaborator at its *interface*; the pipeline itself is not) the same
//! way `mmcc` is itself a library with no binary of its own, consumed by a
//! separate driver crate elsewhere in the pack.

use std::fmt;

use crate::capture::{self, Captures};
use crate::codegen::interp;
use crate::codegen::Value;
use crate::config::Config;
use crate::diagnostics::{ParseError, TypeError};
use crate::escape::{self, EscapeInfo};
use crate::parsing;
use crate::typeck::typed_ast::TExpr;
use crate::typeck::TypeChecker;
use crate::types::Span;

/// Converts a byte offset into 1-based line/column, for the `L:C: error:`
/// format spec.md §7 specifies (the highlighted source excerpt around it is
/// left to an external diagnostic-formatting collaborator, per spec.md §1).
#[must_use] pub fn line_col(src: &str, pos: u32) -> (u32, u32) {
  let pos = pos as usize;
  let mut line = 1u32;
  let mut col = 1u32;
  for (i, c) in src.char_indices() {
    if i >= pos { break }
    if c == '\n' { line += 1; col = 1; } else { col += 1; }
  }
  (line, col)
}

/// One diagnostic rendered to spec.md §7's user-visible form.
pub struct RenderedDiagnostic {
  pub line: u32,
  pub col: u32,
  pub message: String,
}

impl fmt::Display for RenderedDiagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}: error: {}", self.line, self.col, self.message)
  }
}

#[must_use] pub fn render(src: &str, span: Span, message: impl fmt::Display) -> RenderedDiagnostic {
  let (line, col) = line_col(src, span.start);
  RenderedDiagnostic { line, col, message: message.to_string() }
}

/// Compilation halted before code generation (spec.md §7): either a single
/// parse error, or the full set of accumulated type errors.
pub enum CompileError {
  Parse(ParseError),
  Type(Vec<TypeError>),
}

impl CompileError {
  /// Renders every error this compilation produced to spec.md §7's
  /// `L:C: error: <message>` form, against the original source text.
  #[must_use] pub fn render_all(&self, src: &str) -> Vec<RenderedDiagnostic> {
    match self {
      CompileError::Parse(e) => vec![render(src, parse_error_span(e), e)],
      CompileError::Type(errs) => errs.iter().map(|e| render(src, type_error_span(e), e)).collect(),
    }
  }
}

fn parse_error_span(e: &ParseError) -> Span {
  match e {
    ParseError::UnexpectedToken(s, _) | ParseError::MissingToken(s, _) | ParseError::MissingAnnotation(s) => *s,
    ParseError::Lex(le) => match le {
      crate::diagnostics::LexError::InvalidToken(s) | crate::diagnostics::LexError::InvalidLiteral(s, _) => *s,
    },
  }
}

fn type_error_span(e: &TypeError) -> Span {
  match e {
    TypeError::UndefinedBinding(s, _)
    | TypeError::UndefinedType(s, _)
    | TypeError::InvalidWildcard(s)
    | TypeError::MissingMember(s, _)
    | TypeError::InvalidArgCount(s, _, _)
    | TypeError::NotAFunction(s)
    | TypeError::NotAnArray(s)
    | TypeError::AmbiguousEmptyArray(s)
    | TypeError::ImmutableLvalue(s)
    | TypeError::ImmutableInout(s)
    | TypeError::ExclusiveAccessViolation(s)
    | TypeError::DuplicateDeclaration(s, _)
    | TypeError::UndefinedOperator(s)
    | TypeError::AmbiguousOperator(s)
    | TypeError::InvalidConversion(s)
    | TypeError::MissingSignatureOrInit(s)
    | TypeError::TypeMismatch(s) => *s,
  }
}

/// The output of a successful front-end run: everything the interpreter (or
/// a native `CG`) needs to produce a result, spec.md §2 steps 3-5.
pub struct Checked {
  pub entry: TExpr,
  pub captures: Captures,
  pub escapes: EscapeInfo,
}

/// Drives spec.md §2 steps 1-5: lex, parse, type check, capture analysis,
/// escape analysis. Stops and reports at the first phase that fails, per
/// spec.md §7's phase-by-phase failure semantics.
pub struct Compiler {
  config: Config,
}

impl Compiler {
  #[must_use] pub fn new(config: Config) -> Self { Self { config } }

  #[must_use] pub fn config(&self) -> &Config { &self.config }

  pub fn check(&self, src: &str) -> Result<Checked, CompileError> {
    log::debug!("lexing and parsing");
    let program = parsing::parse(src).map_err(CompileError::Parse)?;

    log::debug!("type checking {} struct declaration(s)", program.types.len());
    let mut tc = TypeChecker::new();
    let entry = tc.check_program(&program);
    let diags = tc.into_diagnostics();
    if diags.has_errors() {
      return Err(CompileError::Type(diags.into_errors()));
    }

    log::debug!("running capture analysis");
    let captures = capture::analyze(&entry);

    log::debug!("running escape analysis (budget={} bytes)", self.config.max_stack_array_size);
    let escapes = escape::analyze(&entry, &captures, self.config.max_stack_array_size);

    Ok(Checked { entry, captures, escapes })
  }

  /// Runs the abstract machine interpreter over an already-checked program
  /// (spec.md §2 step 6, as a tree-walking evaluator -- see `codegen/mod.rs`).
  #[must_use] pub fn run(&self, checked: &Checked) -> Value {
    log::debug!("interpreting entry expression");
    interp::run(&checked.entry, &checked.captures)
  }

  /// Runs the entry expression `iterations` times, as `--benchmark N`
  /// requests (spec.md §6), returning the final value and the total
  /// elapsed time across all iterations.
  #[must_use] pub fn benchmark(&self, checked: &Checked, iterations: u32) -> (Value, std::time::Duration) {
    let start = std::time::Instant::now();
    let mut last = Value::Int(0);
    for _ in 0..iterations.max(1) {
      last = interp::run(&checked.entry, &checked.captures);
    }
    (last, start.elapsed())
  }
}

/// Renders a runtime [`Value`] the way spec.md §8's worked scenarios print
/// results: bare integers, six-fraction-digit floats (spec.md §4.6
/// `print_f64`), and a best-effort structural form for composite values
/// (spec.md names no print primitive for these; only the primitives
/// `print_i64`/`print_f64` are part of the runtime ABI).
#[must_use] pub fn format_value(v: &Value) -> String {
  match v {
    Value::Int(n) => n.to_string(),
    Value::Float(f) => format!("{f:.6}"),
    Value::Unit => "()".to_owned(),
    Value::Struct(fields) => {
      use itertools::Itertools;
      format!("{{{}}}", fields.iter().map(format_value).join(", "))
    }
    Value::Array(arr) => {
      use itertools::Itertools;
      format!("[{}]", arr.as_slice().iter().map(format_value).join(", "))
    }
    Value::Closure(_) => "<closure>".to_owned(),
    Value::Oper(op) => op.as_str().to_owned(),
    Value::Intrinsic(i) => i.name().to_owned(),
    Value::Any(any) => format_value(&any.value),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn line_col_counts_newlines() {
    assert_eq!(line_col("abc\ndef", 5), (2, 2));
    assert_eq!(line_col("abc", 1), (1, 2));
  }

  #[test]
  fn check_reports_accumulated_type_errors() {
    let compiler = Compiler::new(Config::default());
    let err = compiler.check("x + y").unwrap_err();
    match err {
      CompileError::Type(errs) => assert_eq!(errs.len(), 2),
      CompileError::Parse(_) => panic!("expected type errors"),
    }
  }

  #[test]
  fn check_and_run_the_factorial_scenario() {
    let compiler = Compiler::new(Config::default());
    let checked = compiler.check("fun fact(n: Int) -> Int { if n > 1 ? n * fact(n - 1) ! 1 } in fact(6)").unwrap();
    let result = compiler.run(&checked);
    assert_eq!(result.as_int(), 720);
  }

  #[test]
  fn format_value_matches_float_precision() {
    assert_eq!(format_value(&Value::Float(16.0)), "16.000000");
  }
}
