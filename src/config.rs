//! Compiler configuration (spec.md §6 "CLI"), threaded through [`crate::driver::Compiler`]
//! as a plain struct rather than a scattered set of function parameters --
//! the same role `mmcc`'s own (larger) `Config`-shaped CLI flags play for
//! its pipeline, just with the handful of knobs spec.md §6 actually names.

use std::path::PathBuf;

/// One-to-one with spec.md §6's flag surface:
/// `<tool> <input.mvs> [-o <output>] [-O] [--benchmark N] [--emit-llvm] [--no-print] [--max-stack-array-size N]`.
#[derive(Debug, Clone)]
pub struct Config {
  /// `-o <output>`: defaults to `<input>.o` when unset (resolved by the caller).
  pub output: Option<PathBuf>,
  /// `-O`: enables the alias-avoidance optimizations of spec.md §4.4. The
  /// tree-walking evaluator this crate ships always takes the
  /// cheapest-correct path (e.g. `Let`-path aliasing) regardless of this
  /// flag, so it is accepted for interface compatibility but does not
  /// change evaluation or emitted output.
  pub optimize: bool,
  /// `--benchmark N`: wrap the entry expression in an N-iteration timing loop.
  pub benchmark: Option<u32>,
  /// `--emit-llvm`: dump the abstract machine's own text form instead of
  /// writing an object (spec.md §1: no specific backend is targeted, so
  /// there is no literal LLVM IR to emit).
  pub emit_llvm: bool,
  /// `--no-print`: suppress the default print of the entry expression's value.
  pub no_print: bool,
  /// `--max-stack-array-size N`: the escape analysis's stack budget, in bytes
  /// (spec.md §4.3's *maxStackArraySize*).
  pub max_stack_array_size: usize,
}

/// spec.md doesn't pin a specific default budget; 4 KiB is a conventional
/// "small, not worth heap bookkeeping" threshold, matching `mmcc`'s own
/// default small-buffer thresholds elsewhere in the pack.
pub const DEFAULT_MAX_STACK_ARRAY_SIZE: usize = 4096;

impl Default for Config {
  fn default() -> Self {
    Self {
      output: None,
      optimize: false,
      benchmark: None,
      emit_llvm: false,
      no_print: false,
      max_stack_array_size: DEFAULT_MAX_STACK_ARRAY_SIZE,
    }
  }
}
