//! Thin CLI binary (spec.md §6): parses the single positional-argument
//! form, resolves flags into a [`mvsc::Config`], and calls the library.
//! No pretty-printing engine lives here (spec.md §1 lists diagnostic
//! formatting as an external collaborator) -- just the `L:C: error:
//! <message>` line spec.md §7 specifies.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mvsc::config::{Config, DEFAULT_MAX_STACK_ARRAY_SIZE};
use mvsc::driver::format_value;
use mvsc::Compiler;

/// `<tool> <input.mvs> [-o <output>] [-O] [--benchmark N] [--emit-llvm] [--no-print] [--max-stack-array-size N]`
#[derive(Parser, Debug)]
#[command(name = "mvsc", about = "Compiler for mvs-calculus")]
struct Cli {
  /// Source file to compile.
  input: PathBuf,

  /// Output path. Defaults to `<input>.o`.
  #[arg(short = 'o', long = "output")]
  output: Option<PathBuf>,

  /// Enable alias-avoidance optimizations (spec.md §4.4).
  #[arg(short = 'O')]
  optimize: bool,

  /// Wrap the entry expression in an N-iteration timing loop.
  #[arg(long = "benchmark", value_name = "N")]
  benchmark: Option<u32>,

  /// Dump the abstract machine's text form instead of an object.
  #[arg(long = "emit-llvm")]
  emit_llvm: bool,

  /// Suppress the default print of the entry expression's value.
  #[arg(long = "no-print")]
  no_print: bool,

  /// Stack-allocation budget in bytes for local arrays (spec.md §4.3).
  #[arg(long = "max-stack-array-size", value_name = "N", default_value_t = DEFAULT_MAX_STACK_ARRAY_SIZE)]
  max_stack_array_size: usize,
}

fn main() -> ExitCode {
  #[cfg(feature = "cli-logging")]
  env_logger::init();

  let cli = Cli::parse();
  let config = Config {
    output: cli.output.clone(),
    optimize: cli.optimize,
    benchmark: cli.benchmark,
    emit_llvm: cli.emit_llvm,
    no_print: cli.no_print,
    max_stack_array_size: cli.max_stack_array_size,
  };

  let src = match fs::read_to_string(&cli.input) {
    Ok(s) => s,
    Err(e) => {
      eprintln!("error: could not read {}: {e}", cli.input.display());
      return ExitCode::FAILURE;
    }
  };

  let compiler = Compiler::new(config.clone());
  let checked = match compiler.check(&src) {
    Ok(c) => c,
    Err(e) => {
      for diag in e.render_all(&src) { eprintln!("{diag}"); }
      return ExitCode::FAILURE;
    }
  };

  let output_path = config.output.clone().unwrap_or_else(|| default_output_path(&cli.input));

  if let Some(n) = config.benchmark {
    let (value, elapsed) = compiler.benchmark(&checked, n);
    if !config.no_print {
      println!("{}", format_value(&value));
      println!("{} ns", elapsed.as_nanos());
    }
  } else {
    let value = compiler.run(&checked);
    if !config.no_print { println!("{}", format_value(&value)); }
  }

  let write_result = if config.emit_llvm {
    let text = mvsc::object::render_program(&checked.entry, &checked.escapes);
    fs::write(&output_path, text)
  } else {
    let mut buf = Vec::new();
    if let Err(e) = mvsc::object::write_object(&checked.entry, &checked.escapes, &mut buf) {
      eprintln!("error: could not serialize object: {e}");
      return ExitCode::FAILURE;
    }
    fs::write(&output_path, buf)
  };
  if let Err(e) = write_result {
    eprintln!("error: could not write {}: {e}", output_path.display());
    return ExitCode::FAILURE;
  }

  ExitCode::SUCCESS
}

/// `<input>.o` (spec.md §6 default output), preserving the input's
/// directory and stem and simply appending `.o` to the existing extension,
/// matching the literal reading of spec.md's example rather than replacing it.
fn default_output_path(input: &std::path::Path) -> PathBuf {
  let mut name = input.file_name().map_or_else(|| "a.out".into(), |n| n.to_owned());
  name.push(".o");
  input.with_file_name(name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_output_path_appends_dot_o() {
    let out = default_output_path(std::path::Path::new("prog.mvs"));
    assert_eq!(out, PathBuf::from("prog.mvs.o"));
  }
}
