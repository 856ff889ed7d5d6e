//! The small runtime library a compiled program links against (spec.md
//! §4.6): the array lifecycle, the optional intrinsics, and raw allocation.
//!
//! Every symbol a compiled program can call is named here as a plain `fn`
//! plus, in [`abi`], the link-time symbol name the code generator would emit
//! a call to -- the same split `mmcc`'s own runtime story keeps between
//! "what the function does" and "what it's called across the codegen/link
//! boundary".

pub mod array;

use std::alloc::{alloc, dealloc, Layout};
use std::time::Instant;

use once_cell_uptime::uptime_origin;

/// `print_i64`: the `Int` printer (spec.md §4.6, §8 "no-print" flag controls
/// whether the entry result also gets printed this way).
pub fn print_i64(n: i64) { println!("{n}"); }

/// `print_f64`: the `Float` printer. mvs-calculus floats always print with
/// six fraction digits (spec.md §8's worked examples: `16.000000`).
pub fn print_f64(f: f64) { println!("{f:.6}"); }

/// `uptime`: nanoseconds since this process's runtime was initialized.
#[must_use] pub fn uptime_nanoseconds() -> u64 {
  Instant::now().saturating_duration_since(*uptime_origin()).as_nanos() as u64
}

/// `sqrt`: the one floating-point intrinsic spec.md §4.1 names.
#[must_use] pub fn sqrt(x: f64) -> f64 { x.sqrt() }

/// `malloc`/`free`: the raw allocation primitives behind a heap-escaping
/// local array (spec.md §4.3, §4.6). Layout-less by design: the code
/// generator is responsible for freeing with the same `size`/`align` it
/// allocated with, same as the C `malloc`/`free` pair this mirrors.
///
/// # Safety
/// `size` and `align` passed to [`mvs_free`] must match the values used for
/// the corresponding [`mvs_malloc`] call, and `ptr` must not have already
/// been freed.
#[must_use] pub unsafe fn mvs_malloc(size: usize, align: usize) -> *mut u8 {
  if size == 0 { return std::ptr::NonNull::dangling().as_ptr() }
  let layout = Layout::from_size_align(size, align).expect("invalid layout");
  alloc(layout)
}

/// # Safety
/// See [`mvs_malloc`].
pub unsafe fn mvs_free(ptr: *mut u8, size: usize, align: usize) {
  if size == 0 { return }
  let layout = Layout::from_size_align(size, align).expect("invalid layout");
  dealloc(ptr, layout);
}

/// The link-time symbol names the code generator would emit calls to for a
/// native backend (spec.md §1: a native backend is out of scope here, but
/// the ABI surface it would target is still worth naming, the way `mmcc`
/// names VCode-level symbols it never gets around to handing to a linker in
/// this workspace either).
pub mod abi {
  pub const ARRAY_INIT: &str = "mvs_array_init";
  pub const ARRAY_DROP: &str = "mvs_array_drop";
  pub const ARRAY_COPY: &str = "mvs_array_copy";
  pub const ARRAY_UNIQ: &str = "mvs_array_uniq";
  pub const ARRAY_EQUAL: &str = "mvs_array_equal";
  pub const PRINT_I64: &str = "mvs_print_i64";
  pub const PRINT_F64: &str = "mvs_print_f64";
  pub const UPTIME: &str = "mvs_uptime_nanoseconds";
  pub const SQRT: &str = "mvs_sqrt";
  pub const MALLOC: &str = "mvs_malloc";
  pub const FREE: &str = "mvs_free";
}

/// A process-wide fixed origin instant for [`uptime_nanoseconds`], lazily
/// initialized on first use.
mod once_cell_uptime {
  use std::sync::OnceLock;
  use std::time::Instant;

  static ORIGIN: OnceLock<Instant> = OnceLock::new();

  pub(super) fn uptime_origin() -> &'static Instant { ORIGIN.get_or_init(Instant::now) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sqrt_matches_std() {
    assert!((sqrt(9.0) - 3.0).abs() < 1e-9);
  }

  #[test]
  fn uptime_is_monotonic_nondecreasing() {
    let a = uptime_nanoseconds();
    let b = uptime_nanoseconds();
    assert!(b >= a);
  }

  #[test]
  fn malloc_then_free_round_trips() {
    unsafe {
      let ptr = mvs_malloc(64, 8);
      assert!(!ptr.is_null());
      mvs_free(ptr, 64, 8);
    }
  }
}
