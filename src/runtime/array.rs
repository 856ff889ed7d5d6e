//! The mutable-value-semantics array runtime (spec.md §4.6): a copy-on-write
//! array with the lifecycle the code generator targets (`array_init`,
//! `array_drop`, `array_copy`, `array_uniq`, `array_equal`).
//!
//! The reference count is `std::sync::Arc`'s own: `Arc::clone` bumps it with
//! `Ordering::Relaxed` (spec.md: "relaxed for copy"), and `Arc`'s `Drop` impl
//! decrements with `Release` and fences with `Acquire` only once the count
//! reaches zero (spec.md: "acquire/release for drop/uniq") -- exactly the
//! ordering pair the spec calls for, already correct in the standard library
//! rather than re-implemented by hand here.

use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CowArray<T> {
  data: Arc<Vec<T>>,
}

impl<T: Clone> CowArray<T> {
  /// `array_init`: takes ownership of `elems` as a fresh array.
  #[must_use] pub fn array_init(elems: Vec<T>) -> Self { Self { data: Arc::new(elems) } }

  #[must_use] pub fn len(&self) -> usize { self.data.len() }
  #[must_use] pub fn is_empty(&self) -> bool { self.data.is_empty() }
  #[must_use] pub fn get(&self, i: usize) -> Option<&T> { self.data.get(i) }
  #[must_use] pub fn as_slice(&self) -> &[T] { &self.data }

  /// `array_copy`: a value-semantics copy, O(1) until either handle writes.
  #[must_use] pub fn array_copy(&self) -> Self { self.clone() }

  /// `array_uniq`: the mutable view taken before an in-place write. Clones
  /// the backing storage only if another handle is currently sharing it.
  pub fn array_uniq(&mut self) -> &mut Vec<T> { Arc::make_mut(&mut self.data) }
}

impl<T: PartialEq> CowArray<T> {
  /// `array_equal`: structural equality (spec.md §3: arrays compare by
  /// contents, not by the identity of their storage).
  #[must_use] pub fn array_equal(&self, other: &Self) -> bool { *self.data == *other.data }
}

/// `array_drop` is just `Drop`; every `CowArray` releases its share of the
/// backing storage when it goes out of scope, same as any other Rust value.
#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn copy_then_uniq_does_not_mutate_the_original() {
    let a = CowArray::array_init(vec![1, 2, 3]);
    let mut b = a.array_copy();
    b.array_uniq()[0] = 99;
    assert_eq!(a.get(0), Some(&1));
    assert_eq!(b.get(0), Some(&99));
  }

  #[test]
  fn equal_arrays_compare_by_contents_not_identity() {
    let a = CowArray::array_init(vec![1, 2, 3]);
    let b = CowArray::array_init(vec![1, 2, 3]);
    assert!(a.array_equal(&b));
  }

  #[test]
  fn unshared_uniq_mutates_in_place() {
    let mut a = CowArray::array_init(vec![1, 2, 3]);
    a.array_uniq()[1] = 7;
    assert_eq!(a.get(1), Some(&7));
  }
}
