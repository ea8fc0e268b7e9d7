//! Comparators that define the order of a [`Tree`](crate::Tree).
//!
//! The tree never calls `Ord` directly. Every descent goes through the
//! [`Comparator`] it was built with, which lets the map adapter order
//! `(key, value)` pairs by key alone and lets callers supply a reversed or
//! custom order without wrapping their values.

use std::cmp::Ordering;
use std::fmt;

/// A total order over `T`.
///
/// Implementations must be consistent: `compare(a, b)` and `compare(b, a)`
/// are opposites, and the relation is transitive. The tree's ordering
/// invariant is only as good as the comparator it is given.
pub trait Comparator<T: ?Sized> {
	/// Compares `a` against `b`.
	fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Orders values by their `Ord` implementation. This is the default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparator<T> for Natural {
	#[inline]
	fn compare(&self, a: &T, b: &T) -> Ordering {
		a.cmp(b)
	}
}

/// Orders values by the reverse of their `Ord` implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reverse;

impl<T: Ord + ?Sized> Comparator<T> for Reverse {
	#[inline]
	fn compare(&self, a: &T, b: &T) -> Ordering {
		b.cmp(a)
	}
}

/// Orders `(key, value)` pairs by key only.
///
/// Two pairs with equal keys compare equal regardless of their values, which
/// is what gives [`Map`](crate::map::Map) its one-entry-per-key policy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ByKey;

impl<K: Ord, V> Comparator<(K, V)> for ByKey {
	#[inline]
	fn compare(&self, a: &(K, V), b: &(K, V)) -> Ordering {
		a.0.cmp(&b.0)
	}
}

/// A comparator backed by a closure. Build one with [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnComparator<F>(F);

impl<F> fmt::Debug for FnComparator<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FnComparator").finish_non_exhaustive()
	}
}

impl<T: ?Sized, F> Comparator<T> for FnComparator<F>
where
	F: Fn(&T, &T) -> Ordering,
{
	#[inline]
	fn compare(&self, a: &T, b: &T) -> Ordering {
		(self.0)(a, b)
	}
}

/// Wraps a comparison closure as a [`Comparator`].
///
/// # Example
///
/// ```
/// use redwood::{compare, Tree};
///
/// let mut tree = Tree::with_comparator(compare::from_fn(|a: &i32, b: &i32| {
/// 	a.abs().cmp(&b.abs())
/// }));
/// tree.insert(-3);
/// tree.insert(1);
/// assert!(!tree.insert(3).1);
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, -3]);
/// ```
pub fn from_fn<T: ?Sized, F>(f: F) -> FnComparator<F>
where
	F: Fn(&T, &T) -> Ordering,
{
	FnComparator(f)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn natural_and_reverse_disagree() {
		assert_eq!(Natural.compare(&1, &2), Ordering::Less);
		assert_eq!(Reverse.compare(&1, &2), Ordering::Greater);
		assert_eq!(Reverse.compare(&"a", &"a"), Ordering::Equal);
	}

	#[test]
	fn by_key_ignores_values() {
		assert_eq!(ByKey.compare(&(1, "x"), &(1, "y")), Ordering::Equal);
		assert_eq!(ByKey.compare(&(1, "z"), &(2, "a")), Ordering::Less);
	}

	#[test]
	fn closure_comparator() {
		let by_len = from_fn(|a: &str, b: &str| a.len().cmp(&b.len()));
		assert_eq!(by_len.compare("abc", "de"), Ordering::Greater);
		assert_eq!(by_len.compare("ab", "de"), Ordering::Equal);
	}
}
