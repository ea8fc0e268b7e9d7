//! An ordered multiset over the red-black tree.
//!
//! [`Multiset`] inserts through [`Tree::insert_multi`], so equivalent elements
//! accumulate. Each new element lands after the existing equal ones, which
//! keeps every equal run contiguous and in insertion order.

use crate::error;
use crate::{Comparator, Cursor, Iter, Natural, Tree};
use std::fmt;

/// An ordered collection that permits equivalent elements.
///
/// # Example
///
/// ```
/// use redwood::Multiset;
///
/// let mut bag: Multiset<i32> = [1, 2, 2, 3, 3, 3].into_iter().collect();
/// assert_eq!(bag.len(), 6);
/// assert_eq!(bag.count(&3), 3);
///
/// let (first, last) = bag.equal_range(&2);
/// assert_eq!(bag.get(first), Some(&2));
/// assert_eq!(bag.get(last), Some(&3));
///
/// assert_eq!(bag.remove_all(&3), 3);
/// assert_eq!(bag.iter().copied().collect::<Vec<_>>(), vec![1, 2, 2]);
/// ```
pub struct Multiset<T, C = Natural> {
	tree: Tree<T, C>,
}

impl<T> Multiset<T> {
	pub fn new() -> Self {
		Multiset {
			tree: Tree::new(),
		}
	}
}

impl<T, C> Multiset<T, C> {
	/// Creates an empty multiset ordered by `comparator`.
	pub fn with_comparator(comparator: C) -> Self {
		Multiset {
			tree: Tree::with_comparator(comparator),
		}
	}

	pub fn len(&self) -> usize {
		self.tree.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tree.is_empty()
	}

	pub fn max_size(&self) -> usize {
		self.tree.max_size()
	}

	pub fn clear(&mut self) {
		self.tree.clear();
	}

	pub fn swap(&mut self, other: &mut Self) {
		self.tree.swap(&mut other.tree);
	}

	pub fn begin(&self) -> Cursor {
		self.tree.begin()
	}

	pub fn end(&self) -> Cursor {
		self.tree.end()
	}

	pub fn next(&self, cursor: Cursor) -> Cursor {
		self.tree.next(cursor)
	}

	pub fn prev(&self, cursor: Cursor) -> Cursor {
		self.tree.prev(cursor)
	}

	pub fn get(&self, cursor: Cursor) -> Option<&T> {
		self.tree.get(cursor)
	}

	/// Removes exactly the element at `cursor`, leaving its equal neighbours.
	pub fn erase(&mut self, cursor: Cursor) -> error::Result<T> {
		self.tree.erase(cursor)
	}

	pub fn iter(&self) -> Iter<'_, T, C> {
		self.tree.iter()
	}

	/// The underlying tree, for diagnostics.
	pub fn as_tree(&self) -> &Tree<T, C> {
		&self.tree
	}
}

impl<T, C: Comparator<T>> Multiset<T, C> {
	/// Inserts `value` after any equivalent elements.
	pub fn insert(&mut self, value: T) -> Cursor {
		self.tree.insert_multi(value)
	}

	pub fn insert_many<I>(&mut self, values: I) -> Vec<Cursor>
	where
		I: IntoIterator<Item = T>,
	{
		values.into_iter().map(|value| self.tree.insert_multi(value)).collect()
	}

	/// Returns a cursor to the first element equivalent to `value`, or
	/// [`end`](Self::end).
	pub fn find(&self, value: &T) -> Cursor {
		let cursor = self.lower_bound(value);
		match self.tree.get(cursor) {
			Some(found) if self.tree.comparator().compare(found, value).is_eq() => cursor,
			_ => self.end(),
		}
	}

	pub fn contains(&self, value: &T) -> bool {
		!self.find(value).is_end()
	}

	/// Returns a cursor to the first element not less than `value`.
	pub fn lower_bound(&self, value: &T) -> Cursor {
		self.tree.lower_bound(value)
	}

	/// Returns a cursor to the first element greater than `value`.
	pub fn upper_bound(&self, value: &T) -> Cursor {
		self.tree.upper_bound(value)
	}

	/// Returns the half-open cursor range `[lower_bound, upper_bound)` of
	/// elements equivalent to `value`.
	pub fn equal_range(&self, value: &T) -> (Cursor, Cursor) {
		(self.lower_bound(value), self.upper_bound(value))
	}

	/// Counts the elements equivalent to `value`.
	pub fn count(&self, value: &T) -> usize {
		let (mut cursor, last) = self.equal_range(value);
		let mut count = 0;
		while cursor != last {
			count += 1;
			cursor = self.tree.next(cursor);
		}
		count
	}

	/// Removes every element equivalent to `value` and returns how many were
	/// removed.
	pub fn remove_all(&mut self, value: &T) -> usize {
		let mut removed = 0;
		loop {
			let cursor = self.find(value);
			if self.tree.erase(cursor).is_err() {
				break removed;
			}
			removed += 1;
		}
	}

	/// Moves every element of `other` into `self`, keeping collisions.
	/// `other` is empty afterwards.
	pub fn merge(&mut self, other: &mut Self) {
		self.tree.merge_multi(&mut other.tree);
	}
}

impl<T, C: Default> Default for Multiset<T, C> {
	fn default() -> Self {
		Multiset::with_comparator(C::default())
	}
}

impl<T: Clone, C: Clone> Clone for Multiset<T, C> {
	fn clone(&self) -> Self {
		Multiset {
			tree: self.tree.clone(),
		}
	}
}

impl<T: fmt::Debug, C> fmt::Debug for Multiset<T, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.iter()).finish()
	}
}

impl<T: PartialEq, C> PartialEq for Multiset<T, C> {
	fn eq(&self, other: &Self) -> bool {
		self.tree == other.tree
	}
}

impl<T, C: Comparator<T> + Default> FromIterator<T> for Multiset<T, C> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		let mut multiset = Multiset::default();
		multiset.extend(iter);
		multiset
	}
}

impl<T, C: Comparator<T>> Extend<T> for Multiset<T, C> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		for value in iter {
			self.tree.insert_multi(value);
		}
	}
}

impl<'t, T, C> IntoIterator for &'t Multiset<T, C> {
	type Item = &'t T;
	type IntoIter = Iter<'t, T, C>;

	fn into_iter(self) -> Iter<'t, T, C> {
		self.tree.iter()
	}
}

impl<T, C> IntoIterator for Multiset<T, C> {
	type Item = T;
	type IntoIter = crate::IntoIter<T>;

	fn into_iter(self) -> Self::IntoIter {
		self.tree.into_iter()
	}
}
