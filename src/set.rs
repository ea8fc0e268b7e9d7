//! An ordered set over the red-black tree.

use crate::error;
use crate::{Comparator, Cursor, Iter, Natural, Tree};
use std::fmt;

/// An ordered set: at most one element per equivalence class of `C`.
///
/// # Example
///
/// ```
/// use redwood::Set;
///
/// let mut set = Set::new();
/// let outcomes = set.insert_many([3, 1, 3, 2]);
/// assert_eq!(outcomes.iter().filter(|(_, inserted)| *inserted).count(), 3);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
pub struct Set<T, C = Natural> {
	tree: Tree<T, C>,
}

impl<T> Set<T> {
	pub fn new() -> Self {
		Set {
			tree: Tree::new(),
		}
	}
}

impl<T, C> Set<T, C> {
	/// Creates an empty set ordered by `comparator`.
	pub fn with_comparator(comparator: C) -> Self {
		Set {
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

	pub fn first(&self) -> Option<&T> {
		self.tree.first()
	}

	pub fn last(&self) -> Option<&T> {
		self.tree.last()
	}

	/// Removes the element at `cursor`. Fails like [`Tree::erase`].
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

impl<T, C: Comparator<T>> Set<T, C> {
	/// Inserts `value` unless an equivalent element is present.
	pub fn insert(&mut self, value: T) -> (Cursor, bool) {
		self.tree.insert(value)
	}

	/// Inserts every value in order, reporting each outcome.
	pub fn insert_many<I>(&mut self, values: I) -> Vec<(Cursor, bool)>
	where
		I: IntoIterator<Item = T>,
	{
		values.into_iter().map(|value| self.tree.insert(value)).collect()
	}

	pub fn find(&self, value: &T) -> Cursor {
		self.tree.find(value)
	}

	pub fn contains(&self, value: &T) -> bool {
		self.tree.contains(value)
	}

	/// Removes the element equivalent to `value` and returns it.
	pub fn remove(&mut self, value: &T) -> Option<T> {
		self.tree.remove(value)
	}

	/// Moves every element of `other` into `self`; collisions are dropped
	/// and `other` is always empty afterwards.
	pub fn merge(&mut self, other: &mut Self) {
		self.tree.merge(&mut other.tree);
	}
}

impl<T, C: Default> Default for Set<T, C> {
	fn default() -> Self {
		Set::with_comparator(C::default())
	}
}

impl<T: Clone, C: Clone> Clone for Set<T, C> {
	fn clone(&self) -> Self {
		Set {
			tree: self.tree.clone(),
		}
	}
}

impl<T: fmt::Debug, C> fmt::Debug for Set<T, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&self.tree, f)
	}
}

impl<T: PartialEq, C> PartialEq for Set<T, C> {
	fn eq(&self, other: &Self) -> bool {
		self.tree == other.tree
	}
}

impl<T, C: Comparator<T> + Default> FromIterator<T> for Set<T, C> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		Set {
			tree: iter.into_iter().collect(),
		}
	}
}

impl<T, C: Comparator<T>> Extend<T> for Set<T, C> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		self.tree.extend(iter);
	}
}

impl<'t, T, C> IntoIterator for &'t Set<T, C> {
	type Item = &'t T;
	type IntoIter = Iter<'t, T, C>;

	fn into_iter(self) -> Iter<'t, T, C> {
		self.tree.iter()
	}
}

impl<T, C> IntoIterator for Set<T, C> {
	type Item = T;
	type IntoIter = crate::IntoIter<T>;

	fn into_iter(self) -> Self::IntoIter {
		self.tree.into_iter()
	}
}
