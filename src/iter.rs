//! Cursors and iterators for the [`Tree`] data structure.
//!
//! A [`Cursor`] is the tree's position handle. It is `Copy`, does not borrow
//! the tree, and is dereferenced or moved only *through* the tree that owns
//! it:
//!
//! ```
//! use redwood::Tree;
//!
//! let tree: Tree<i32> = [3, 1, 2].into();
//!
//! let mut cursor = tree.begin();
//! let mut seen = Vec::new();
//! while cursor != tree.end() {
//! 	seen.push(*tree.get(cursor).unwrap());
//! 	cursor = tree.next(cursor);
//! }
//! assert_eq!(seen, vec![1, 2, 3]);
//!
//! // Reverse iteration enters at the end and steps back.
//! let last = tree.prev(tree.end());
//! assert_eq!(tree.get(last), Some(&3));
//! ```
//!
//! Navigation uses parent links only, so neither cursors nor [`Iter`] keep a
//! traversal stack.

use crate::{Link, Natural, NodeIndex, Side, Tree, TreeId};
use std::iter::FusedIterator;

/// Slot index plus the generation the slot had when the cursor was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Handle {
	pub(crate) index: NodeIndex,
	pub(crate) generation: u32,
}

/// A position in a [`Tree`]: either an element or the past-the-end sentinel.
///
/// Two cursors are equal when they come from the same tree and name the same
/// element (or are both the end). A cursor stays valid until its element is
/// erased; it is unaffected by insertions and by erasure of other elements.
/// See [`Tree::erase`] for the one case where a cursor's value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
	pub(crate) tree: TreeId,
	pub(crate) node: Option<Handle>,
}

impl Cursor {
	/// Returns `true` for the past-the-end cursor.
	#[inline]
	pub fn is_end(&self) -> bool {
		self.node.is_none()
	}
}

// ---------------------------------------------------------------------------
// Cursor Navigation
// ---------------------------------------------------------------------------

impl<T, C> Tree<T, C> {
	/// Returns a cursor to the smallest element, or [`end`](Self::end) if the
	/// tree is empty.
	pub fn begin(&self) -> Cursor {
		self.cursor_at(self.root.map(|root| self.extreme(root, Side::Left)))
	}

	/// Returns the past-the-end cursor.
	pub fn end(&self) -> Cursor {
		self.cursor_at(None)
	}

	/// Dereferences a cursor.
	///
	/// Returns `None` for the end cursor, a cursor from another tree, or a
	/// cursor whose element has been erased.
	pub fn get(&self, cursor: Cursor) -> Option<&T> {
		self.resolve(cursor).ok().map(|index| &self.node(index).value)
	}

	/// Mutable access to the element under a cursor.
	///
	/// Not public: changing an element's ordering would break the search
	/// invariant. The map adapter uses it to reach the value half of a pair.
	pub(crate) fn get_mut(&mut self, cursor: Cursor) -> Option<&mut T> {
		let index = self.resolve(cursor).ok()?;
		Some(&mut self.node_mut(index).value)
	}

	/// Returns the cursor to the in-order successor.
	///
	/// The successor of the largest element is [`end`](Self::end), and the
	/// end cursor stays at the end.
	///
	/// # Panics
	///
	/// Panics if the cursor belongs to another tree or its element has been
	/// erased.
	pub fn next(&self, cursor: Cursor) -> Cursor {
		match self.live(cursor) {
			Some(index) => self.cursor_at(self.successor(index)),
			None => self.end(),
		}
	}

	/// Returns the cursor to the in-order predecessor.
	///
	/// The predecessor of [`end`](Self::end) is the largest element, and the
	/// predecessor of the smallest element is the end cursor.
	///
	/// # Panics
	///
	/// Panics if the cursor belongs to another tree or its element has been
	/// erased.
	pub fn prev(&self, cursor: Cursor) -> Cursor {
		match self.live(cursor) {
			Some(index) => self.cursor_at(self.predecessor(index)),
			None => self.cursor_at(self.root.map(|root| self.extreme(root, Side::Right))),
		}
	}

	/// Checks a cursor used for navigation. `None` is the end cursor.
	fn live(&self, cursor: Cursor) -> Option<NodeIndex> {
		assert_eq!(cursor.tree, self.id, "cursor belongs to a different tree");
		cursor.node?;
		match self.resolve(cursor) {
			Ok(index) => Some(index),
			Err(error) => panic!("cannot navigate from cursor: {error}"),
		}
	}

	/// Returns an iterator over the elements in ascending order.
	///
	/// # Example
	///
	/// ```
	/// use redwood::Tree;
	///
	/// let tree: Tree<i32> = (1..=5).collect();
	/// assert_eq!(tree.iter().rev().step_by(2).copied().collect::<Vec<_>>(), vec![5, 3, 1]);
	/// assert_eq!(tree.iter().len(), 5);
	/// ```
	pub fn iter(&self) -> Iter<'_, T, C> {
		Iter {
			tree: self,
			front: self.root.map(|root| self.extreme(root, Side::Left)),
			back: self.root.map(|root| self.extreme(root, Side::Right)),
			remaining: self.len,
		}
	}
}

// ---------------------------------------------------------------------------
// Borrowing Iterator
// ---------------------------------------------------------------------------

/// Ascending iterator over a tree's elements, created by [`Tree::iter`].
pub struct Iter<'t, T, C = Natural> {
	tree: &'t Tree<T, C>,
	front: Link,
	back: Link,
	/// Guards against the two ends crossing.
	remaining: usize,
}

impl<'t, T, C> Clone for Iter<'t, T, C> {
	fn clone(&self) -> Self {
		Iter {
			tree: self.tree,
			front: self.front,
			back: self.back,
			remaining: self.remaining,
		}
	}
}

impl<'t, T, C> Iterator for Iter<'t, T, C> {
	type Item = &'t T;

	fn next(&mut self) -> Option<&'t T> {
		if self.remaining == 0 {
			return None;
		}
		let tree = self.tree;
		let index = self.front?;
		self.remaining -= 1;
		self.front = tree.successor(index);
		Some(&tree.node(index).value)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<'t, T, C> DoubleEndedIterator for Iter<'t, T, C> {
	fn next_back(&mut self) -> Option<&'t T> {
		if self.remaining == 0 {
			return None;
		}
		let tree = self.tree;
		let index = self.back?;
		self.remaining -= 1;
		self.back = tree.predecessor(index);
		Some(&tree.node(index).value)
	}
}

impl<'t, T, C> ExactSizeIterator for Iter<'t, T, C> {}

impl<'t, T, C> FusedIterator for Iter<'t, T, C> {}

impl<'t, T, C> IntoIterator for &'t Tree<T, C> {
	type Item = &'t T;
	type IntoIter = Iter<'t, T, C>;

	fn into_iter(self) -> Iter<'t, T, C> {
		self.iter()
	}
}

// ---------------------------------------------------------------------------
// Owning Iterator
// ---------------------------------------------------------------------------

/// Owning ascending iterator, created by [`Tree::drain`] or by consuming a
/// tree with `into_iter`.
#[derive(Debug)]
pub struct IntoIter<T> {
	values: std::vec::IntoIter<T>,
}

impl<T> IntoIter<T> {
	pub(crate) fn new(values: Vec<T>) -> IntoIter<T> {
		IntoIter {
			values: values.into_iter(),
		}
	}
}

impl<T> Iterator for IntoIter<T> {
	type Item = T;

	#[inline]
	fn next(&mut self) -> Option<T> {
		self.values.next()
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.values.size_hint()
	}
}

impl<T> DoubleEndedIterator for IntoIter<T> {
	#[inline]
	fn next_back(&mut self) -> Option<T> {
		self.values.next_back()
	}
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T, C> IntoIterator for Tree<T, C> {
	type Item = T;
	type IntoIter = IntoIter<T>;

	fn into_iter(mut self) -> IntoIter<T> {
		self.drain()
	}
}
