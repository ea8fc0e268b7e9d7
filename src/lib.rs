//! # Redwood: An Arena-Backed Red-Black Tree
//!
//! This crate provides an ordered container built on a red-black tree, together
//! with a bidirectional cursor protocol that walks the tree in sorted order
//! using parent links instead of a traversal stack.
//!
//! ## Design Overview
//!
//! **Index Arena**: Nodes live in a `Vec` of slots owned by the tree. Child and
//! parent links are slot indices, so the tree has a single owner for every node
//! and the parent back-links never take part in freeing memory. Vacant slots are
//! kept on a free list and reused by later insertions.
//!
//! **Generations**: Every slot carries a generation counter that is bumped when
//! the slot is vacated. A [`Cursor`] records the slot index *and* the generation
//! it saw, so a cursor to an erased element is detected instead of silently
//! aliasing whatever is inserted into the slot next.
//!
//! **Red-Black Balancing**: Insertion and erasure restore the colour invariants
//! with the classic recolour-and-rotate fixups. Rotations are the only
//! operation that changes the shape of the tree.
//!
//! ```text
//!                  slots: Vec<Slot<T>>
//!   ┌──────────────┬──────────────┬──────────────┬──────────────┐
//!   │ 0: gen 0     │ 1: gen 2     │ 2: gen 0     │ 3: gen 1     │
//!   │ 20 (Black)   │   vacant     │ 10 (Red)     │ 30 (Red)     │
//!   │ l:2 r:3 p:-  │              │ l:- r:- p:0  │ l:- r:- p:0  │
//!   └──────────────┴──────────────┴──────────────┴──────────────┘
//!   root: Some(0)          free: [1]                len: 3
//! ```
//!
//! ## Cursor Stability
//!
//! Nodes are never moved between slots; they are only re-linked. A cursor to an
//! element therefore survives any number of insertions and any erasure of a
//! *different* element. There is one subtlety: erasing an element with two
//! children physically removes its in-order successor and moves the successor's
//! value into the erased position. A cursor to the erased position then yields
//! the successor's value, and a cursor to the successor becomes stale.
//!
//! ## Basic Usage
//!
//! ```
//! use redwood::Tree;
//!
//! let mut tree = Tree::new();
//! for value in [20, 10, 30, 5, 15, 25, 35] {
//! 	tree.insert(value);
//! }
//!
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![5, 10, 15, 20, 25, 30, 35]);
//! assert!(tree.is_balanced());
//!
//! // Cursors are plain handles: they do not borrow the tree.
//! let five = tree.find(&5);
//! tree.erase(tree.find(&20)).unwrap();
//! assert_eq!(tree.get(five), Some(&5));
//! assert_eq!(tree.get(tree.next(five)), Some(&10));
//! ```
//!
//! ## Adapters
//!
//! [`Map`], [`Set`] and [`Multiset`] configure the tree with a comparator and a
//! duplicate policy and otherwise forward to it.

use log::{debug, trace};
use smallvec::{smallvec, SmallVec};

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::sync::atomic::{self, AtomicU64};

#[cfg(any(test, feature = "test-utils"))]
pub mod alloc;
pub mod compare;
pub mod error;
pub mod iter;
pub mod map;
pub mod multiset;
pub mod set;

pub use compare::{ByKey, Comparator, Natural, Reverse};
pub use error::Error;
pub use iter::{Cursor, IntoIter, Iter};
pub use map::Map;
pub use multiset::Multiset;
pub use set::Set;

use iter::Handle;

// ---------------------------------------------------------------------------
// Configuration Constants
// ---------------------------------------------------------------------------

/// Largest number of elements a single tree can hold. Slot indices are `u32`.
const MAX_ELEMENTS: usize = u32::MAX as usize;

/// Inline capacity of the explicit stacks used by the diagnostic walks.
/// A red-black tree of height 64 holds at least 2^32 - 1 elements.
const WALK_STACK: usize = 64;

/// Source of process-unique tree identities.
static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

// ---------------------------------------------------------------------------
// Internal Helper Types
// ---------------------------------------------------------------------------

/// Index of a slot in the arena.
pub(crate) type NodeIndex = u32;

/// An optional child or parent link.
pub(crate) type Link = Option<NodeIndex>;

/// Identity of a tree object, carried by every cursor it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TreeId(u64);

impl TreeId {
	fn next() -> TreeId {
		TreeId(NEXT_TREE_ID.fetch_add(1, atomic::Ordering::Relaxed))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
	Red,
	Black,
}

/// Which child link of a node is meant.
///
/// The fixup routines are written once in terms of a side and its opposite,
/// which covers both mirror images of every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
	Left,
	Right,
}

impl Side {
	#[inline]
	pub(crate) fn opposite(self) -> Side {
		match self {
			Side::Left => Side::Right,
			Side::Right => Side::Left,
		}
	}
}

/// Duplicate handling during insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
	/// An equivalent element stops the descent and the insertion is rejected.
	Unique,
	/// Equivalent elements are routed right, after every existing equal element.
	Multi,
}

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
	pub(crate) value: T,
	pub(crate) color: Color,
	pub(crate) parent: Link,
	pub(crate) left: Link,
	pub(crate) right: Link,
}

impl<T> Node<T> {
	/// A fresh node is always Red, which never changes any black height.
	fn new(value: T, parent: Link) -> Node<T> {
		Node {
			value,
			color: Color::Red,
			parent,
			left: None,
			right: None,
		}
	}

	#[inline]
	pub(crate) fn child(&self, side: Side) -> Link {
		match side {
			Side::Left => self.left,
			Side::Right => self.right,
		}
	}

	#[inline]
	fn child_mut(&mut self, side: Side) -> &mut Link {
		match side {
			Side::Left => &mut self.left,
			Side::Right => &mut self.right,
		}
	}
}

/// One arena slot. `node` is `None` while the slot sits on the free list.
#[derive(Debug, Clone)]
pub(crate) struct Slot<T> {
	pub(crate) generation: u32,
	pub(crate) node: Option<Node<T>>,
}

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An ordered container backed by a red-black tree.
///
/// # Type Parameters
///
/// - `T`: The element type.
/// - `C`: The [`Comparator`] defining the order. Defaults to [`Natural`],
///   which uses `T: Ord`.
///
/// # Invariants
///
/// After every public operation returns:
///
/// 1. The tree is a binary search tree under `C`.
/// 2. The root, if any, is Black.
/// 3. No Red node has a Red child.
/// 4. Every path from a node down to an absent child crosses the same number
///    of Black nodes.
/// 5. Every node's `parent` link names the node that links to it as a child.
/// 6. `len` equals the number of nodes reachable from the root.
///
/// Invariants 2 to 4 bound the height by `2 * log2(len + 1)`, so lookup,
/// insertion and erasure each take `O(log n)` comparisons and link updates.
pub struct Tree<T, C = Natural> {
	/// Identity handed to cursors; swapped along with the contents.
	id: TreeId,
	/// The node arena.
	slots: Vec<Slot<T>>,
	/// Indices of vacant slots, reused most-recently-freed first.
	free: Vec<NodeIndex>,
	root: Link,
	len: usize,
	comparator: C,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<T> Tree<T> {
	/// Creates an empty tree ordered by `T`'s `Ord` implementation.
	///
	/// No memory is allocated until the first insertion.
	///
	/// # Example
	///
	/// ```
	/// use redwood::Tree;
	///
	/// let tree: Tree<i32> = Tree::new();
	/// assert!(tree.is_empty());
	/// assert_eq!(tree.begin(), tree.end());
	/// ```
	pub fn new() -> Self {
		Tree::with_comparator(Natural)
	}

	/// Creates an empty tree with room for `capacity` elements before the
	/// arena has to grow.
	pub fn with_capacity(capacity: usize) -> Self {
		Tree::with_capacity_and_comparator(capacity, Natural)
	}
}

impl<T, C> Tree<T, C> {
	/// Creates an empty tree ordered by `comparator`.
	///
	/// # Example
	///
	/// ```
	/// use redwood::{Reverse, Tree};
	///
	/// let tree: Tree<i32, Reverse> = [1, 3, 2].into_iter().collect();
	/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
	///
	/// let mut tree = Tree::with_comparator(Reverse);
	/// tree.insert("a");
	/// tree.insert("b");
	/// assert_eq!(tree.first(), Some(&"b"));
	/// ```
	pub fn with_comparator(comparator: C) -> Self {
		Tree::with_capacity_and_comparator(0, comparator)
	}

	/// Creates an empty tree ordered by `comparator`, with room for
	/// `capacity` elements.
	pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
		Tree {
			id: TreeId::next(),
			slots: Vec::with_capacity(capacity),
			free: Vec::new(),
			root: None,
			len: 0,
			comparator,
		}
	}

	// -----------------------------------------------------------------------
	// Size Operations
	// -----------------------------------------------------------------------

	/// Returns the number of elements. This is an O(1) counter.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if the tree holds no elements.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the largest number of elements a tree can hold.
	pub fn max_size(&self) -> usize {
		MAX_ELEMENTS
	}

	/// Returns the comparator the tree was built with.
	pub fn comparator(&self) -> &C {
		&self.comparator
	}

	/// Returns a reference to the smallest element.
	pub fn first(&self) -> Option<&T> {
		self.root.map(|root| &self.node(self.extreme(root, Side::Left)).value)
	}

	/// Returns a reference to the largest element.
	pub fn last(&self) -> Option<&T> {
		self.root.map(|root| &self.node(self.extreme(root, Side::Right)).value)
	}

	// -----------------------------------------------------------------------
	// Probe-Driven Lookup
	// -----------------------------------------------------------------------

	/// Finds an element using a probe instead of a full value.
	///
	/// `probe` receives an element and returns how that element orders
	/// relative to the target, following the convention of
	/// [`slice::binary_search_by`]. The probe must be consistent with the
	/// tree's comparator. Returns [`end`](Self::end) when nothing matches.
	///
	/// # Example
	///
	/// ```
	/// use redwood::{ByKey, Tree};
	///
	/// let mut tree = Tree::with_comparator(ByKey);
	/// tree.insert((2, "two"));
	/// tree.insert((1, "one"));
	///
	/// let cursor = tree.find_by(|(key, _)| key.cmp(&2));
	/// assert_eq!(tree.get(cursor), Some(&(2, "two")));
	/// ```
	pub fn find_by<F>(&self, mut probe: F) -> Cursor
	where
		F: FnMut(&T) -> Ordering,
	{
		let mut current = self.root;
		while let Some(index) = current {
			let node = self.node(index);
			current = match probe(&node.value) {
				Ordering::Less => node.right,
				Ordering::Greater => node.left,
				Ordering::Equal => return self.cursor_at(Some(index)),
			};
		}
		self.end()
	}

	/// Returns a cursor to the first element for which `probe` does not
	/// return `Less`, or [`end`](Self::end).
	pub fn lower_bound_by<F>(&self, mut probe: F) -> Cursor
	where
		F: FnMut(&T) -> Ordering,
	{
		let mut candidate = None;
		let mut current = self.root;
		while let Some(index) = current {
			let node = self.node(index);
			if probe(&node.value) == Ordering::Less {
				current = node.right;
			} else {
				candidate = Some(index);
				current = node.left;
			}
		}
		self.cursor_at(candidate)
	}

	/// Returns a cursor to the first element for which `probe` returns
	/// `Greater`, or [`end`](Self::end).
	pub fn upper_bound_by<F>(&self, mut probe: F) -> Cursor
	where
		F: FnMut(&T) -> Ordering,
	{
		let mut candidate = None;
		let mut current = self.root;
		while let Some(index) = current {
			let node = self.node(index);
			if probe(&node.value) == Ordering::Greater {
				candidate = Some(index);
				current = node.left;
			} else {
				current = node.right;
			}
		}
		self.cursor_at(candidate)
	}

	// -----------------------------------------------------------------------
	// Erasure
	// -----------------------------------------------------------------------

	/// Removes the element at `position` and returns it.
	///
	/// When the element has two children, its in-order successor is the node
	/// that is physically unlinked: the successor's value moves into
	/// `position`'s node and the successor's slot is freed. Afterwards
	/// `position` dereferences to the successor's value and any cursor to the
	/// successor is stale. Cursors to every other element stay valid.
	///
	/// # Errors
	///
	/// The cursor is checked before anything is touched:
	///
	/// - [`Error::ForeignCursor`] if it was produced by another tree
	/// - [`Error::EndCursor`] if it is the past-the-end cursor
	/// - [`Error::StaleCursor`] if its element was already erased
	///
	/// # Example
	///
	/// ```
	/// use redwood::{Error, Tree};
	///
	/// let mut tree: Tree<i32> = (1..=5).collect();
	/// let one = tree.find(&1);
	///
	/// assert_eq!(tree.erase(tree.find(&3)), Ok(3));
	/// assert_eq!(tree.get(one), Some(&1));
	/// assert_eq!(tree.get(tree.next(tree.next(one))), Some(&4));
	///
	/// assert_eq!(tree.erase(tree.end()), Err(Error::EndCursor));
	/// ```
	pub fn erase(&mut self, position: Cursor) -> error::Result<T> {
		let target = self.resolve(position)?;

		// Reduce to a node with at most one child.
		let spliced = match (self.node(target).left, self.node(target).right) {
			(Some(_), Some(right)) => self.extreme(right, Side::Left),
			_ => target,
		};

		let (child, parent, color) = {
			let node = self.node(spliced);
			(node.left.or(node.right), node.parent, node.color)
		};

		if let Some(child) = child {
			self.node_mut(child).parent = parent;
		}
		self.replace_child(parent, spliced, child);

		let removed = self.release(spliced);
		let value = if spliced == target {
			removed.value
		} else {
			mem::replace(&mut self.node_mut(target).value, removed.value)
		};
		self.len -= 1;

		// Removing a Red node never changes a black height.
		if color == Color::Black {
			self.erase_fixup(child, parent);
		}

		Ok(value)
	}

	// -----------------------------------------------------------------------
	// Bulk Operations
	// -----------------------------------------------------------------------

	/// Removes every element.
	///
	/// The arena is emptied in one pass rather than by repeated erasure.
	/// Every outstanding cursor to an element becomes stale; the arena's
	/// capacity is kept for reuse.
	pub fn clear(&mut self) {
		let released = self.len;
		for (index, slot) in self.slots.iter_mut().enumerate() {
			if slot.node.take().is_some() {
				slot.generation = slot.generation.wrapping_add(1);
				self.free.push(index as NodeIndex);
			}
		}
		self.root = None;
		self.len = 0;
		debug!("cleared {released} elements");
	}

	/// Exchanges the contents of two trees in O(1).
	///
	/// The identity travels with the contents, so cursors keep referring to
	/// their elements: a cursor taken from `self` before the swap must be
	/// used with `other` afterwards.
	pub fn swap(&mut self, other: &mut Self) {
		mem::swap(self, other);
		debug!("swapped trees holding {} and {} elements", self.len, other.len);
	}

	/// Moves every element out of the tree in ascending order.
	///
	/// The tree is empty when this returns, even if the iterator is dropped
	/// before it is exhausted.
	pub fn drain(&mut self) -> IntoIter<T> {
		let mut order = Vec::with_capacity(self.len);
		let mut current = self.root.map(|root| self.extreme(root, Side::Left));
		while let Some(index) = current {
			order.push(index);
			current = self.successor(index);
		}

		let values: Vec<T> = order.into_iter().map(|index| self.release(index).value).collect();
		self.root = None;
		self.len = 0;
		debug!("drained {} elements", values.len());
		IntoIter::new(values)
	}

	// -----------------------------------------------------------------------
	// Diagnostics
	// -----------------------------------------------------------------------

	/// Returns the number of Black nodes on every path from the root down to
	/// an absent child, not counting the root itself.
	///
	/// Returns `None` when paths disagree, which means the tree is
	/// unbalanced. An empty tree has black height 0.
	pub fn black_height(&self) -> Option<usize> {
		let Some(root) = self.root else {
			return Some(0);
		};

		let mut expected = None;
		let mut stack: SmallVec<[(NodeIndex, usize); WALK_STACK]> = smallvec![(root, 0)];
		while let Some((index, above)) = stack.pop() {
			let node = self.node(index);
			let count = above + usize::from(node.color == Color::Black);
			for child in [node.left, node.right] {
				match child {
					Some(child) => stack.push((child, count)),
					None => match expected {
						None => expected = Some(count),
						Some(height) if height != count => return None,
						Some(_) => {}
					},
				}
			}
		}

		let root_black = usize::from(self.node(root).color == Color::Black);
		expected.map(|height| height - root_black)
	}

	/// Returns `true` if the colour invariants hold: the root is Black, no
	/// Red node has a Red child, and [`black_height`](Self::black_height) is
	/// uniform.
	pub fn is_balanced(&self) -> bool {
		if self.color_of(self.root) == Color::Red {
			return false;
		}
		let red_red = self.nodes().any(|node| {
			node.color == Color::Red
				&& (self.color_of(node.left) == Color::Red
					|| self.color_of(node.right) == Color::Red)
		});
		!red_red && self.black_height().is_some()
	}

	// -----------------------------------------------------------------------
	// Arena Management
	// -----------------------------------------------------------------------

	#[inline]
	pub(crate) fn node(&self, index: NodeIndex) -> &Node<T> {
		self.slots[index as usize].node.as_ref().expect("tree link points at a vacant slot")
	}

	#[inline]
	pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut Node<T> {
		self.slots[index as usize].node.as_mut().expect("tree link points at a vacant slot")
	}

	/// Iterates over the occupied slots in arena order.
	fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
		self.slots.iter().filter_map(|slot| slot.node.as_ref())
	}

	#[inline]
	fn color_of(&self, link: Link) -> Color {
		match link {
			Some(index) => self.node(index).color,
			None => Color::Black,
		}
	}

	fn allocate(&mut self, node: Node<T>) -> NodeIndex {
		if let Some(index) = self.free.pop() {
			let slot = &mut self.slots[index as usize];
			debug_assert!(slot.node.is_none(), "free list holds an occupied slot");
			slot.node = Some(node);
			return index;
		}

		assert!(self.slots.len() < MAX_ELEMENTS, "tree cannot hold more than {MAX_ELEMENTS} elements");
		let index = self.slots.len() as NodeIndex;
		self.slots.push(Slot {
			generation: 0,
			node: Some(node),
		});
		index
	}

	/// Vacates a slot and returns its node. The caller must already have
	/// unlinked the node from the tree.
	fn release(&mut self, index: NodeIndex) -> Node<T> {
		let slot = &mut self.slots[index as usize];
		let node = slot.node.take().expect("released a vacant slot");
		slot.generation = slot.generation.wrapping_add(1);
		self.free.push(index);
		node
	}

	pub(crate) fn cursor_at(&self, link: Link) -> Cursor {
		Cursor {
			tree: self.id,
			node: link.map(|index| Handle {
				index,
				generation: self.slots[index as usize].generation,
			}),
		}
	}

	/// Maps a cursor back to a live slot index.
	pub(crate) fn resolve(&self, cursor: Cursor) -> error::Result<NodeIndex> {
		if cursor.tree != self.id {
			return Err(error::Error::ForeignCursor);
		}
		let handle = cursor.node.ok_or(error::Error::EndCursor)?;
		match self.slots.get(handle.index as usize) {
			Some(slot) if slot.generation == handle.generation && slot.node.is_some() => {
				Ok(handle.index)
			}
			_ => Err(error::Error::StaleCursor),
		}
	}

	// -----------------------------------------------------------------------
	// Navigation Primitives
	// -----------------------------------------------------------------------

	/// Follows `side` links from `index` to the end of the chain: the minimum
	/// of the subtree for `Left`, the maximum for `Right`.
	pub(crate) fn extreme(&self, mut index: NodeIndex, side: Side) -> NodeIndex {
		while let Some(child) = self.node(index).child(side) {
			index = child;
		}
		index
	}

	/// In-order neighbour of `index` in direction `side`.
	///
	/// With a child on `side`, the neighbour is the nearest element of that
	/// subtree. Otherwise climb while the current node is its parent's `side`
	/// child; the first parent reached from the other side is the neighbour.
	fn step(&self, index: NodeIndex, side: Side) -> Link {
		if let Some(child) = self.node(index).child(side) {
			return Some(self.extreme(child, side.opposite()));
		}

		let mut current = index;
		let mut parent = self.node(current).parent;
		while let Some(above) = parent {
			if self.node(above).child(side) != Some(current) {
				break;
			}
			current = above;
			parent = self.node(above).parent;
		}
		parent
	}

	#[inline]
	pub(crate) fn successor(&self, index: NodeIndex) -> Link {
		self.step(index, Side::Right)
	}

	#[inline]
	pub(crate) fn predecessor(&self, index: NodeIndex) -> Link {
		self.step(index, Side::Left)
	}

	// -----------------------------------------------------------------------
	// Rebalancing Primitives
	// -----------------------------------------------------------------------

	fn side_of(&self, child: NodeIndex, parent: NodeIndex) -> Side {
		if self.node(parent).left == Some(child) {
			Side::Left
		} else {
			Side::Right
		}
	}

	/// Points whatever linked to `old` (its parent, or the root) at `new`.
	fn replace_child(&mut self, parent: Link, old: NodeIndex, new: Link) {
		match parent {
			None => self.root = new,
			Some(parent) => {
				let side = self.side_of(old, parent);
				*self.node_mut(parent).child_mut(side) = new;
			}
		}
	}

	/// Rotates the subtree rooted at `x` towards `side`: `Side::Left` is the
	/// textbook left rotation, `Side::Right` the right rotation.
	///
	/// `x`'s child on the opposite side (the pivot) takes `x`'s place and `x`
	/// becomes the pivot's `side` child. The pivot's inner subtree moves
	/// across to `x`.
	///
	/// ```text
	///        x                     p
	///       / \    rotate(x, L)   / \
	///      a   p   ──────────►   x   c
	///         / \               / \
	///        b   c             a   b
	/// ```
	pub(crate) fn rotate(&mut self, x: NodeIndex, side: Side) {
		let lifted = side.opposite();
		let pivot = self.node(x).child(lifted).expect("rotation requires a child to lift");
		trace!("rotate {side:?} at {x}, pivot {pivot}");

		let inner = self.node(pivot).child(side);
		*self.node_mut(x).child_mut(lifted) = inner;
		if let Some(inner) = inner {
			self.node_mut(inner).parent = Some(x);
		}

		let parent = self.node(x).parent;
		self.node_mut(pivot).parent = parent;
		self.replace_child(parent, x, Some(pivot));

		*self.node_mut(pivot).child_mut(side) = Some(x);
		self.node_mut(x).parent = Some(pivot);
	}

	/// Restores the colour invariants after `node` was linked in as a Red leaf.
	fn insert_fixup(&mut self, mut node: NodeIndex) {
		while let Some(parent) = self.node(node).parent {
			if self.node(parent).color == Color::Black {
				break;
			}

			let grandparent = self.node(parent).parent.expect("a red node is never the root");
			let side = self.side_of(parent, grandparent);
			let uncle = self.node(grandparent).child(side.opposite());

			if let Some(uncle) = uncle.filter(|&uncle| self.node(uncle).color == Color::Red) {
				// Push the blackness down from the grandparent and retry above.
				trace!("insert fixup: recolour below {grandparent}");
				self.node_mut(parent).color = Color::Black;
				self.node_mut(uncle).color = Color::Black;
				self.node_mut(grandparent).color = Color::Red;
				node = grandparent;
				continue;
			}

			let mut top = parent;
			if self.node(parent).child(side.opposite()) == Some(node) {
				// Inner child: straighten the zig-zag first.
				trace!("insert fixup: straighten at {parent}");
				self.rotate(parent, side);
				top = node;
			}

			trace!("insert fixup: rotate at {grandparent}");
			self.rotate(grandparent, side.opposite());
			self.node_mut(top).color = Color::Black;
			self.node_mut(grandparent).color = Color::Red;
			break;
		}

		if let Some(root) = self.root {
			self.node_mut(root).color = Color::Black;
		}
	}

	/// Restores uniform black height after a Black node was unlinked.
	///
	/// `node` is the position that replaced the removed node and may be
	/// empty; `parent` is that position's parent, which is needed because an
	/// empty position has no node to ask.
	fn erase_fixup(&mut self, mut node: Link, mut parent: Link) {
		while node != self.root && self.color_of(node) == Color::Black {
			let above = parent.expect("a non-root position has a parent");
			let side = if self.node(above).left == node {
				Side::Left
			} else {
				Side::Right
			};
			let away = side.opposite();

			let mut sibling =
				self.node(above).child(away).expect("a doubly black position has a sibling");

			if self.node(sibling).color == Color::Red {
				trace!("erase fixup: red sibling {sibling}");
				self.node_mut(sibling).color = Color::Black;
				self.node_mut(above).color = Color::Red;
				self.rotate(above, side);
				sibling = self.node(above).child(away).expect("rotation leaves a sibling");
			}

			let near = self.node(sibling).child(side);
			let far = self.node(sibling).child(away);

			if self.color_of(near) == Color::Black && self.color_of(far) == Color::Black {
				trace!("erase fixup: recolour sibling {sibling}");
				self.node_mut(sibling).color = Color::Red;
				node = Some(above);
				parent = self.node(above).parent;
				continue;
			}

			if self.color_of(far) == Color::Black {
				// Turn the red near nephew into a red far nephew.
				let near = near.expect("one nephew is red");
				trace!("erase fixup: rotate nephew {near} outward");
				self.node_mut(near).color = Color::Black;
				self.node_mut(sibling).color = Color::Red;
				self.rotate(sibling, away);
				sibling = self.node(above).child(away).expect("rotation leaves a sibling");
			}

			trace!("erase fixup: rotate at {above}");
			let parent_color = self.node(above).color;
			self.node_mut(sibling).color = parent_color;
			self.node_mut(above).color = Color::Black;
			if let Some(far) = self.node(sibling).child(away) {
				self.node_mut(far).color = Color::Black;
			}
			self.rotate(above, side);
			node = self.root;
			break;
		}

		if let Some(node) = node {
			self.node_mut(node).color = Color::Black;
		}
	}
}

// ---------------------------------------------------------------------------
// Comparator-Driven Operations
// ---------------------------------------------------------------------------

impl<T, C: Comparator<T>> Tree<T, C> {
	/// Inserts `value` unless an equivalent element is present.
	///
	/// Returns a cursor to the element with that key and whether a new node
	/// was created. On rejection `value` is dropped and the tree is unchanged.
	///
	/// # Example
	///
	/// ```
	/// use redwood::Tree;
	///
	/// let mut tree = Tree::new();
	/// let (first, inserted) = tree.insert(7);
	/// assert!(inserted);
	///
	/// let (again, inserted) = tree.insert(7);
	/// assert!(!inserted);
	/// assert_eq!(first, again);
	/// assert_eq!(tree.len(), 1);
	/// ```
	pub fn insert(&mut self, value: T) -> (Cursor, bool) {
		self.insert_with(value, Policy::Unique)
	}

	/// Inserts `value` even if equivalent elements are present.
	///
	/// The new element lands after every existing equal element, so equal
	/// runs iterate in insertion order.
	pub fn insert_multi(&mut self, value: T) -> Cursor {
		self.insert_with(value, Policy::Multi).0
	}

	/// Shared descent, link and fixup for both insertion policies.
	fn insert_with(&mut self, value: T, policy: Policy) -> (Cursor, bool) {
		let mut parent = None;
		let mut side = Side::Left;
		let mut current = self.root;

		while let Some(index) = current {
			let node = self.node(index);
			side = match self.comparator.compare(&value, &node.value) {
				Ordering::Less => Side::Left,
				Ordering::Greater => Side::Right,
				Ordering::Equal => match policy {
					Policy::Unique => return (self.cursor_at(Some(index)), false),
					Policy::Multi => Side::Right,
				},
			};
			parent = Some(index);
			current = node.child(side);
		}

		let index = self.allocate(Node::new(value, parent));
		match parent {
			None => self.root = Some(index),
			Some(parent) => *self.node_mut(parent).child_mut(side) = Some(index),
		}
		self.len += 1;
		self.insert_fixup(index);

		(self.cursor_at(Some(index)), true)
	}

	/// Returns a cursor to an element equivalent to `value`, or
	/// [`end`](Self::end).
	pub fn find(&self, value: &T) -> Cursor {
		self.find_by(|element| self.comparator.compare(element, value))
	}

	/// Returns `true` if an element equivalent to `value` is present.
	pub fn contains(&self, value: &T) -> bool {
		!self.find(value).is_end()
	}

	/// Returns a cursor to the first element not less than `value`.
	pub fn lower_bound(&self, value: &T) -> Cursor {
		self.lower_bound_by(|element| self.comparator.compare(element, value))
	}

	/// Returns a cursor to the first element greater than `value`.
	pub fn upper_bound(&self, value: &T) -> Cursor {
		self.upper_bound_by(|element| self.comparator.compare(element, value))
	}

	/// Removes an element equivalent to `value` and returns it.
	pub fn remove(&mut self, value: &T) -> Option<T> {
		let cursor = self.find(value);
		self.erase(cursor).ok()
	}

	/// Moves every element of `other` into `self` in ascending order.
	///
	/// Elements that collide with an element already in `self` are dropped.
	/// `other` is always empty afterwards.
	///
	/// # Example
	///
	/// ```
	/// use redwood::Tree;
	///
	/// let mut a: Tree<i32> = [1, 2, 3].into();
	/// let mut b: Tree<i32> = [3, 4, 5].into();
	/// b.merge(&mut a);
	///
	/// assert!(a.is_empty());
	/// assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
	/// ```
	pub fn merge<D>(&mut self, other: &mut Tree<T, D>) {
		self.merge_with(other, Policy::Unique);
	}

	/// Moves every element of `other` into `self` with
	/// [`insert_multi`](Self::insert_multi). `other` is empty afterwards.
	pub fn merge_multi<D>(&mut self, other: &mut Tree<T, D>) {
		self.merge_with(other, Policy::Multi);
	}

	fn merge_with<D>(&mut self, other: &mut Tree<T, D>, policy: Policy) {
		let before = self.len;
		let incoming = other.len();
		for value in other.drain() {
			self.insert_with(value, policy);
		}
		debug!("merged {incoming} elements, {} accepted", self.len - before);
	}
}

// ---------------------------------------------------------------------------
// Trait Implementations
// ---------------------------------------------------------------------------

impl<T, C: Default> Default for Tree<T, C> {
	fn default() -> Self {
		Tree::with_comparator(C::default())
	}
}

impl<T: Clone, C: Clone> Clone for Tree<T, C> {
	/// Copies the arena structurally. The copy gets a fresh identity, so
	/// cursors into the original are foreign to it.
	fn clone(&self) -> Self {
		Tree {
			id: TreeId::next(),
			slots: self.slots.clone(),
			free: self.free.clone(),
			root: self.root,
			len: self.len,
			comparator: self.comparator.clone(),
		}
	}
}

impl<T: fmt::Debug, C> fmt::Debug for Tree<T, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

impl<T: PartialEq, C, D> PartialEq<Tree<T, D>> for Tree<T, C> {
	fn eq(&self, other: &Tree<T, D>) -> bool {
		self.len == other.len() && self.iter().eq(other.iter())
	}
}

impl<T: Eq, C> Eq for Tree<T, C> {}

impl<T, C: Comparator<T> + Default> FromIterator<T> for Tree<T, C> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		let mut tree = Tree::default();
		tree.extend(iter);
		tree
	}
}

impl<T, C: Comparator<T>> Extend<T> for Tree<T, C> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		for value in iter {
			self.insert(value);
		}
	}
}

impl<T: Ord, const N: usize> From<[T; N]> for Tree<T> {
	fn from(values: [T; N]) -> Self {
		values.into_iter().collect()
	}
}

// ===========================================================================
// Test-Only Validation Module
// ===========================================================================

#[cfg(any(test, feature = "test-utils"))]
impl<T: fmt::Debug, C: Comparator<T>> Tree<T, C> {
	/// Validates every structural invariant. Panics with diagnostic info if
	/// any is violated.
	///
	/// # Invariants Checked
	///
	/// 1. Root colour: the root is Black and has no parent
	/// 2. Back-links: each child's `parent` names the node that links to it
	/// 3. No red-red: a Red node has only Black children
	/// 4. Black height: every root-to-absent-child path has the same count
	/// 5. Order: in-order neighbours never compare `Greater`
	/// 6. Length: `len` equals the reachable node count
	/// 7. Arena: occupied slots plus free slots account for the whole arena
	pub fn assert_invariants(&self) {
		let Some(root) = self.root else {
			assert_eq!(self.len, 0, "Empty tree reports len {}", self.len);
			assert_eq!(
				self.free.len(),
				self.slots.len(),
				"Empty tree has {} slots but {} on the free list",
				self.slots.len(),
				self.free.len()
			);
			return;
		};

		// Invariant 1: Root colour
		assert_eq!(self.node(root).color, Color::Black, "Root {} is Red", root);
		assert_eq!(self.node(root).parent, None, "Root {} has a parent", root);

		let mut reachable = 0usize;
		let mut expected_black = None;
		let mut stack: SmallVec<[(NodeIndex, usize); WALK_STACK]> = smallvec![(root, 0)];
		while let Some((index, above)) = stack.pop() {
			reachable += 1;
			let node = self.node(index);
			let count = above + usize::from(node.color == Color::Black);

			for child in [node.left, node.right] {
				match child {
					Some(child) => {
						// Invariant 2: Back-links
						assert_eq!(
							self.node(child).parent,
							Some(index),
							"Node {} is a child of {} but points at {:?}",
							child,
							index,
							self.node(child).parent
						);

						// Invariant 3: No red-red
						assert!(
							!(node.color == Color::Red && self.node(child).color == Color::Red),
							"Red node {} ({:?}) has red child {} ({:?})",
							index,
							node.value,
							child,
							self.node(child).value
						);

						stack.push((child, count));
					}
					None => {
						// Invariant 4: Black height
						match expected_black {
							None => expected_black = Some(count),
							Some(height) => assert_eq!(
								height, count,
								"Path ending below {} ({:?}) has black count {}, expected {}",
								index, node.value, count, height
							),
						}
					}
				}
			}
		}

		// Invariant 5: Order
		let mut current = Some(self.extreme(root, Side::Left));
		while let Some(index) = current {
			let next = self.successor(index);
			if let Some(next) = next {
				let (a, b) = (&self.node(index).value, &self.node(next).value);
				assert_ne!(
					self.comparator.compare(a, b),
					Ordering::Greater,
					"Elements out of order: {:?} precedes {:?}",
					a,
					b
				);
			}
			current = next;
		}

		// Invariant 6: Length
		assert_eq!(reachable, self.len, "Reachable nodes {} != len {}", reachable, self.len);

		// Invariant 7: Arena
		let occupied = self.nodes().count();
		assert_eq!(occupied, self.len, "Occupied slots {} != len {}", occupied, self.len);
		assert_eq!(
			occupied + self.free.len(),
			self.slots.len(),
			"Occupied {} + free {} != slots {}",
			occupied,
			self.free.len(),
			self.slots.len()
		);
		for &index in &self.free {
			assert!(self.slots[index as usize].node.is_none(), "Free list holds occupied slot {}", index);
		}
	}
}
