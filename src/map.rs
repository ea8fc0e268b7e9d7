//! An ordered map over the red-black tree.
//!
//! [`Map`] stores `(key, value)` pairs in a [`Tree`] ordered by [`ByKey`], so
//! two pairs with the same key are equivalent and the tree's reject-duplicate
//! insertion gives one entry per key. Lookups descend with
//! [`Tree::find_by`] and never need a placeholder value.

use crate::error;
use crate::{ByKey, Cursor, Tree};
use std::borrow::Borrow;
use std::fmt;

/// An ordered map with one entry per key.
///
/// # Example
///
/// ```
/// use redwood::{Error, Map};
///
/// let mut ages = Map::new();
/// ages.insert("ada", 36);
/// ages.insert("alan", 41);
///
/// assert_eq!(ages.at("ada"), Ok(&36));
/// assert_eq!(ages.at("grace"), Err(Error::KeyNotFound));
///
/// *ages.get_or_insert_default("grace") += 85;
/// assert_eq!(ages.keys().copied().collect::<Vec<_>>(), vec!["ada", "alan", "grace"]);
/// ```
pub struct Map<K, V> {
	tree: Tree<(K, V), ByKey>,
}

impl<K, V> Map<K, V> {
	/// Creates an empty map.
	pub fn new() -> Self {
		Map {
			tree: Tree::with_comparator(ByKey),
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

	/// Exchanges the contents of two maps in O(1). Cursors follow their entries.
	pub fn swap(&mut self, other: &mut Self) {
		self.tree.swap(&mut other.tree);
	}

	pub fn begin(&self) -> Cursor {
		self.tree.begin()
	}

	pub fn end(&self) -> Cursor {
		self.tree.end()
	}

	/// See [`Tree::next`].
	pub fn next(&self, cursor: Cursor) -> Cursor {
		self.tree.next(cursor)
	}

	/// See [`Tree::prev`].
	pub fn prev(&self, cursor: Cursor) -> Cursor {
		self.tree.prev(cursor)
	}

	/// Dereferences a cursor to its entry.
	pub fn entry_at(&self, cursor: Cursor) -> Option<(&K, &V)> {
		self.tree.get(cursor).map(|(key, value)| (key, value))
	}

	/// Dereferences a cursor to its entry with a mutable value.
	pub fn entry_at_mut(&mut self, cursor: Cursor) -> Option<(&K, &mut V)> {
		self.tree.get_mut(cursor).map(|(key, value)| (&*key, value))
	}

	/// Removes the entry at `cursor`. Fails like [`Tree::erase`].
	pub fn erase(&mut self, cursor: Cursor) -> error::Result<(K, V)> {
		self.tree.erase(cursor)
	}

	/// Iterates over entries in ascending key order.
	pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator {
		self.tree.iter().map(|(key, value)| (key, value))
	}

	pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
		self.tree.iter().map(|(key, _)| key)
	}

	pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
		self.tree.iter().map(|(_, value)| value)
	}

	/// The underlying tree, for diagnostics.
	pub fn as_tree(&self) -> &Tree<(K, V), ByKey> {
		&self.tree
	}
}

impl<K: Ord, V> Map<K, V> {
	/// Inserts an entry unless the key is present.
	///
	/// Returns a cursor to the entry holding `key` and whether the new entry
	/// was added. An existing entry keeps its value.
	pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool) {
		self.tree.insert((key, value))
	}

	/// Inserts an entry, or overwrites the value of an existing one.
	///
	/// The flag is `true` when a new entry was added and `false` when an
	/// existing value was replaced.
	pub fn insert_or_assign(&mut self, key: K, value: V) -> (Cursor, bool) {
		let cursor = self.find(&key);
		match self.tree.get_mut(cursor) {
			Some(entry) => {
				entry.1 = value;
				(cursor, false)
			}
			None => self.tree.insert((key, value)),
		}
	}

	/// Inserts every entry in order, reporting each outcome.
	pub fn insert_many<I>(&mut self, entries: I) -> Vec<(Cursor, bool)>
	where
		I: IntoIterator<Item = (K, V)>,
	{
		entries.into_iter().map(|(key, value)| self.insert(key, value)).collect()
	}

	/// Returns a cursor to the entry for `key`, or [`end`](Self::end).
	pub fn find<Q>(&self, key: &Q) -> Cursor
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.tree.find_by(|(k, _)| Q::cmp(k.borrow(), key))
	}

	pub fn contains_key<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		!self.find(key).is_end()
	}

	pub fn get<Q>(&self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.tree.get(self.find(key)).map(|(_, value)| value)
	}

	pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let cursor = self.find(key);
		self.tree.get_mut(cursor).map(|(_, value)| value)
	}

	/// Returns the value for `key`.
	///
	/// # Errors
	///
	/// [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key is absent.
	pub fn at<Q>(&self, key: &Q) -> error::Result<&V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.get(key).ok_or(error::Error::KeyNotFound)
	}

	/// Returns the value for `key` mutably.
	///
	/// # Errors
	///
	/// [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key is absent.
	pub fn at_mut<Q>(&mut self, key: &Q) -> error::Result<&mut V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.get_mut(key).ok_or(error::Error::KeyNotFound)
	}

	/// Returns the value for `key`, inserting `V::default()` first if the key
	/// is absent.
	pub fn get_or_insert_default(&mut self, key: K) -> &mut V
	where
		V: Default,
	{
		let mut cursor = self.find(&key);
		if cursor.is_end() {
			cursor = self.tree.insert((key, V::default())).0;
		}
		&mut self.tree.get_mut(cursor).expect("cursor was just produced by this map").1
	}

	/// Removes the entry for `key` and returns its value.
	pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let cursor = self.find(key);
		self.tree.erase(cursor).ok().map(|(_, value)| value)
	}

	/// Moves every entry of `other` into `self`. Entries whose key is already
	/// present are dropped; `other` is always empty afterwards.
	pub fn merge(&mut self, other: &mut Self) {
		self.tree.merge(&mut other.tree);
	}
}

impl<K, V> Default for Map<K, V> {
	fn default() -> Self {
		Map::new()
	}
}

impl<K: Clone, V: Clone> Clone for Map<K, V> {
	fn clone(&self) -> Self {
		Map {
			tree: self.tree.clone(),
		}
	}
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}

impl<K: PartialEq, V: PartialEq> PartialEq for Map<K, V> {
	fn eq(&self, other: &Self) -> bool {
		self.tree == other.tree
	}
}

impl<K: Ord, V> FromIterator<(K, V)> for Map<K, V> {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut map = Map::new();
		map.extend(iter);
		map
	}
}

impl<K: Ord, V> Extend<(K, V)> for Map<K, V> {
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}

impl<K, V> IntoIterator for Map<K, V> {
	type Item = (K, V);
	type IntoIter = crate::IntoIter<(K, V)>;

	fn into_iter(self) -> Self::IntoIter {
		self.tree.into_iter()
	}
}
