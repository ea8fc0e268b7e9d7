//! # Integration Tests for Redwood
//!
//! End-to-end tests that drive the tree through its public API with realistic
//! workloads and compare the outcome against `std::collections` oracles.

use rand::prelude::*;
use redwood::{Comparator, Error, Reverse, Tree};
use std::cmp::Ordering;
use std::collections::BTreeSet;

fn collect<T: Clone, C>(tree: &Tree<T, C>) -> Vec<T> {
	tree.iter().cloned().collect()
}

// ===========================================================================
// Large Scale Operation Tests
// ===========================================================================

#[test]
fn large_scale_insert_and_find() {
	let mut tree = Tree::new();
	for i in 0..10_000 {
		assert!(tree.insert(i).1);
	}

	tree.assert_invariants();
	assert_eq!(tree.len(), 10_000);
	for i in 0..10_000 {
		assert_eq!(tree.get(tree.find(&i)), Some(&i), "failed to find {i}");
	}
	assert!(tree.find(&10_000).is_end());
}

#[test]
fn large_scale_insert_and_remove() {
	let mut tree: Tree<i32> = (0..10_000).collect();

	for i in (0..10_000).step_by(2) {
		assert_eq!(tree.remove(&i), Some(i));
	}
	tree.assert_invariants();
	assert_eq!(tree.len(), 5_000);

	for i in (1..10_000).step_by(2) {
		assert_eq!(tree.remove(&i), Some(i));
	}
	tree.assert_invariants();
	assert!(tree.is_empty());
	assert_eq!(tree.begin(), tree.end());
}

#[test]
fn large_scale_random_operations() {
	let mut tree = Tree::new();
	let mut expected = BTreeSet::new();
	let mut rng = rand::rng();

	for round in 0..20_000 {
		let value: u16 = rng.random_range(0..2_000);
		match rng.random_range(0..3) {
			0 => assert_eq!(tree.insert(value).1, expected.insert(value)),
			1 => assert_eq!(tree.remove(&value), expected.take(&value)),
			_ => assert_eq!(tree.contains(&value), expected.contains(&value)),
		}

		if round % 1_000 == 0 {
			tree.assert_invariants();
		}
	}

	tree.assert_invariants();
	assert_eq!(tree.len(), expected.len());
	assert!(tree.iter().eq(expected.iter()));
}

// ===========================================================================
// Cursor Workflow Tests
// ===========================================================================

#[test]
fn erase_while_walking_forward() {
	let mut tree: Tree<i32> = (0..100).collect();

	// Erasing a node with two children moves its successor's value into it,
	// so the walk stays put when the erased cursor is still live.
	let mut cursor = tree.begin();
	while let Some(&value) = tree.get(cursor) {
		if value % 3 == 0 {
			let next = tree.next(cursor);
			tree.erase(cursor).unwrap();
			if tree.get(cursor).is_none() {
				cursor = next;
			}
		} else {
			cursor = tree.next(cursor);
		}
	}

	tree.assert_invariants();
	assert_eq!(collect(&tree), (0..100).filter(|v| v % 3 != 0).collect::<Vec<_>>());
}

#[test]
fn erase_invalidates_only_target_or_successor() {
	let mut tree: Tree<i32> = (1..=64).collect();
	let first = tree.begin();

	for value in 2..=64 {
		let cursor = tree.find(&value);
		let successor = tree.next(cursor);
		let moved = tree.get(successor).copied();
		tree.erase(cursor).unwrap();

		match tree.get(cursor) {
			// Two children: the successor's value now lives at `cursor`.
			Some(current) => {
				assert_eq!(Some(*current), moved);
				assert_eq!(tree.get(successor), None);
			}
			None => assert_eq!(tree.get(successor).copied(), moved),
		}
		if value % 8 == 0 {
			tree.assert_invariants();
		}
	}

	assert_eq!(tree.get(first), Some(&1));
	assert_eq!(tree.next(first), tree.end());
}

#[test]
fn reverse_walk_from_end() {
	let tree: Tree<i32> = (0..1_000).collect();
	let mut cursor = tree.end();
	let mut seen = Vec::with_capacity(1_000);
	loop {
		cursor = tree.prev(cursor);
		match tree.get(cursor) {
			Some(value) => seen.push(*value),
			None => break,
		}
	}
	assert_eq!(seen, (0..1_000).rev().collect::<Vec<_>>());
}

#[test]
fn erase_reports_each_invalid_cursor() {
	let mut a: Tree<i32> = (0..10).collect();
	let b: Tree<i32> = (0..10).collect();

	let stale = a.find(&4);
	a.erase(stale).unwrap();

	assert_eq!(a.erase(b.begin()), Err(Error::ForeignCursor));
	assert_eq!(a.erase(a.end()), Err(Error::EndCursor));
	assert_eq!(a.erase(stale), Err(Error::StaleCursor));
	assert_eq!(a.len(), 9);
	a.assert_invariants();
}

// ===========================================================================
// Comparator Tests
// ===========================================================================

#[test]
fn reverse_comparator_orders_descending() {
	let tree: Tree<u32, Reverse> = (0..500).collect();
	tree.assert_invariants();
	assert_eq!(collect(&tree), (0..500).rev().collect::<Vec<_>>());
	assert_eq!(tree.first(), Some(&499));
}

#[test]
fn closure_comparator() {
	let mut tree = Tree::with_comparator(redwood::compare::from_fn(|a: &&str, b: &&str| {
		a.len().cmp(&b.len()).then_with(|| a.cmp(b))
	}));
	for word in ["pear", "fig", "banana", "kiwi", "apple", "fig"] {
		tree.insert(word);
	}
	assert_eq!(collect(&tree), vec!["fig", "kiwi", "pear", "apple", "banana"]);
}

/// Orders only by the first tuple field, so the second one is a payload.
#[derive(Debug, Default, Clone, Copy)]
struct FirstField;

impl Comparator<(u8, u32)> for FirstField {
	fn compare(&self, a: &(u8, u32), b: &(u8, u32)) -> Ordering {
		a.0.cmp(&b.0)
	}
}

#[test]
fn find_by_probe_without_full_value() {
	let tree: Tree<(u8, u32), FirstField> = (0..=255u8).map(|k| (k, u32::from(k) * 7)).collect();
	let cursor = tree.find_by(|(k, _)| k.cmp(&200));
	assert_eq!(tree.get(cursor), Some(&(200, 1_400)));

	let lower = tree.lower_bound_by(|(k, _)| k.cmp(&100));
	let upper = tree.upper_bound_by(|(k, _)| k.cmp(&100));
	assert_eq!(tree.get(lower), Some(&(100, 700)));
	assert_eq!(tree.get(upper), Some(&(101, 707)));
}

// ===========================================================================
// Bulk Operation Tests
// ===========================================================================

#[test]
fn merge_large_overlapping_trees() {
	let mut target: Tree<i32> = (0..5_000).step_by(2).collect();
	let mut source: Tree<i32> = (0..5_000).step_by(3).collect();
	let overlap = (0..5_000).filter(|v| v % 6 == 0).count();
	let source_len = source.len();

	target.merge(&mut source);

	target.assert_invariants();
	assert!(source.is_empty());
	assert_eq!(target.len(), 2_500 + source_len - overlap);
	assert!(target.iter().zip(target.iter().skip(1)).all(|(a, b)| a < b));
}

#[test]
fn clear_then_refill_reuses_arena() {
	let mut tree: Tree<u64> = (0..1_000).collect();
	let old = tree.find(&10);
	tree.clear();
	tree.assert_invariants();

	tree.extend(1_000..2_000);
	tree.assert_invariants();
	assert_eq!(tree.get(old), None);
	assert_eq!(tree.len(), 1_000);
	assert_eq!(tree.first(), Some(&1_000));
}

#[test]
fn drain_empties_tree_and_keeps_it_usable() {
	let mut tree: Tree<String> = ["c", "a", "b"].map(String::from).into();
	let drained: Vec<String> = tree.drain().collect();
	assert_eq!(drained, vec!["a", "b", "c"]);
	assert!(tree.is_empty());

	tree.insert("z".to_string());
	tree.assert_invariants();
	assert_eq!(tree.len(), 1);
}

#[test]
fn swap_keeps_cursors_with_their_elements() {
	let mut a: Tree<i32> = [1, 2, 3].into();
	let mut b: Tree<i32> = [7, 8].into();
	let two = a.find(&2);

	a.swap(&mut b);

	assert_eq!(collect(&a), vec![7, 8]);
	assert_eq!(b.get(two), Some(&2));
	assert_eq!(a.get(two), None);
}
