// Copyright © SurrealDB Ltd
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Criterion benchmarks comparing redwood against the standard library.
//!
//! This benchmark suite compares:
//! - `redwood::Tree` - arena-backed red-black tree with stable cursors
//! - `std::collections::BTreeSet` - standard library B-tree
//!
//! Every workload uses the same seeded keys for both containers.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use redwood::Tree;
use std::collections::BTreeSet;
use std::hint::black_box;

const SEED: u64 = 42;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

// ============================================================================
// Helper Functions
// ============================================================================

fn sequential_keys(count: usize) -> Vec<i64> {
	(0..count as i64).collect()
}

fn random_keys(count: usize) -> Vec<i64> {
	let mut rng = StdRng::seed_from_u64(SEED);
	(0..count).map(|_| rng.random()).collect()
}

/// The same keys as `keys`, in a seeded random order.
fn shuffled(keys: &[i64]) -> Vec<i64> {
	let mut rng = StdRng::seed_from_u64(SEED ^ 0xff);
	let mut keys = keys.to_vec();
	keys.shuffle(&mut rng);
	keys
}

// ============================================================================
// Insert Benchmarks
// ============================================================================

fn bench_insert(c: &mut Criterion, name: &str, make_keys: fn(usize) -> Vec<i64>) {
	let mut group = c.benchmark_group(name);

	for count in SIZES {
		let keys = make_keys(count);
		group.throughput(Throughput::Elements(count as u64));

		group.bench_with_input(BenchmarkId::new("redwood", count), &keys, |b, keys| {
			b.iter_batched(
				|| Tree::with_capacity(keys.len()),
				|mut tree| {
					for &k in keys {
						black_box(tree.insert(k));
					}
					tree
				},
				BatchSize::SmallInput,
			)
		});

		group.bench_with_input(BenchmarkId::new("btreeset", count), &keys, |b, keys| {
			b.iter_batched(
				BTreeSet::new,
				|mut set| {
					for &k in keys {
						black_box(set.insert(k));
					}
					set
				},
				BatchSize::SmallInput,
			)
		});
	}
	group.finish();
}

fn bench_insert_sequential(c: &mut Criterion) {
	bench_insert(c, "insert_sequential", sequential_keys);
}

fn bench_insert_random(c: &mut Criterion) {
	bench_insert(c, "insert_random", random_keys);
}

fn bench_insert_multi(c: &mut Criterion) {
	let mut group = c.benchmark_group("insert_multi");

	for count in SIZES {
		// Roughly a hundred copies of each key.
		let keys: Vec<i64> = random_keys(count).into_iter().map(|k| k % (count as i64 / 100)).collect();
		group.throughput(Throughput::Elements(count as u64));

		group.bench_with_input(BenchmarkId::new("redwood", count), &keys, |b, keys| {
			b.iter_batched(
				Tree::new,
				|mut tree| {
					for &k in keys {
						black_box(tree.insert_multi(k));
					}
					tree
				},
				BatchSize::SmallInput,
			)
		});
	}
	group.finish();
}

// ============================================================================
// Lookup Benchmarks
// ============================================================================

fn bench_find(c: &mut Criterion) {
	let mut group = c.benchmark_group("find");

	for count in SIZES {
		let keys = random_keys(count);
		let probes = shuffled(&keys);
		let tree: Tree<i64> = keys.iter().copied().collect();
		let set: BTreeSet<i64> = keys.iter().copied().collect();
		group.throughput(Throughput::Elements(count as u64));

		group.bench_function(BenchmarkId::new("redwood", count), |b| {
			b.iter(|| {
				for k in &probes {
					black_box(tree.get(tree.find(k)));
				}
			})
		});

		group.bench_function(BenchmarkId::new("btreeset", count), |b| {
			b.iter(|| {
				for k in &probes {
					black_box(set.get(k));
				}
			})
		});
	}
	group.finish();
}

fn bench_lower_bound(c: &mut Criterion) {
	let mut group = c.benchmark_group("lower_bound");

	for count in SIZES {
		let keys = sequential_keys(count);
		let tree: Tree<i64> = keys.iter().map(|k| k * 2).collect();
		let set: BTreeSet<i64> = keys.iter().map(|k| k * 2).collect();
		let probes: Vec<i64> = shuffled(&keys).into_iter().map(|k| k * 2 + 1).collect();
		group.throughput(Throughput::Elements(count as u64));

		group.bench_function(BenchmarkId::new("redwood", count), |b| {
			b.iter(|| {
				for k in &probes {
					black_box(tree.get(tree.lower_bound(k)));
				}
			})
		});

		group.bench_function(BenchmarkId::new("btreeset", count), |b| {
			b.iter(|| {
				for k in &probes {
					black_box(set.range(k..).next());
				}
			})
		});
	}
	group.finish();
}

// ============================================================================
// Erase Benchmarks
// ============================================================================

fn bench_erase(c: &mut Criterion) {
	let mut group = c.benchmark_group("erase");

	for count in SIZES {
		let keys = random_keys(count);
		let order = shuffled(&keys);
		let tree: Tree<i64> = keys.iter().copied().collect();
		let set: BTreeSet<i64> = keys.iter().copied().collect();
		group.throughput(Throughput::Elements(count as u64));

		group.bench_function(BenchmarkId::new("redwood", count), |b| {
			b.iter_batched(
				|| tree.clone(),
				|mut tree| {
					for k in &order {
						black_box(tree.remove(k));
					}
					tree
				},
				BatchSize::LargeInput,
			)
		});

		group.bench_function(BenchmarkId::new("btreeset", count), |b| {
			b.iter_batched(
				|| set.clone(),
				|mut set| {
					for k in &order {
						black_box(set.take(k));
					}
					set
				},
				BatchSize::LargeInput,
			)
		});
	}
	group.finish();
}

// ============================================================================
// Iteration Benchmarks
// ============================================================================

fn bench_iterate(c: &mut Criterion) {
	let mut group = c.benchmark_group("iterate");

	for count in SIZES {
		let keys = random_keys(count);
		let tree: Tree<i64> = keys.iter().copied().collect();
		let set: BTreeSet<i64> = keys.iter().copied().collect();
		group.throughput(Throughput::Elements(count as u64));

		group.bench_function(BenchmarkId::new("redwood_iter", count), |b| {
			b.iter(|| black_box(tree.iter().fold(0i64, |acc, k| acc.wrapping_add(*k))))
		});

		group.bench_function(BenchmarkId::new("redwood_cursor", count), |b| {
			b.iter(|| {
				let mut acc = 0i64;
				let mut cursor = tree.begin();
				while let Some(k) = tree.get(cursor) {
					acc = acc.wrapping_add(*k);
					cursor = tree.next(cursor);
				}
				black_box(acc)
			})
		});

		group.bench_function(BenchmarkId::new("btreeset", count), |b| {
			b.iter(|| black_box(set.iter().fold(0i64, |acc, k| acc.wrapping_add(*k))))
		});
	}
	group.finish();
}

criterion_group!(
	benches,
	bench_insert_sequential,
	bench_insert_random,
	bench_insert_multi,
	bench_find,
	bench_lower_bound,
	bench_erase,
	bench_iterate,
);

criterion_main!(benches);
