//! Allocation accounting for leak tests.
//!
//! A tree owns exactly two heap buffers, the slot arena and the free list,
//! plus whatever its elements own. Installing [`TrackingAllocator`] in a test
//! binary lets a test take a [`snapshot`] before building a tree and check
//! that every byte is handed back once the tree (or its contents) is gone.
//!
//! ```ignore
//! use redwood::alloc::{self, TrackingAllocator};
//!
//! #[global_allocator]
//! static ALLOC: TrackingAllocator = TrackingAllocator;
//!
//! #[test]
//! fn drop_releases_everything() {
//! 	let before = alloc::snapshot();
//! 	let tree: redwood::Tree<String> = (0..100).map(|i| i.to_string()).collect();
//! 	drop(tree);
//! 	alloc::assert_released_since(&before);
//! }
//! ```
//!
//! Counters are process-wide. Tests that read them must not run alongside
//! other allocating tests, so memory test binaries hold a single `#[test]`.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);
static DEALLOCATIONS: AtomicUsize = AtomicUsize::new(0);
static LIVE_BYTES: AtomicIsize = AtomicIsize::new(0);
static PEAK_BYTES: AtomicIsize = AtomicIsize::new(0);

/// System allocator wrapper that counts calls and live bytes.
pub struct TrackingAllocator;

fn grow(bytes: isize) {
	let live = LIVE_BYTES.fetch_add(bytes, Ordering::Relaxed) + bytes;
	PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for TrackingAllocator {
	unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
		ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
		grow(layout.size() as isize);
		System.alloc(layout)
	}

	unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
		ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
		grow(layout.size() as isize);
		System.alloc_zeroed(layout)
	}

	unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
		DEALLOCATIONS.fetch_add(1, Ordering::Relaxed);
		LIVE_BYTES.fetch_sub(layout.size() as isize, Ordering::Relaxed);
		System.dealloc(ptr, layout)
	}

	unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
		grow(new_size as isize - layout.size() as isize);
		System.realloc(ptr, layout, new_size)
	}
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationStats {
	pub allocations: usize,
	pub deallocations: usize,
	/// Bytes currently held. Signed because a snapshot taken mid-test may
	/// see frees of memory allocated before the counters were reset.
	pub live_bytes: isize,
	pub peak_bytes: isize,
}

impl AllocationStats {
	/// Allocations not yet matched by a deallocation.
	pub fn outstanding(&self) -> isize {
		self.allocations as isize - self.deallocations as isize
	}
}

/// Zeroes every counter.
pub fn reset() {
	ALLOCATIONS.store(0, Ordering::SeqCst);
	DEALLOCATIONS.store(0, Ordering::SeqCst);
	LIVE_BYTES.store(0, Ordering::SeqCst);
	PEAK_BYTES.store(0, Ordering::SeqCst);
}

pub fn snapshot() -> AllocationStats {
	AllocationStats {
		allocations: ALLOCATIONS.load(Ordering::SeqCst),
		deallocations: DEALLOCATIONS.load(Ordering::SeqCst),
		live_bytes: LIVE_BYTES.load(Ordering::SeqCst),
		peak_bytes: PEAK_BYTES.load(Ordering::SeqCst),
	}
}

/// Asserts that live bytes are back to where they were at `before`.
///
/// # Panics
///
/// Panics with both snapshots if any bytes allocated since `before` are
/// still held.
pub fn assert_released_since(before: &AllocationStats) {
	let now = snapshot();
	if now.live_bytes > before.live_bytes {
		panic!(
			"{} bytes still held ({} allocations outstanding)\nbefore: {:?}\nnow:    {:?}",
			now.live_bytes - before.live_bytes,
			now.outstanding() - before.outstanding(),
			before,
			now
		);
	}
}
