//! # Error Types for the Red-Black Tree
//!
//! The tree reports ordinary outcomes through return values: inserting a
//! duplicate yields `(cursor, false)` and a failed lookup yields the end
//! cursor. The variants below cover the remaining cases, which are caller
//! mistakes or adapter-level lookups that have no sensible default.
//!
//! ## Cursor Validation
//!
//! A [`Cursor`](crate::iter::Cursor) is a plain handle and does not borrow
//! the tree, so it can outlive the element it points at. Every cursor carries
//! the identity of the tree that produced it and the generation of the arena
//! slot it refers to:
//!
//! ```text
//! erase(cursor)
//!      │
//!      ├── cursor.tree != tree.id       ──► Err(ForeignCursor)
//!      ├── cursor is end()              ──► Err(EndCursor)
//!      ├── slot generation has moved on ──► Err(StaleCursor)
//!      │
//!      ▼
//! element removed, Ok(value)
//! ```
//!
//! In every error case the tree is left untouched.

use thiserror::Error;

/// Errors returned by tree and adapter operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The cursor is the past-the-end sentinel and refers to no element.
	#[error("cursor is past the end of the tree")]
	EndCursor,

	/// The cursor was produced by a different tree.
	///
	/// Cursors follow their elements through [`Tree::swap`](crate::Tree::swap),
	/// so a cursor taken before a swap belongs to whichever tree now holds
	/// the element.
	#[error("cursor belongs to a different tree")]
	ForeignCursor,

	/// The element the cursor referred to has been erased.
	///
	/// This also covers the successor that was physically spliced out when
	/// an element with two children was erased.
	#[error("cursor refers to an erased element")]
	StaleCursor,

	/// A keyed accessor such as [`Map::at`](crate::map::Map::at) was used with
	/// a key that is not present.
	#[error("key not found")]
	KeyNotFound,
}

/// A Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages() {
		assert_eq!(Error::EndCursor.to_string(), "cursor is past the end of the tree");
		assert_eq!(Error::ForeignCursor.to_string(), "cursor belongs to a different tree");
		assert_eq!(Error::StaleCursor.to_string(), "cursor refers to an erased element");
		assert_eq!(Error::KeyNotFound.to_string(), "key not found");
	}
}
