//! # lambars-collections
//!
//! Large mutable sequences with copy-on-write structural sharing.
//!
//! ## Overview
//!
//! The central type is [`BigList`](sequence::BigList), an indexed sequence
//! of up to 2^31 - 2 elements stored as a balanced tree of small blocks.
//! It offers:
//!
//! - **O(log N) editing**: positional insert, remove and replace anywhere
//! - **O(1) cloning**: clones share nodes until one of them is mutated
//! - **Cheap bulk operations**: concatenation, sub-range extraction and
//!   repetition reuse existing subtrees instead of copying elements
//! - **Live windows**: [`RangeView`](sequence::RangeView) edits a slice of
//!   a list in place
//! - **Fail-fast cursors**: [`VersionedIter`](sequence::VersionedIter)
//!   notices when its list has been modified
//!
//! ## Feature Flags
//!
//! - `arc`: use `Arc` instead of `Rc` for tree nodes, making lists `Send`
//!   and `Sync` when their elements are
//! - `serde`: `Serialize` and `Deserialize` for lists
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use lambars_collections::prelude::*;
//!
//! let mut list: BigList<u32> = (0..10_000).collect();
//! list.insert(5_000, 42).unwrap();
//! list.remove_range(0, 1_000).unwrap();
//! assert_eq!(list.len(), 9_001);
//! assert_eq!(list[4_000], 42);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the sequence types, their traits and the error type.
///
/// # Usage
///
/// ```rust
/// use lambars_collections::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{CollectionError, ErrorKind};
    pub use crate::sequence::*;
}

pub mod error;
pub mod sequence;
