//! Large indexable sequences with copy-on-write structural sharing.
//!
//! This module provides [`BigList`], a mutable sequence backed by a balanced
//! tree of small element blocks. Positional access, insertion, removal,
//! splitting and concatenation all run in O(log N), and cloning a list is
//! O(1): the clone shares the whole tree and nodes are copied lazily, only
//! along the path a later mutation touches.
//!
//! - [`BigList`]: the sequence itself
//! - [`RangeView`]: a live, mutable window into a list (or into another view)
//! - [`IndexedSequence`]: the positional capability shared by both
//! - [`VersionedIter`]: a snapshot cursor that fails fast when its list changes
//! - [`ContentClone`]: opt-in element duplication for [`BigList::clone_contents`]
//!
//! # Structural Sharing
//!
//! ```rust
//! use lambars_collections::sequence::BigList;
//!
//! let mut list: BigList<i32> = (0..1000).collect();
//! let snapshot = list.clone(); // O(1)
//!
//! list.set(500, -1).unwrap();
//! assert_eq!(list[500], -1);
//! assert_eq!(snapshot[500], 500); // untouched
//!
//! // Concatenating a list with itself shares the same subtree twice.
//! let doubled = &snapshot + &snapshot;
//! assert_eq!(doubled.len(), 2000);
//! assert_eq!(doubled[1500], 500);
//! ```
//!
//! # Thread Safety
//!
//! Lists are single-writer values. With the `arc` feature enabled the node
//! handles are atomically reference counted, so independent lists that share
//! nodes may live on different threads; mutating one list value from several
//! threads at once is still unsupported.

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type used for tree nodes.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

// =============================================================================
// Constants
// =============================================================================

/// The largest number of elements a [`BigList`] can hold (2^31 - 2).
pub const MAXIMUM_COUNT: usize = (i32::MAX as usize) - 1;

/// Maximum number of elements stored in one leaf block.
pub(crate) const LEAF_CAPACITY: usize = 120;

static_assertions::const_assert!(LEAF_CAPACITY >= 4);
static_assertions::const_assert!(LEAF_CAPACITY < MAXIMUM_COUNT);

mod big_list;
mod clone_contents;
mod indexed;
mod iter;
mod node;
mod range_view;
mod sharing;
mod tree;

pub use big_list::BigList;
pub use clone_contents::ContentClone;
pub use indexed::IndexedSequence;
pub use indexed::SequenceIter;
pub use iter::IntoIter;
pub use iter::IteratorState;
pub use iter::Iter;
pub use iter::VersionedIter;
pub use range_view::RangeView;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_strong_count_tracks_sharing() {
        let handle: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&handle), 1);
        let shared = handle.clone();
        assert_eq!(ReferenceCounter::strong_count(&handle), 2);
        drop(shared);
        assert_eq!(ReferenceCounter::strong_count(&handle), 1);
    }
}


#[cfg(all(test, feature = "arc"))]
mod send_sync_tests {
    use super::BigList;

    static_assertions::assert_impl_all!(BigList<i32>: Send, Sync);
    static_assertions::assert_impl_all!(BigList<String>: Send, Sync);
}
