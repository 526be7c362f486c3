//! Iterators over [`BigList`].
//!
//! - [`Iter`]: borrowing, double-ended iteration. The borrow checker already
//!   rules out mutation while it is alive, so it carries no version checks.
//! - [`IntoIter`]: owning iteration.
//! - [`VersionedIter`]: a detached cursor over a snapshot of the list that
//!   fails fast once the list it came from is structurally modified.

use std::iter::FusedIterator;
use std::slice;

use smallvec::SmallVec;

use super::BigList;
use super::node::{Node, NodeRef};
use crate::error::{CollectionError, Result};

/// Inline capacity of traversal stacks; an AVL tree over the maximum
/// element count stays below this height.
const STACK_DEPTH: usize = 48;

// =============================================================================
// Iter
// =============================================================================

/// A borrowing iterator over the elements of a [`BigList`].
///
/// Created by [`BigList::iter`] and [`BigList::iter_range`]. Walking the
/// whole list takes O(N); each leaf block is visited once.
pub struct Iter<'a, T> {
    /// Subtrees to the right of the front cursor, innermost last.
    front_stack: SmallVec<[&'a Node<T>; STACK_DEPTH]>,
    front: slice::Iter<'a, T>,
    /// Subtrees to the left of the back cursor, innermost last.
    back_stack: SmallVec<[&'a Node<T>; STACK_DEPTH]>,
    back: slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    /// Iterates positions `start..start + count`; the range must lie inside `root`.
    pub(crate) fn new(root: Option<&'a Node<T>>, start: usize, count: usize) -> Self {
        let mut iterator = Self {
            front_stack: SmallVec::new(),
            front: slice::Iter::default(),
            back_stack: SmallVec::new(),
            back: slice::Iter::default(),
            remaining: count,
        };
        if let Some(root) = root
            && count > 0
        {
            iterator.front = descend_front(&mut iterator.front_stack, root, start);
            iterator.back = descend_back(&mut iterator.back_stack, root, start + count - 1);
        }
        iterator
    }
}

/// Walks to position `index`, remembering every right sibling passed.
fn descend_front<'a, T>(
    stack: &mut SmallVec<[&'a Node<T>; STACK_DEPTH]>,
    mut node: &'a Node<T>,
    mut index: usize,
) -> slice::Iter<'a, T> {
    loop {
        match node {
            Node::Leaf(elements) => return elements[index..].iter(),
            Node::Branch { left, right, .. } => {
                let left_length = left.len();
                if index < left_length {
                    stack.push(&**right);
                    node = &**left;
                } else {
                    index -= left_length;
                    node = &**right;
                }
            }
        }
    }
}

/// Walks to position `index`, remembering every left sibling passed.
fn descend_back<'a, T>(
    stack: &mut SmallVec<[&'a Node<T>; STACK_DEPTH]>,
    mut node: &'a Node<T>,
    mut index: usize,
) -> slice::Iter<'a, T> {
    loop {
        match node {
            Node::Leaf(elements) => return elements[..=index].iter(),
            Node::Branch { left, right, .. } => {
                let left_length = left.len();
                if index < left_length {
                    node = &**left;
                } else {
                    stack.push(&**left);
                    index -= left_length;
                    node = &**right;
                }
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(element) = self.front.next() {
                self.remaining -= 1;
                return Some(element);
            }
            let node = self.front_stack.pop()?;
            self.front = descend_front(&mut self.front_stack, node, 0);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(element) = self.back.next_back() {
                self.remaining -= 1;
                return Some(element);
            }
            let node = self.back_stack.pop()?;
            self.back = descend_back(&mut self.back_stack, node, node.len() - 1);
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front_stack: self.front_stack.clone(),
            front: self.front.clone(),
            back_stack: self.back_stack.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

// =============================================================================
// IntoIter
// =============================================================================

/// An owning iterator over the elements of a [`BigList`].
///
/// Leaf blocks owned only by this list are moved out; shared blocks are
/// cloned.
pub struct IntoIter<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> IntoIter<T> {
    pub(crate) const fn new(inner: std::vec::IntoIter<T>) -> Self {
        Self { inner }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

// =============================================================================
// VersionedIter
// =============================================================================

/// Lifecycle of a [`VersionedIter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IteratorState {
    /// No element has been requested yet.
    Created,
    /// At least one element has been produced.
    Iterating,
    /// Every element has been produced.
    Exhausted,
    /// The list was modified; the cursor can make no further progress.
    Failed,
}

/// A fail-fast cursor over the contents a [`BigList`] had when the cursor
/// was created.
///
/// The cursor holds its own O(1) snapshot of the tree and so does not borrow
/// the list. Each step is handed the list it came from and compares that
/// list's version with the one captured at creation; any structural change
/// in between fails the step with
/// [`CollectionError::ConcurrentModification`] and leaves the cursor
/// permanently [`IteratorState::Failed`]. Changes to other lists, including
/// clones that share nodes with this one, go unnoticed.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::sequence::{BigList, IteratorState};
///
/// let mut list: BigList<i32> = (1..=4).collect();
/// let mut cursor = list.versioned_iter();
///
/// assert_eq!(cursor.next_element(&list).unwrap(), Some(1));
/// list.push(5).unwrap();
/// assert!(cursor.next_element(&list).is_err());
/// assert_eq!(cursor.state(), IteratorState::Failed);
/// ```
pub struct VersionedIter<T> {
    /// Subtrees still to visit, next one last.
    pending: SmallVec<[NodeRef<T>; STACK_DEPTH]>,
    block: Option<NodeRef<T>>,
    offset: usize,
    remaining: usize,
    captured_version: u64,
    identity: u64,
    state: IteratorState,
}

impl<T> VersionedIter<T> {
    pub(crate) fn new(root: Option<NodeRef<T>>, version: u64, identity: u64) -> Self {
        let remaining = root.as_ref().map_or(0, |root| root.len());
        Self {
            pending: root.into_iter().collect(),
            block: None,
            offset: 0,
            remaining,
            captured_version: version,
            identity,
            state: IteratorState::Created,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> IteratorState {
        self.state
    }

    /// Returns the version of the list captured at creation.
    #[must_use]
    pub const fn captured_version(&self) -> u64 {
        self.captured_version
    }

    /// Returns the number of elements not yet produced.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Moves to the leftmost leaf of the next pending subtree.
    fn advance_block(&mut self) -> bool {
        let Some(mut node) = self.pending.pop() else {
            self.block = None;
            return false;
        };
        loop {
            let next = match node.as_ref() {
                Node::Leaf(_) => break,
                Node::Branch { left, right, .. } => {
                    self.pending.push(right.clone());
                    left.clone()
                }
            };
            node = next;
        }
        self.block = Some(node);
        self.offset = 0;
        true
    }
}

impl<T: Clone> VersionedIter<T> {
    /// Produces the next element, or `Ok(None)` once every element has been
    /// produced.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::InvalidArgument`] if `owner` is not the list this
    ///   cursor was created from.
    /// - [`CollectionError::ConcurrentModification`] if `owner` has been
    ///   structurally modified since the cursor was created. Every later
    ///   call fails the same way.
    pub fn next_element(&mut self, owner: &BigList<T>) -> Result<Option<T>> {
        if owner.identity() != self.identity {
            return Err(CollectionError::InvalidArgument {
                parameter: "owner",
                reason: "the iterator was created from a different list",
            });
        }

        let current = owner.version();
        if self.state == IteratorState::Failed || current != self.captured_version {
            if self.state != IteratorState::Failed {
                log::debug!(
                    "big list modified during iteration: version {} became {current}",
                    self.captured_version
                );
            }
            self.state = IteratorState::Failed;
            return Err(CollectionError::ConcurrentModification {
                captured: self.captured_version,
                current,
            });
        }

        if self.state == IteratorState::Exhausted {
            return Ok(None);
        }

        loop {
            if let Some(Node::Leaf(elements)) = self.block.as_deref()
                && let Some(element) = elements.get(self.offset)
            {
                let element = element.clone();
                self.offset += 1;
                self.remaining -= 1;
                self.state = IteratorState::Iterating;
                return Ok(Some(element));
            }
            if !self.advance_block() {
                self.state = IteratorState::Exhausted;
                return Ok(None);
            }
        }
    }
}
