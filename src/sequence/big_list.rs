//! The [`BigList`] sequence type.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops::{Add, Index};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::clone_contents::ContentClone;
use super::indexed::IndexedSequence;
use super::iter::{IntoIter, Iter, VersionedIter};
use super::node::{Node, NodeRef};
use super::range_view::RangeView;
use super::sharing::{exclusive_leaf, is_shared, take_children, take_elements};
use super::{MAXIMUM_COUNT, tree};
use crate::error::{CollectionError, Result};

/// Source of per-value identities, used to tie a [`VersionedIter`] to the
/// list it was created from.
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(0);

fn next_identity() -> u64 {
    NEXT_IDENTITY.fetch_add(1, AtomicOrdering::Relaxed)
}

/// A mutable sequence of up to [`MAXIMUM_COUNT`] elements with O(log N)
/// positional editing and O(1) cloning.
///
/// The elements live in the leaves of a balanced binary tree whose branches
/// cache their subtree sizes. Cloning a list, extracting a sub-range,
/// concatenating, or repeating a list all share existing subtrees instead
/// of copying them; a later mutation copies only the nodes on the path it
/// touches, so lists that share nodes never observe each other's changes.
///
/// # Time Complexity
///
/// | Operation                      | Complexity           |
/// |--------------------------------|----------------------|
/// | `clone`                        | O(1)                 |
/// | `len`, `is_empty`              | O(1)                 |
/// | `get`, `set`                   | O(log N)             |
/// | `push`, `push_front`, `insert` | O(log N)             |
/// | `remove_at`                    | O(log N)             |
/// | `insert_many`                  | O(M + log N)         |
/// | `insert_list`, `concat`        | O(log N + log M)     |
/// | `remove_range`, `get_range`    | O(log N)             |
/// | `repeat_list`                  | O(log N · log copies) |
/// | `iter`                         | O(N) to exhaust      |
///
/// # Versions
///
/// Every successful structural mutation (insert, remove, set, clear,
/// sort, ...) increments the list's [`version`](BigList::version). A
/// [`VersionedIter`] compares versions to detect that the list changed
/// under it. The version belongs to this value alone: mutating a clone
/// never changes it.
///
/// # Thread Safety
///
/// A list is not safe to mutate from several threads at once. With the
/// `arc` feature, distinct lists that share nodes may be used from
/// different threads.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::sequence::BigList;
///
/// let mut list = BigList::new();
/// list.push(2).unwrap();
/// list.push(3).unwrap();
/// list.push_front(1).unwrap();
/// assert_eq!(list.to_vec(), vec![1, 2, 3]);
///
/// let copy = list.clone();
/// list.remove_at(0).unwrap();
/// assert_eq!(list.len(), 2);
/// assert_eq!(copy.len(), 3);
/// ```
pub struct BigList<T> {
    root: Option<NodeRef<T>>,
    version: u64,
    identity: u64,
}

impl<T> BigList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::from_root(None)
    }

    fn from_root(root: Option<NodeRef<T>>) -> Self {
        Self {
            root,
            version: 0,
            identity: next_identity(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.len())
    }

    /// Returns `true` if the list holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the current version stamp.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub(crate) const fn identity(&self) -> u64 {
        self.identity
    }

    #[inline]
    const fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let length = self.len();
        if index >= length {
            return Err(CollectionError::out_of_range("index", index, length));
        }
        Ok(())
    }

    fn check_position(&self, index: usize) -> Result<()> {
        let length = self.len();
        if index > length {
            return Err(CollectionError::out_of_range("index", index, length));
        }
        Ok(())
    }

    fn check_range(&self, index: usize, count: usize) -> Result<()> {
        self.check_position(index)?;
        let available = self.len() - index;
        if count > available {
            return Err(CollectionError::out_of_range("count", count, available));
        }
        Ok(())
    }

    fn check_growth(&self, additional: usize) -> Result<()> {
        check_total(self.len() as u128 + additional as u128)
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    pub fn get(&self, index: usize) -> Result<&T> {
        self.check_index(index)?;
        self.root
            .as_deref()
            .map(|root| root.get(index))
            .ok_or(CollectionError::out_of_range("index", index, 0))
    }

    /// Returns the first element, or `None` if the list is empty.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Returns the last element, or `None` if the list is empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.get(index).ok())
    }

    /// Returns a double-ended iterator over the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_deref(), 0, self.len())
    }

    /// Returns an iterator over positions `start..start + count`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"start"` or `"count"` if the
    /// range does not lie inside the list.
    pub fn iter_range(&self, start: usize, count: usize) -> Result<Iter<'_, T>> {
        let length = self.len();
        if start > length {
            return Err(CollectionError::out_of_range("start", start, length));
        }
        if count > length - start {
            return Err(CollectionError::out_of_range("count", count, length - start));
        }
        Ok(Iter::new(self.root.as_deref(), start, count))
    }

    /// Returns a fail-fast cursor over the current contents.
    ///
    /// See [`VersionedIter`] for the protocol.
    #[must_use]
    pub fn versioned_iter(&self) -> VersionedIter<T> {
        VersionedIter::new(self.root.clone(), self.version, self.identity)
    }

    /// Returns a live view of `count` elements starting at `start`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"start"` or `"count"` if the
    /// window does not lie inside the list.
    pub fn range(&mut self, start: usize, count: usize) -> Result<RangeView<'_, T>>
    where
        T: Clone,
    {
        RangeView::new(self, start, count)
    }

    /// Calls `action` on every element in order.
    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(&T),
    {
        if let Some(root) = &self.root {
            root.for_each_block(&mut |block: &[T]| block.iter().for_each(&mut action));
        }
    }

    /// Returns `true` if some element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Returns the position of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_index(|element| element == value)
    }

    /// Returns the position of the last element equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_last_index(|element| element == value)
    }

    /// Returns the first element satisfying `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|element| predicate(element))
    }

    /// Returns the last element satisfying `predicate`.
    pub fn find_last<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().rev().find(|element| predicate(element))
    }

    /// Returns the position of the first element satisfying `predicate`.
    pub fn find_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().position(predicate)
    }

    /// Returns the position of the last element satisfying `predicate`.
    pub fn find_last_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().rposition(predicate)
    }

    /// Returns `true` if any element satisfies `predicate`.
    pub fn exists<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().any(predicate)
    }

    /// Returns `true` if every element satisfies `predicate`; vacuously
    /// `true` for an empty list.
    pub fn true_for_all<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().all(predicate)
    }

    /// Binary-searches a list sorted by `compare`.
    ///
    /// `compare` reports how an element orders relative to the target.
    /// Returns `Ok(index)` of a matching element.
    ///
    /// # Errors
    ///
    /// Returns `Err(index)` of the position where the target could be
    /// inserted to keep the order when no element matches.
    ///
    /// # Complexity
    ///
    /// O(log² N)
    pub fn binary_search_by<F>(&self, mut compare: F) -> std::result::Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        let Some(root) = self.root.as_deref() else {
            return Err(0);
        };
        let mut low = 0;
        let mut high = root.len();
        while low < high {
            let middle = low + (high - low) / 2;
            match compare(root.get(middle)) {
                Ordering::Less => low = middle + 1,
                Ordering::Greater => high = middle,
                Ordering::Equal => return Ok(middle),
            }
        }
        Err(low)
    }

    /// Binary-searches a sorted list for `value`.
    ///
    /// # Errors
    ///
    /// Returns `Err(index)` with the insertion point when `value` is absent.
    pub fn binary_search(&self, value: &T) -> std::result::Result<usize, usize>
    where
        T: Ord,
    {
        self.binary_search_by(|element| element.cmp(value))
    }

    /// Verifies the structural invariants of the underlying tree: cached
    /// weights, AVL balance, leaf bounds, and the capacity limit.
    ///
    /// Returns a description of the first violation found.
    ///
    /// # Errors
    ///
    /// Returns `Err` describing the violation.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        root.check()?;
        if root.len() == 0 || root.len() > MAXIMUM_COUNT {
            return Err(format!("list holds {} elements", root.len()));
        }
        Ok(())
    }
}

fn check_total(requested: u128) -> Result<()> {
    if requested > MAXIMUM_COUNT as u128 {
        log::debug!("big list growth to {requested} elements rejected");
        return Err(CollectionError::CapacityExceeded {
            requested,
            maximum: MAXIMUM_COUNT,
        });
    }
    Ok(())
}

impl<T: Clone> BigList<T> {
    /// Creates a list holding the elements of `elements` in order.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if `elements` holds
    /// more than [`MAXIMUM_COUNT`] elements.
    pub fn from_vec(elements: Vec<T>) -> Result<Self> {
        check_total(elements.len() as u128)?;
        Ok(Self::from_root(Node::build(elements)))
    }

    /// Creates a list from a finite iterator.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the iterator
    /// yields more than [`MAXIMUM_COUNT`] elements.
    pub fn try_from_iter<I>(elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let collected: Vec<T> = elements.into_iter().take(MAXIMUM_COUNT + 1).collect();
        Self::from_vec(collected)
    }

    /// Creates a list holding `copies` back-to-back repetitions of
    /// `elements`.
    ///
    /// The repetitions share one copy of the elements, so memory use does
    /// not grow with `copies`.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the result would
    /// hold more than [`MAXIMUM_COUNT`] elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::sequence::BigList;
    ///
    /// let list = BigList::repeat([1, 2], 3).unwrap();
    /// assert_eq!(list.to_vec(), vec![1, 2, 1, 2, 1, 2]);
    /// ```
    pub fn repeat<I>(elements: I, copies: usize) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let template = Self::try_from_iter(elements)?;
        Self::repeat_list(&template, copies)
    }

    /// Creates a list holding `copies` back-to-back repetitions of `list`,
    /// sharing `list`'s nodes.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the result would
    /// hold more than [`MAXIMUM_COUNT`] elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_collections::sequence::{BigList, MAXIMUM_COUNT};
    ///
    /// let one: BigList<u8> = BigList::repeat([0], 1).unwrap();
    /// let huge = BigList::repeat_list(&one, MAXIMUM_COUNT).unwrap();
    /// assert_eq!(huge.len(), MAXIMUM_COUNT);
    /// assert!(BigList::repeat_list(&one, MAXIMUM_COUNT + 1).is_err());
    /// ```
    pub fn repeat_list(list: &Self, copies: usize) -> Result<Self> {
        check_total(list.len() as u128 * copies as u128)?;
        let root = list
            .root
            .clone()
            .and_then(|template| tree::repeat(template, copies));
        Ok(Self::from_root(root))
    }

    /// Replaces the element at `index`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        self.check_index(index)?;
        let Some(root) = self.root.as_mut() else {
            return Err(CollectionError::out_of_range("index", index, 0));
        };
        let previous = tree::update(root, index, value);
        self.touch();
        Ok(previous)
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// Counts as a mutation: the version is incremented and any nodes shared
    /// with other lists along the path are copied first.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index >= len()`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_index(index)?;
        self.touch();
        let Some(root) = self.root.as_mut() else {
            return Err(CollectionError::out_of_range("index", index, 0));
        };
        let (block, offset) = exclusive_leaf(root, index);
        Ok(&mut block[offset])
    }

    /// Appends an element at the end.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the list is full.
    pub fn push(&mut self, value: T) -> Result<()> {
        let end = self.len();
        self.insert(end, value)
    }

    /// Prepends an element at the front.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the list is full.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        self.insert(0, value)
    }

    /// Inserts `value` before position `index`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index > len()`, or
    /// with [`CollectionError::CapacityExceeded`] if the list is full.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.check_position(index)?;
        self.check_growth(1)?;
        match self.root.as_mut() {
            Some(root) => tree::insert(root, index, value),
            None => self.root = Some(Node::leaf(vec![value])),
        }
        self.touch();
        Ok(())
    }

    /// Inserts every element of `values`, in order, before position `index`.
    ///
    /// Inserting nothing is a no-op, but `index` is still validated.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index > len()`, or
    /// with [`CollectionError::CapacityExceeded`] if the elements would not
    /// fit.
    pub fn insert_many<I>(&mut self, index: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.check_position(index)?;
        // One element past the free space is enough to detect overflow.
        let free = MAXIMUM_COUNT - self.len();
        let values: Vec<T> = values.into_iter().take(free + 1).collect();
        self.check_growth(values.len())?;
        let Some(middle) = Node::build(values) else {
            return Ok(());
        };
        self.root = Some(tree::splice(self.root.take(), index, middle));
        self.touch();
        Ok(())
    }

    /// Appends every element of `values` at the end.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the elements would
    /// not fit.
    pub fn extend_back<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let end = self.len();
        self.insert_many(end, values)
    }

    /// Prepends every element of `values`, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the elements would
    /// not fit.
    pub fn extend_front<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.insert_many(0, values)
    }

    /// Inserts the contents of `other` before position `index`, sharing
    /// `other`'s nodes.
    ///
    /// To insert a list into itself, pass a clone: `list.insert_list(i,
    /// &list.clone())` costs O(log N).
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index > len()`, or
    /// with [`CollectionError::CapacityExceeded`] if the result would not
    /// fit.
    pub fn insert_list(&mut self, index: usize, other: &Self) -> Result<()> {
        self.check_position(index)?;
        self.check_growth(other.len())?;
        let Some(middle) = other.root.clone() else {
            return Ok(());
        };
        self.root = Some(tree::splice(self.root.take(), index, middle));
        self.touch();
        Ok(())
    }

    /// Appends the contents of `other`, sharing its nodes.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the result would
    /// not fit.
    pub fn append_list(&mut self, other: &Self) -> Result<()> {
        let end = self.len();
        self.insert_list(end, other)
    }

    /// Prepends the contents of `other`, sharing its nodes.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the result would
    /// not fit.
    pub fn prepend_list(&mut self, other: &Self) -> Result<()> {
        self.insert_list(0, other)
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;
        let Some(root) = self.root.as_mut() else {
            return Err(CollectionError::out_of_range("index", index, 0));
        };
        let removed = tree::remove(root, index);
        if root.len() == 0 {
            self.root = None;
        }
        self.touch();
        Ok(removed)
    }

    /// Removes `count` elements starting at `index`.
    ///
    /// Removing nothing is a no-op, but the bounds are still validated.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index > len()`, or
    /// `"count"` if `index + count > len()`.
    pub fn remove_range(&mut self, index: usize, count: usize) -> Result<()> {
        self.check_range(index, count)?;
        if count == 0 {
            return Ok(());
        }
        self.root = self
            .root
            .take()
            .and_then(|root| tree::remove_range(root, index, count));
        self.touch();
        Ok(())
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.len().checked_sub(1)?;
        self.remove_at(last).ok()
    }

    /// Removes and returns the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.remove_at(0).ok()
    }

    /// Removes the first element equal to `value`, returning whether one was
    /// found.
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value)
            .is_some_and(|index| self.remove_at(index).is_ok())
    }

    /// Removes every element satisfying `predicate`, returning how many were
    /// removed.
    pub fn remove_all<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let original = self.len();
        let kept: Vec<T> = self
            .iter()
            .filter(|element| !predicate(element))
            .cloned()
            .collect();
        let removed = original - kept.len();
        if removed > 0 {
            self.root = Node::build(kept);
            self.touch();
        }
        removed
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        if self.root.take().is_some() {
            self.touch();
        }
    }

    /// Returns a new list holding this list followed by `other`.
    ///
    /// Both operands' nodes are shared with the result; `list.concat(&list)`
    /// is valid and doubles the list.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CapacityExceeded`] if the result would
    /// not fit.
    pub fn concat(&self, other: &Self) -> Result<Self> {
        check_total(self.len() as u128 + other.len() as u128)?;
        Ok(Self::from_root(tree::concat_optional(
            self.root.clone(),
            other.root.clone(),
        )))
    }

    /// Returns an independent list holding positions `index..index + count`.
    ///
    /// The result shares nodes with this list but later mutations of either
    /// list are invisible to the other. Use [`BigList::range`] for a live
    /// window instead.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` if `index > len()`, or
    /// `"count"` if `index + count > len()`.
    pub fn get_range(&self, index: usize, count: usize) -> Result<Self> {
        self.check_range(index, count)?;
        let root = self
            .root
            .as_ref()
            .and_then(|root| tree::sub_range(root, index, count));
        Ok(Self::from_root(root))
    }

    /// Returns a list holding independent copies of every element.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::CloneUnsupported`] naming the first
    /// element whose [`ContentClone::clone_content`] declined. This list is
    /// left untouched either way.
    pub fn clone_contents(&self) -> Result<Self>
    where
        T: ContentClone,
    {
        let mut copies = Vec::with_capacity(self.len());
        for (index, element) in self.iter().enumerate() {
            let Some(copy) = element.clone_content() else {
                log::debug!("big list deep clone refused by element {index}");
                return Err(CollectionError::CloneUnsupported { index });
            };
            copies.push(copy);
        }
        Ok(Self::from_root(Node::build(copies)))
    }

    /// Sorts the list with a caller-supplied ordering.
    ///
    /// The sort is stable. `compare` must be a pure function; it may be
    /// called any number of times, on any pair of elements.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let length = self.len();
        self.rebuild_range(0, length, |elements| elements.sort_by(compare));
    }

    /// Sorts the list in ascending order.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(Ord::cmp);
    }

    /// Sorts positions `index..index + count` with `compare`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` or `"count"` if the
    /// range does not lie inside the list.
    pub fn sort_range_by<F>(&mut self, index: usize, count: usize, compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.check_range(index, count)?;
        self.rebuild_range(index, count, |elements| elements.sort_by(compare));
        Ok(())
    }

    /// Reverses the order of the elements.
    pub fn reverse(&mut self) {
        let length = self.len();
        self.rebuild_range(0, length, <[T]>::reverse);
    }

    /// Reverses the order of positions `index..index + count`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` or `"count"` if the
    /// range does not lie inside the list.
    pub fn reverse_range(&mut self, index: usize, count: usize) -> Result<()> {
        self.check_range(index, count)?;
        self.rebuild_range(index, count, <[T]>::reverse);
        Ok(())
    }

    /// Rewrites an in-bounds range through a flat buffer. Ranges shorter
    /// than two elements are left alone.
    fn rebuild_range<F>(&mut self, index: usize, count: usize, rearrange: F)
    where
        F: FnOnce(&mut [T]),
    {
        if count < 2 {
            return;
        }
        let Some(root) = self.root.take() else {
            return;
        };
        let (before, rest) = tree::split(root, index);
        let (middle, after) = rest.map_or((None, None), |rest| tree::split(rest, count));
        let mut elements = middle.map(take_all).unwrap_or_default();
        rearrange(&mut elements);
        let middle = Node::build(elements);
        self.root = tree::concat_optional(tree::concat_optional(before, middle), after);
        self.touch();
    }

    /// Returns a list of `function` applied to every element.
    pub fn map<U, F>(&self, mut function: F) -> BigList<U>
    where
        F: FnMut(&T) -> U,
    {
        let mut mapped = Vec::with_capacity(self.len());
        self.for_each(|element| mapped.push(function(element)));
        BigList::from_root(Node::build(mapped))
    }

    /// Returns a list of the elements satisfying `predicate`, in order.
    pub fn find_all<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let matching: Vec<T> = self
            .iter()
            .filter(|element| predicate(element))
            .cloned()
            .collect();
        Self::from_root(Node::build(matching))
    }

    /// Clones the elements into a new `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let mut elements = Vec::with_capacity(self.len());
        if let Some(root) = &self.root {
            root.for_each_block(&mut |block: &[T]| elements.extend_from_slice(block));
        }
        elements
    }

    /// Converts the list into a `Vec`, moving elements out of nodes this
    /// list owns exclusively.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<T> {
        match self.root.take() {
            Some(root) if is_shared(&root) => {
                self.root = Some(root);
                self.to_vec()
            }
            Some(root) => take_all(root),
            None => Vec::new(),
        }
    }

    /// Clones every element into `target`, starting at `destination_index`.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::InvalidArgument`] if `target` cannot
    /// hold `len()` elements from `destination_index` on.
    pub fn copy_into(&self, target: &mut [T], destination_index: usize) -> Result<()> {
        self.copy_range_into(0, target, destination_index, self.len())
    }

    /// Clones positions `index..index + count` into `target`, starting at
    /// `destination_index`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"index"` or `"count"` if the
    /// source range does not lie inside the list, or with
    /// [`CollectionError::InvalidArgument`] if `target` is too small.
    pub fn copy_range_into(
        &self,
        index: usize,
        target: &mut [T],
        destination_index: usize,
        count: usize,
    ) -> Result<()> {
        self.check_range(index, count)?;
        let end = destination_index
            .checked_add(count)
            .filter(|&end| end <= target.len())
            .ok_or(CollectionError::InvalidArgument {
                parameter: "target",
                reason: "destination is too small for the copied elements",
            })?;
        let source = Iter::new(self.root.as_deref(), index, count);
        for (slot, element) in target[destination_index..end].iter_mut().zip(source) {
            slot.clone_from(element);
        }
        Ok(())
    }
}

/// Flattens a subtree into a `Vec`, moving blocks out of exclusive leaves.
fn take_all<T: Clone>(node: NodeRef<T>) -> Vec<T> {
    let mut elements = Vec::with_capacity(node.len());
    let mut pending = vec![node];
    while let Some(node) = pending.pop() {
        if node.is_leaf() {
            elements.extend(take_elements(node));
        } else if let Ok((left, right)) = take_children(node) {
            pending.push(right);
            pending.push(left);
        }
    }
    elements
}

// =============================================================================
// IndexedSequence
// =============================================================================

impl<T: Clone> IndexedSequence<T> for BigList<T> {
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn get(&self, index: usize) -> Result<&T> {
        Self::get(self, index)
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        Self::set(self, index, value)
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        Self::insert(self, index, value)
    }

    fn insert_many(&mut self, index: usize, values: Vec<T>) -> Result<()> {
        Self::insert_many(self, index, values)
    }

    fn remove_at(&mut self, index: usize) -> Result<T> {
        Self::remove_at(self, index)
    }

    fn remove_range(&mut self, index: usize, count: usize) -> Result<()> {
        Self::remove_range(self, index, count)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

/// Clones in O(1) by sharing the whole tree.
///
/// The clone is a new value with its own identity: iterators created from
/// the original do not accept it, and mutations of either list are never
/// visible in the other.
impl<T> Clone for BigList<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            version: self.version,
            identity: next_identity(),
        }
    }
}

impl<T> Default for BigList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects an iterator into a list.
///
/// # Panics
///
/// Panics if the iterator yields more than [`MAXIMUM_COUNT`] elements; use
/// [`BigList::try_from_iter`] to handle that case.
impl<T: Clone> FromIterator<T> for BigList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        match Self::try_from_iter(iter) {
            Ok(list) => list,
            Err(error) => panic!("{error}"),
        }
    }
}

/// # Panics
///
/// Panics if the vector holds more than [`MAXIMUM_COUNT`] elements.
impl<T: Clone> From<Vec<T>> for BigList<T> {
    fn from(elements: Vec<T>) -> Self {
        match Self::from_vec(elements) {
            Ok(list) => list,
            Err(error) => panic!("{error}"),
        }
    }
}

/// # Panics
///
/// Panics if the slice holds more than [`MAXIMUM_COUNT`] elements.
impl<T: Clone> From<&[T]> for BigList<T> {
    fn from(elements: &[T]) -> Self {
        Self::from(elements.to_vec())
    }
}

/// Appends every element of an iterator.
///
/// # Panics
///
/// Panics if the list would exceed [`MAXIMUM_COUNT`] elements; use
/// [`BigList::extend_back`] to handle that case.
impl<T: Clone> Extend<T> for BigList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(error) = self.extend_back(iter) {
            panic!("{error}");
        }
    }
}

/// Concatenates two lists into a new one, sharing both operands' nodes.
///
/// # Panics
///
/// Panics if the result would exceed [`MAXIMUM_COUNT`] elements; use
/// [`BigList::concat`] to handle that case.
impl<T: Clone> Add for &BigList<T> {
    type Output = BigList<T>;

    fn add(self, other: Self) -> Self::Output {
        match self.concat(other) {
            Ok(list) => list,
            Err(error) => panic!("{error}"),
        }
    }
}

/// # Panics
///
/// Panics if `index` is out of bounds; use [`BigList::get`] to handle that
/// case.
impl<T> Index<usize> for BigList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Ok(element) => element,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T: Clone> IntoIterator for BigList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.into_vec().into_iter())
    }
}

impl<'a, T> IntoIterator for &'a BigList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for BigList<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for BigList<T> {}

impl<T: Hash> Hash for BigList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BigList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for BigList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for BigList<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct BigListVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<T> BigListVisitor<T> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for BigListVisitor<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    type Value = BigList<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut elements = Vec::with_capacity(capacity);
        while let Some(element) = seq.next_element()? {
            if elements.len() == MAXIMUM_COUNT {
                return Err(serde::de::Error::custom(format!(
                    "sequence holds more than {MAXIMUM_COUNT} elements"
                )));
            }
            elements.push(element);
        }
        BigList::from_vec(elements).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for BigList<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(BigListVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
