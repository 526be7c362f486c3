//! The positional sequence capability shared by [`BigList`](super::BigList)
//! and [`RangeView`](super::RangeView).

use crate::error::{CollectionError, Result};

/// A mutable sequence addressed by position.
///
/// The trait is object safe so that a [`RangeView`](super::RangeView) can
/// wrap either a list or another view. Out-of-range positions are reported
/// as [`CollectionError::RangeViolation`] naming the offending parameter.
pub trait IndexedSequence<T> {
    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the sequence holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index >= len()`.
    fn get(&self, index: usize) -> Result<&T>;

    /// Replaces the element at `index`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Fails if `index >= len()`.
    fn set(&mut self, index: usize, value: T) -> Result<T>;

    /// Inserts `value` before position `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index > len()` or the sequence is full.
    fn insert(&mut self, index: usize, value: T) -> Result<()>;

    /// Inserts every element of `values`, in order, before position `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index > len()` or the elements would not fit.
    fn insert_many(&mut self, index: usize, values: Vec<T>) -> Result<()>;

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index >= len()`.
    fn remove_at(&mut self, index: usize) -> Result<T>;

    /// Removes `count` elements starting at `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index > len()` or `index + count > len()`.
    fn remove_range(&mut self, index: usize, count: usize) -> Result<()>;

    /// Removes every element.
    fn clear(&mut self);

    /// Appends `value` at the end.
    ///
    /// # Errors
    ///
    /// Fails if the sequence is full.
    fn push(&mut self, value: T) -> Result<()> {
        let end = self.len();
        self.insert(end, value)
    }

    /// Returns the position of the first element equal to `value`.
    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        (0..self.len()).find(|&index| self.get(index).is_ok_and(|element| element == value))
    }

    /// Returns the position of the first element `equal` considers equal to `value`.
    fn index_of_by(&self, value: &T, equal: &mut dyn FnMut(&T, &T) -> bool) -> Option<usize> {
        (0..self.len()).find(|&index| self.get(index).is_ok_and(|element| equal(element, value)))
    }

    /// Returns `true` if some element equals `value`.
    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Clones every element into `target`, starting at `destination_index`.
    ///
    /// # Errors
    ///
    /// Fails with [`CollectionError::InvalidArgument`] if `target` cannot
    /// hold `len()` elements from `destination_index` on.
    fn copy_into(&self, target: &mut [T], destination_index: usize) -> Result<()>
    where
        T: Clone,
    {
        let length = self.len();
        let end = destination_index
            .checked_add(length)
            .filter(|&end| end <= target.len())
            .ok_or(CollectionError::InvalidArgument {
                parameter: "target",
                reason: "destination is too small for the copied elements",
            })?;
        for (offset, slot) in target[destination_index..end].iter_mut().enumerate() {
            slot.clone_from(self.get(offset)?);
        }
        Ok(())
    }

    /// Clones the elements into a new `Vec`.
    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        (0..self.len())
            .filter_map(|index| {
                let element = self.get(index);
                debug_assert!(element.is_ok(), "position {index} below len() unreadable");
                element.ok().cloned()
            })
            .collect()
    }
}

/// A front-to-back iterator over any [`IndexedSequence`], one positional
/// lookup per element.
pub struct SequenceIter<'a, T> {
    sequence: &'a dyn IndexedSequence<T>,
    front: usize,
    back: usize,
}

impl<'a, T> SequenceIter<'a, T> {
    pub(crate) fn new(sequence: &'a dyn IndexedSequence<T>) -> Self {
        Self {
            sequence,
            front: 0,
            back: sequence.len(),
        }
    }
}

impl<'a, T> Iterator for SequenceIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let element = self.sequence.get(self.front);
        debug_assert!(element.is_ok(), "position {} below len() unreadable", self.front);
        let element = element.ok()?;
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for SequenceIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let element = self.sequence.get(self.back - 1);
        debug_assert!(element.is_ok(), "position {} below len() unreadable", self.back - 1);
        let element = element.ok()?;
        self.back -= 1;
        Some(element)
    }
}

impl<T> ExactSizeIterator for SequenceIter<'_, T> {}
