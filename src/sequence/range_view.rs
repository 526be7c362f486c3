//! Live, position-translating windows into a sequence.

use std::fmt;

use super::indexed::{IndexedSequence, SequenceIter};
use crate::error::{CollectionError, Result};

/// A mutable window over `count` consecutive elements of another
/// [`IndexedSequence`], starting at position `start`.
///
/// Unlike [`BigList::get_range`](super::BigList::get_range), which copies,
/// a view copies nothing: every read and write is forwarded to the owner at
/// `start + index`. Insertions and removals made through the view grow or
/// shrink the view along with the owner. A view can itself be windowed with
/// [`RangeView::range`]; offsets compose, and edits through an inner view
/// keep every enclosing view's length correct.
///
/// While a view exists it holds the owner mutably borrowed, so the owner
/// cannot change behind the view's back.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::sequence::{BigList, IndexedSequence};
///
/// let mut list: BigList<i32> = (0..10).collect();
/// {
///     let mut view = list.range(2, 5).unwrap(); // elements 2..7
///     view.set(0, 20).unwrap();
///     view.remove_at(4).unwrap();               // removes 6
///     view.push(60).unwrap();                   // lands before 7
///     assert_eq!(view.len(), 5);
/// }
/// assert_eq!(list.to_vec(), vec![0, 1, 20, 3, 4, 5, 60, 7, 8, 9]);
/// ```
pub struct RangeView<'a, T> {
    owner: &'a mut dyn IndexedSequence<T>,
    start: usize,
    count: usize,
}

impl<'a, T> RangeView<'a, T> {
    /// Creates a view over `owner[start..start + count]`.
    ///
    /// # Errors
    ///
    /// Fails with a range violation naming `"start"` if `start` exceeds the
    /// owner's length, or `"count"` if the window runs past its end.
    pub fn new(owner: &'a mut dyn IndexedSequence<T>, start: usize, count: usize) -> Result<Self> {
        let length = owner.len();
        if start > length {
            return Err(CollectionError::out_of_range("start", start, length));
        }
        if count > length - start {
            return Err(CollectionError::out_of_range("count", count, length - start));
        }
        Ok(Self {
            owner,
            start,
            count,
        })
    }

    /// Position of the window's first element within the owner.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Returns a view over `self[start..start + count]`.
    ///
    /// # Errors
    ///
    /// Fails like [`RangeView::new`], relative to this view.
    pub fn range(&mut self, start: usize, count: usize) -> Result<RangeView<'_, T>> {
        RangeView::new(self, start, count)
    }

    /// Returns an iterator over the window's elements.
    pub fn iter(&self) -> SequenceIter<'_, T> {
        SequenceIter::new(self)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.count {
            return Err(CollectionError::out_of_range("index", index, self.count));
        }
        Ok(())
    }

    fn check_position(&self, index: usize) -> Result<()> {
        if index > self.count {
            return Err(CollectionError::out_of_range("index", index, self.count));
        }
        Ok(())
    }
}

impl<T> IndexedSequence<T> for RangeView<'_, T> {
    fn len(&self) -> usize {
        self.count
    }

    fn get(&self, index: usize) -> Result<&T> {
        self.check_index(index)?;
        self.owner.get(self.start + index)
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        self.check_index(index)?;
        self.owner.set(self.start + index, value)
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.check_position(index)?;
        self.owner.insert(self.start + index, value)?;
        self.count += 1;
        Ok(())
    }

    fn insert_many(&mut self, index: usize, values: Vec<T>) -> Result<()> {
        self.check_position(index)?;
        let added = values.len();
        self.owner.insert_many(self.start + index, values)?;
        self.count += added;
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;
        let removed = self.owner.remove_at(self.start + index)?;
        self.count -= 1;
        Ok(removed)
    }

    fn remove_range(&mut self, index: usize, count: usize) -> Result<()> {
        self.check_position(index)?;
        if count > self.count - index {
            return Err(CollectionError::out_of_range(
                "count",
                count,
                self.count - index,
            ));
        }
        self.owner.remove_range(self.start + index, count)?;
        self.count -= count;
        Ok(())
    }

    fn clear(&mut self) {
        // The window always lies inside the owner, so this cannot fail.
        let removed = self.owner.remove_range(self.start, self.count);
        debug_assert!(removed.is_ok(), "window outside its owner: {removed:?}");
        if removed.is_ok() {
            self.count = 0;
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RangeView<'_, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::BigList;
    use rstest::rstest;

    fn list() -> BigList<i32> {
        (0..20).collect()
    }

    #[rstest]
    fn test_reads_are_translated() {
        let mut source = list();
        let view = source.range(5, 10).unwrap();
        assert_eq!(view.len(), 10);
        assert_eq!(view.get(0), Ok(&5));
        assert_eq!(view.get(9), Ok(&14));
        assert_eq!(view.get(10).unwrap_err().parameter(), Some("index"));
    }

    #[rstest]
    #[case(21, 0, "start")]
    #[case(15, 6, "count")]
    fn test_new_rejects_windows_outside_owner(
        #[case] start: usize,
        #[case] count: usize,
        #[case] parameter: &str,
    ) {
        let mut source = list();
        let error = source.range(start, count).unwrap_err();
        assert_eq!(error.parameter(), Some(parameter));
    }

    #[rstest]
    fn test_nested_views_compose_offsets() {
        let mut source = list();
        {
            let mut outer = source.range(4, 10).unwrap();
            let mut inner = outer.range(2, 3).unwrap();
            assert_eq!(inner.get(0), Ok(&6));
            inner.insert(1, 100).unwrap();
            inner.remove_at(0).unwrap();
            assert_eq!(inner.len(), 3);
            assert_eq!(inner.to_vec(), vec![100, 7, 8]);
        }
        let expected: Vec<i32> = (0..6).chain([100]).chain(7..20).collect();
        assert_eq!(source.to_vec(), expected);
    }

    #[rstest]
    fn test_inner_edits_update_outer_length() {
        let mut source = list();
        let mut outer = source.range(0, 10).unwrap();
        {
            let mut inner = outer.range(8, 2).unwrap();
            inner.insert_many(2, vec![-1, -2]).unwrap();
        }
        assert_eq!(outer.len(), 12);
        assert_eq!(outer.get(11), Ok(&-2));
    }

    #[rstest]
    fn test_clear_removes_only_window() {
        let mut source = list();
        {
            let mut view = source.range(3, 4).unwrap();
            view.clear();
            assert!(view.is_empty());
        }
        let expected: Vec<i32> = (0..3).chain(7..20).collect();
        assert_eq!(source.to_vec(), expected);
    }

    #[rstest]
    fn test_iter_and_debug() {
        let mut source = list();
        let view = source.range(1, 3).unwrap();
        assert_eq!(view.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(view.iter().rev().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(format!("{view:?}"), "[1, 2, 3]");
    }
}
