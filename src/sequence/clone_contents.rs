//! Element duplication for [`BigList::clone_contents`](super::BigList::clone_contents).
//!
//! `Clone` on a list is O(1) and shares every element with the original.
//! A deep copy instead asks each element for an independent duplicate of
//! itself through [`ContentClone`]. Elements may decline at run time (for
//! example a handle to a resource that cannot be duplicated), in which case
//! the whole copy fails and nothing is produced.

use std::rc::Rc;
use std::sync::Arc;

/// The capability to produce an independent copy of a value.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::sequence::{BigList, ContentClone};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Account {
///     name: String,
///     frozen: bool,
/// }
///
/// impl ContentClone for Account {
///     fn clone_content(&self) -> Option<Self> {
///         (!self.frozen).then(|| self.clone())
///     }
/// }
///
/// let list: BigList<Account> = vec![
///     Account { name: "alice".into(), frozen: false },
///     Account { name: "bob".into(), frozen: true },
/// ]
/// .into_iter()
/// .collect();
///
/// assert!(list.clone_contents().is_err());
/// ```
pub trait ContentClone: Sized {
    /// Returns an independent copy of `self`, or `None` if this value cannot
    /// be duplicated.
    fn clone_content(&self) -> Option<Self>;
}

macro_rules! impl_content_clone_for_copy {
    ($($type:ty),* $(,)?) => {
        $(
            impl ContentClone for $type {
                #[inline]
                fn clone_content(&self) -> Option<Self> {
                    Some(*self)
                }
            }
        )*
    };
}

impl_content_clone_for_copy!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, (),
);

impl ContentClone for String {
    fn clone_content(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl<T: ContentClone> ContentClone for Option<T> {
    fn clone_content(&self) -> Option<Self> {
        match self {
            Some(value) => value.clone_content().map(Some),
            None => Some(None),
        }
    }
}

impl<T: ContentClone> ContentClone for Box<T> {
    fn clone_content(&self) -> Option<Self> {
        self.as_ref().clone_content().map(Self::new)
    }
}

impl<T: ContentClone> ContentClone for Vec<T> {
    fn clone_content(&self) -> Option<Self> {
        self.iter().map(ContentClone::clone_content).collect()
    }
}

/// Allocates a fresh `Rc` around a copy of the pointee, so the copy no
/// longer aliases the original.
impl<T: ContentClone> ContentClone for Rc<T> {
    fn clone_content(&self) -> Option<Self> {
        self.as_ref().clone_content().map(Self::new)
    }
}

impl<T: ContentClone> ContentClone for Arc<T> {
    fn clone_content(&self) -> Option<Self> {
        self.as_ref().clone_content().map(Self::new)
    }
}

impl<A: ContentClone, B: ContentClone> ContentClone for (A, B) {
    fn clone_content(&self) -> Option<Self> {
        Some((self.0.clone_content()?, self.1.clone_content()?))
    }
}
