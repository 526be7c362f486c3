//! Error types for the collections in this crate.
//!
//! Every fallible operation returns [`Result`], whose error is a
//! [`CollectionError`]. Errors fall into three kinds (see [`ErrorKind`]):
//!
//! - **Range violations**: an index or count argument lies outside the valid
//!   bounds of the operation. The offending parameter is named (`"index"`,
//!   `"count"` or `"start"`).
//! - **State conflicts**: the operation cannot proceed given the current
//!   state of the collection (capacity exhausted, the list was modified while
//!   being iterated, or an element refused to be deep-cloned).
//! - **Invalid arguments**: an argument is unusable as given, such as a
//!   destination buffer that is too small.
//!
//! Operations that fail leave the collection exactly as it was.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// The broad category of a [`CollectionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An index or count argument is out of bounds.
    RangeViolation,
    /// The operation conflicts with the current state of the collection.
    StateConflict,
    /// An argument is unusable as given.
    InvalidArgument,
}

/// Errors reported by collection operations.
///
/// # Examples
///
/// ```rust
/// use lambars_collections::error::{CollectionError, ErrorKind};
///
/// let error = CollectionError::RangeViolation {
///     parameter: "index",
///     value: 7,
///     limit: 3,
/// };
/// assert_eq!(error.kind(), ErrorKind::RangeViolation);
/// assert_eq!(error.parameter(), Some("index"));
/// assert_eq!(format!("{error}"), "index 7 is out of range (limit 3)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// An argument fell outside the valid range for the operation.
    RangeViolation {
        /// The name of the violating parameter: `"index"`, `"count"` or `"start"`.
        parameter: &'static str,
        /// The value that was supplied.
        value: usize,
        /// The bound the value was checked against.
        limit: usize,
    },
    /// The operation would grow the collection beyond its maximum size.
    CapacityExceeded {
        /// The element count the operation would have produced.
        requested: u128,
        /// The maximum number of elements a collection can hold.
        maximum: usize,
    },
    /// The collection was structurally modified while it was being iterated.
    ConcurrentModification {
        /// The version captured when iteration began.
        captured: u64,
        /// The version observed at the failing step.
        current: u64,
    },
    /// An element could not produce an independent copy of itself.
    CloneUnsupported {
        /// Position of the first element that refused.
        index: usize,
    },
    /// An argument was unusable as given.
    InvalidArgument {
        /// The name of the offending parameter.
        parameter: &'static str,
        /// Why the argument was rejected.
        reason: &'static str,
    },
}

impl CollectionError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RangeViolation { .. } => ErrorKind::RangeViolation,
            Self::CapacityExceeded { .. }
            | Self::ConcurrentModification { .. }
            | Self::CloneUnsupported { .. } => ErrorKind::StateConflict,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }

    /// Returns the name of the offending parameter, when the error names one.
    #[must_use]
    pub const fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::RangeViolation { parameter, .. } | Self::InvalidArgument { parameter, .. } => {
                Some(*parameter)
            }
            _ => None,
        }
    }

    pub(crate) const fn out_of_range(parameter: &'static str, value: usize, limit: usize) -> Self {
        Self::RangeViolation {
            parameter,
            value,
            limit,
        }
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RangeViolation {
                parameter,
                value,
                limit,
            } => write!(
                formatter,
                "{parameter} {value} is out of range (limit {limit})"
            ),
            Self::CapacityExceeded { requested, maximum } => write!(
                formatter,
                "collection would hold {requested} elements, more than the maximum of {maximum}"
            ),
            Self::ConcurrentModification { captured, current } => write!(
                formatter,
                "collection was modified during iteration (version {captured} became {current})"
            ),
            Self::CloneUnsupported { index } => write!(
                formatter,
                "element at index {index} cannot be cloned independently"
            ),
            Self::InvalidArgument { parameter, reason } => {
                write!(formatter, "invalid argument {parameter}: {reason}")
            }
        }
    }
}

impl std::error::Error for CollectionError {}
