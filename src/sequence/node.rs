//! Tree nodes for [`BigList`](super::BigList).
//!
//! The tree is a height-balanced (AVL) binary tree whose leaves hold small
//! contiguous blocks of elements. Branches cache the total element count of
//! their subtree (the *weight*) so that positions can be routed without
//! visiting siblings.

use super::{LEAF_CAPACITY, ReferenceCounter};

/// Shared handle to a node.
pub(crate) type NodeRef<T> = ReferenceCounter<Node<T>>;

/// A node of the sequence tree.
#[derive(Clone)]
pub(crate) enum Node<T> {
    /// A block of between 1 and `LEAF_CAPACITY` elements.
    Leaf(Vec<T>),
    /// Two subtrees plus cached bookkeeping.
    Branch {
        left: NodeRef<T>,
        right: NodeRef<T>,
        /// Total number of elements below this branch.
        weight: usize,
        /// Distance to the deepest leaf; leaves have height 0.
        height: u32,
    },
}

impl<T> Node<T> {
    /// Wraps a block of elements in a leaf handle.
    #[inline]
    pub(crate) fn leaf(elements: Vec<T>) -> NodeRef<T> {
        debug_assert!(!elements.is_empty() && elements.len() <= LEAF_CAPACITY);
        ReferenceCounter::new(Self::Leaf(elements))
    }

    /// Creates a branch over two subtrees, computing its weight and height.
    ///
    /// No rebalancing or leaf merging happens here.
    #[inline]
    pub(crate) fn branch(left: NodeRef<T>, right: NodeRef<T>) -> NodeRef<T> {
        let weight = left.len() + right.len();
        let height = left.height().max(right.height()) + 1;
        ReferenceCounter::new(Self::Branch {
            left,
            right,
            weight,
            height,
        })
    }

    /// Number of elements in this subtree.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaf(elements) => elements.len(),
            Self::Branch { weight, .. } => *weight,
        }
    }

    #[inline]
    pub(crate) const fn height(&self) -> u32 {
        match self {
            Self::Leaf(_) => 0,
            Self::Branch { height, .. } => *height,
        }
    }

    #[inline]
    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Height difference between the children; zero for leaves.
    pub(crate) fn imbalance(&self) -> u32 {
        match self {
            Self::Leaf(_) => 0,
            Self::Branch { left, right, .. } => left.height().abs_diff(right.height()),
        }
    }

    /// Recomputes the cached weight and height from the children.
    pub(crate) fn refresh(&mut self) {
        if let Self::Branch {
            left,
            right,
            weight,
            height,
        } = self
        {
            *weight = left.len() + right.len();
            *height = left.height().max(right.height()) + 1;
        }
    }

    /// Returns the element at `index`, which must be less than `self.len()`.
    pub(crate) fn get(&self, mut index: usize) -> &T {
        let mut node = self;
        loop {
            match node {
                Self::Leaf(elements) => return &elements[index],
                Self::Branch { left, right, .. } => {
                    let left_length = left.len();
                    if index < left_length {
                        node = &**left;
                    } else {
                        index -= left_length;
                        node = &**right;
                    }
                }
            }
        }
    }

    /// Builds a balanced tree holding `elements` in order.
    ///
    /// Elements are packed into full leaves; sibling subtrees differ in
    /// height by at most one.
    pub(crate) fn build(elements: Vec<T>) -> Option<NodeRef<T>> {
        if elements.is_empty() {
            return None;
        }

        let leaf_count = elements.len().div_ceil(LEAF_CAPACITY);
        let mut leaves = Vec::with_capacity(leaf_count);
        let mut remaining = elements.into_iter();
        loop {
            let block: Vec<T> = remaining.by_ref().take(LEAF_CAPACITY).collect();
            if block.is_empty() {
                break;
            }
            leaves.push(Self::leaf(block));
        }

        Some(Self::build_from_leaves(&leaves))
    }

    fn build_from_leaves(leaves: &[NodeRef<T>]) -> NodeRef<T> {
        if let [single] = leaves {
            return single.clone();
        }
        let middle = leaves.len() / 2;
        Self::branch(
            Self::build_from_leaves(&leaves[..middle]),
            Self::build_from_leaves(&leaves[middle..]),
        )
    }

    /// Visits every leaf block in order.
    pub(crate) fn for_each_block<F>(&self, function: &mut F)
    where
        F: FnMut(&[T]),
    {
        match self {
            Self::Leaf(elements) => function(elements),
            Self::Branch { left, right, .. } => {
                left.for_each_block(function);
                right.for_each_block(function);
            }
        }
    }

    /// Verifies cached weights, heights, leaf bounds and AVL balance.
    ///
    /// Returns a description of the first violation found.
    pub(crate) fn check(&self) -> Result<(), String> {
        match self {
            Self::Leaf(elements) => {
                if elements.is_empty() || elements.len() > LEAF_CAPACITY {
                    return Err(format!("leaf holds {} elements", elements.len()));
                }
                Ok(())
            }
            Self::Branch {
                left,
                right,
                weight,
                height,
            } => {
                left.check()?;
                right.check()?;
                let actual_weight = left.len() + right.len();
                if *weight != actual_weight {
                    return Err(format!(
                        "branch weight {weight} but children hold {actual_weight}"
                    ));
                }
                let actual_height = left.height().max(right.height()) + 1;
                if *height != actual_height {
                    return Err(format!(
                        "branch height {height} but children imply {actual_height}"
                    ));
                }
                if self.imbalance() > 1 {
                    return Err(format!(
                        "branch children have heights {} and {}",
                        left.height(),
                        right.height()
                    ));
                }
                Ok(())
            }
        }
    }
}
