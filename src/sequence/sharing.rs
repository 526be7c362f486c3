//! Copy-on-write protocol for tree nodes.
//!
//! A node is *shared* when more than one handle reaches it: a cloned list,
//! an extracted sub-range, a concatenation that reused a subtree, or a
//! repeated template. Shared nodes are never mutated in place. Every mutator
//! first asks this module for exclusive access, which copies exactly the
//! shared nodes on the path being modified; their children stay shared.

use super::ReferenceCounter;
use super::node::{Node, NodeRef};

/// Returns `true` when another handle can observe this node.
#[inline]
pub(crate) fn is_shared<T>(node: &NodeRef<T>) -> bool {
    ReferenceCounter::strong_count(node) > 1
}

/// Grants mutable access to a node, copying it first if it is shared.
///
/// Only the node itself is copied; a copied branch points at the same
/// children as the original.
#[inline]
pub(crate) fn ensure_exclusive<T: Clone>(node: &mut NodeRef<T>) -> &mut Node<T> {
    ReferenceCounter::make_mut(node)
}

/// Makes every node on the descent path to `index` exclusive and returns
/// the leaf block holding that position together with the offset inside it.
///
/// `index` must be less than the length of the tree.
pub(crate) fn exclusive_leaf<T: Clone>(
    root: &mut NodeRef<T>,
    mut index: usize,
) -> (&mut Vec<T>, usize) {
    let mut node = ensure_exclusive(root);
    loop {
        match node {
            Node::Leaf(elements) => return (elements, index),
            Node::Branch { left, right, .. } => {
                let left_length = left.len();
                node = if index < left_length {
                    ensure_exclusive(left)
                } else {
                    index -= left_length;
                    ensure_exclusive(right)
                };
            }
        }
    }
}

/// Takes ownership of a node, cloning it only when other handles remain.
#[inline]
pub(crate) fn take_node<T: Clone>(node: NodeRef<T>) -> Node<T> {
    ReferenceCounter::unwrap_or_clone(node)
}

/// Takes the element block out of a leaf handle.
///
/// Branches are flattened; that path only runs for subtrees small enough
/// to be merged into a single leaf.
pub(crate) fn take_elements<T: Clone>(node: NodeRef<T>) -> Vec<T> {
    match take_node(node) {
        Node::Leaf(elements) => elements,
        branch @ Node::Branch { .. } => {
            let mut elements = Vec::with_capacity(branch.len());
            branch.for_each_block(&mut |block: &[T]| elements.extend_from_slice(block));
            elements
        }
    }
}

/// Splits a handle into its two children.
///
/// Returns the handle unchanged if it is a leaf.
pub(crate) fn take_children<T: Clone>(
    node: NodeRef<T>,
) -> Result<(NodeRef<T>, NodeRef<T>), NodeRef<T>> {
    if node.is_leaf() {
        return Err(node);
    }
    match take_node(node) {
        Node::Branch { left, right, .. } => Ok((left, right)),
        leaf @ Node::Leaf(_) => Err(ReferenceCounter::new(leaf)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_exclusive_node_is_mutated_in_place() {
        let mut node = Node::leaf(vec![1, 2, 3]);
        let before = ReferenceCounter::as_ptr(&node);
        if let Node::Leaf(elements) = ensure_exclusive(&mut node) {
            elements[0] = 10;
        }
        assert_eq!(ReferenceCounter::as_ptr(&node), before);
        assert_eq!(*node.get(0), 10);
    }

    #[rstest]
    fn test_shared_node_is_copied_before_mutation() {
        let mut node = Node::leaf(vec![1, 2, 3]);
        let other = node.clone();
        assert!(is_shared(&node));

        if let Node::Leaf(elements) = ensure_exclusive(&mut node) {
            elements[0] = 10;
        }

        assert!(!is_shared(&node));
        assert!(!ReferenceCounter::ptr_eq(&node, &other));
        assert_eq!(*node.get(0), 10);
        assert_eq!(*other.get(0), 1);
    }

    #[rstest]
    fn test_exclusive_leaf_copies_only_the_path() {
        let left = Node::leaf(vec![1, 2]);
        let right = Node::leaf(vec![3, 4]);
        let mut root = Node::branch(left.clone(), right.clone());
        let snapshot = root.clone();

        let (block, offset) = exclusive_leaf(&mut root, 3);
        block[offset] = 40;

        assert!(!ReferenceCounter::ptr_eq(&root, &snapshot));
        match root.as_ref() {
            Node::Branch {
                left: new_left,
                right: new_right,
                ..
            } => {
                assert!(ReferenceCounter::ptr_eq(new_left, &left));
                assert!(!ReferenceCounter::ptr_eq(new_right, &right));
            }
            Node::Leaf(_) => panic!("root should stay a branch"),
        }
        assert_eq!(*root.get(3), 40);
        assert_eq!(*snapshot.get(3), 4);
    }

    #[rstest]
    fn test_take_children_of_shared_branch_keeps_original() {
        let root = Node::branch(Node::leaf(vec![1]), Node::leaf(vec![2]));
        let keep = root.clone();
        let (left, right) = take_children(root).ok().unwrap();
        assert_eq!(*left.get(0), 1);
        assert_eq!(*right.get(0), 2);
        assert_eq!(keep.len(), 2);
    }

    #[rstest]
    fn test_take_elements_moves_exclusive_leaf() {
        let leaf = Node::leaf(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(take_elements(leaf), vec!["a".to_string(), "b".to_string()]);
    }
}
