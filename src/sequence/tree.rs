//! Positional tree algorithms: join, split, in-place insert and remove,
//! and repetition by sharing.
//!
//! All functions keep the cached weights exact and the tree AVL-balanced
//! (sibling heights differ by at most one). Functions that take handles by
//! value consume exclusive nodes in place and shallow-copy shared ones, so
//! the inputs may alias each other freely: `concat(x.clone(), x)` is valid.

use super::LEAF_CAPACITY;
use super::node::{Node, NodeRef};
use super::sharing::{ensure_exclusive, exclusive_leaf, take_children, take_elements, take_node};

/// Joins two subtrees whose heights differ by at most one, merging them into
/// a single leaf when both are leaves that fit together.
fn pair<T: Clone>(left: NodeRef<T>, right: NodeRef<T>) -> NodeRef<T> {
    if left.is_leaf() && right.is_leaf() && left.len() + right.len() <= LEAF_CAPACITY {
        let mut elements = take_elements(left);
        elements.extend(take_elements(right));
        return Node::leaf(elements);
    }
    Node::branch(left, right)
}

/// Joins two subtrees whose heights differ by at most two, applying a
/// single or double rotation when they differ by two.
fn balanced<T: Clone>(left: NodeRef<T>, right: NodeRef<T>) -> NodeRef<T> {
    let left_height = left.height();
    let right_height = right.height();

    if left_height > right_height + 1 {
        match take_children(left) {
            Ok((outer, inner)) if outer.height() >= inner.height() => {
                pair(outer, pair(inner, right))
            }
            Ok((outer, inner)) => match take_children(inner) {
                Ok((inner_left, inner_right)) => {
                    pair(pair(outer, inner_left), pair(inner_right, right))
                }
                Err(inner) => pair(pair(outer, inner), right),
            },
            Err(left) => pair(left, right),
        }
    } else if right_height > left_height + 1 {
        match take_children(right) {
            Ok((inner, outer)) if outer.height() >= inner.height() => {
                pair(pair(left, inner), outer)
            }
            Ok((inner, outer)) => match take_children(inner) {
                Ok((inner_left, inner_right)) => {
                    pair(pair(left, inner_left), pair(inner_right, outer))
                }
                Err(inner) => pair(left, pair(inner, outer)),
            },
            Err(right) => pair(left, right),
        }
    } else {
        pair(left, right)
    }
}

/// Rotates an exclusive branch whose children drifted two levels apart.
fn rebalance<T: Clone>(node: &mut NodeRef<T>) {
    if node.imbalance() <= 1 {
        return;
    }
    let children = match node.as_ref() {
        Node::Branch { left, right, .. } => (left.clone(), right.clone()),
        Node::Leaf(_) => return,
    };
    *node = balanced(children.0, children.1);
}

/// Collapses a branch over two leaves once they hold few enough elements.
fn merge_small_leaves<T: Clone>(node: &mut NodeRef<T>) {
    let children = match node.as_ref() {
        Node::Branch {
            left,
            right,
            weight,
            ..
        } if left.is_leaf() && right.is_leaf() && *weight <= LEAF_CAPACITY / 2 => {
            (left.clone(), right.clone())
        }
        _ => return,
    };
    *node = pair(children.0, children.1);
}

/// Concatenates two trees.
///
/// Descends the spine of the taller tree until the heights meet, then
/// rebalances on the way back up. Runs in O(|height difference| + 1).
pub(crate) fn concat<T: Clone>(left: NodeRef<T>, right: NodeRef<T>) -> NodeRef<T> {
    let left_height = left.height();
    let right_height = right.height();

    if left_height > right_height + 1 {
        match take_children(left) {
            Ok((left_left, left_right)) => balanced(left_left, concat(left_right, right)),
            Err(left) => pair(left, right),
        }
    } else if right_height > left_height + 1 {
        match take_children(right) {
            Ok((right_left, right_right)) => balanced(concat(left, right_left), right_right),
            Err(right) => pair(left, right),
        }
    } else {
        pair(left, right)
    }
}

/// Concatenates two possibly empty trees.
pub(crate) fn concat_optional<T: Clone>(
    left: Option<NodeRef<T>>,
    right: Option<NodeRef<T>>,
) -> Option<NodeRef<T>> {
    match (left, right) {
        (Some(left), Some(right)) => Some(concat(left, right)),
        (left, None) => left,
        (None, right) => right,
    }
}

/// Splits a tree into the elements before `index` and the rest.
///
/// Whole subtrees on either side of the cut are reused as they are.
pub(crate) fn split<T: Clone>(
    node: NodeRef<T>,
    index: usize,
) -> (Option<NodeRef<T>>, Option<NodeRef<T>>) {
    if index == 0 {
        return (None, Some(node));
    }
    if index >= node.len() {
        return (Some(node), None);
    }

    match take_node(node) {
        Node::Leaf(mut elements) => {
            let tail = elements.split_off(index);
            (Some(Node::leaf(elements)), Some(Node::leaf(tail)))
        }
        Node::Branch { left, right, .. } => {
            let left_length = left.len();
            if index < left_length {
                let (before, after) = split(left, index);
                let rest = match after {
                    Some(after) => concat(after, right),
                    None => right,
                };
                (before, Some(rest))
            } else if index == left_length {
                (Some(left), Some(right))
            } else {
                let (before, after) = split(right, index - left_length);
                (concat_optional(Some(left), before), after)
            }
        }
    }
}

/// Returns the tree for positions `index..index + count` of `node`,
/// sharing every subtree that lies wholly inside the range.
pub(crate) fn sub_range<T: Clone>(
    node: &NodeRef<T>,
    index: usize,
    count: usize,
) -> Option<NodeRef<T>> {
    if count == 0 {
        return None;
    }
    let (_, rest) = split(node.clone(), index);
    rest.and_then(|rest| split(rest, count).0)
}

/// Inserts the whole of `middle` before position `index`.
pub(crate) fn splice<T: Clone>(
    root: Option<NodeRef<T>>,
    index: usize,
    middle: NodeRef<T>,
) -> NodeRef<T> {
    let Some(root) = root else {
        return middle;
    };
    let (before, after) = split(root, index);
    let head = match before {
        Some(before) => concat(before, middle),
        None => middle,
    };
    match after {
        Some(after) => concat(head, after),
        None => head,
    }
}

/// Removes positions `index..index + count`.
pub(crate) fn remove_range<T: Clone>(
    root: NodeRef<T>,
    index: usize,
    count: usize,
) -> Option<NodeRef<T>> {
    let (before, rest) = split(root, index);
    let after = rest.and_then(|rest| split(rest, count).1);
    concat_optional(before, after)
}

/// Inserts `value` before position `index`, mutating exclusive nodes in
/// place. A full leaf is split in half.
pub(crate) fn insert<T: Clone>(node: &mut NodeRef<T>, index: usize, value: T) {
    let replacement = match ensure_exclusive(node) {
        Node::Leaf(elements) => {
            if elements.len() < LEAF_CAPACITY {
                elements.insert(index, value);
                None
            } else {
                let mut head = std::mem::take(elements);
                head.insert(index, value);
                let tail = head.split_off(head.len() / 2);
                Some(Node::branch(Node::leaf(head), Node::leaf(tail)))
            }
        }
        Node::Branch {
            left,
            right,
            weight,
            height,
        } => {
            let left_length = left.len();
            if index <= left_length {
                insert(left, index, value);
            } else {
                insert(right, index - left_length, value);
            }
            *weight += 1;
            *height = left.height().max(right.height()) + 1;
            None
        }
    };

    match replacement {
        Some(replacement) => *node = replacement,
        None => rebalance(node),
    }
}

/// Removes and returns the element at `index`.
///
/// A leaf emptied by the removal is left behind with no elements for its
/// parent to discard; only a root leaf can end up empty.
pub(crate) fn remove<T: Clone>(node: &mut NodeRef<T>, index: usize) -> T {
    let (value, survivor) = match ensure_exclusive(node) {
        Node::Leaf(elements) => (elements.remove(index), None),
        Node::Branch { left, right, .. } => {
            let left_length = left.len();
            if index < left_length {
                let value = remove(left, index);
                (value, (left.len() == 0).then(|| right.clone()))
            } else {
                let value = remove(right, index - left_length);
                (value, (right.len() == 0).then(|| left.clone()))
            }
        }
    };

    match survivor {
        Some(survivor) => *node = survivor,
        None => {
            ensure_exclusive(node).refresh();
            merge_small_leaves(node);
            rebalance(node);
        }
    }
    value
}

/// Replaces the element at `index`, returning the previous value.
pub(crate) fn update<T: Clone>(root: &mut NodeRef<T>, index: usize, value: T) -> T {
    let (block, offset) = exclusive_leaf(root, index);
    std::mem::replace(&mut block[offset], value)
}

/// Builds a tree holding `copies` back-to-back repetitions of `template`.
///
/// The template is doubled by pairing a subtree with itself, so the result
/// takes O(log copies) new nodes no matter how many elements it represents.
pub(crate) fn repeat<T: Clone>(template: NodeRef<T>, copies: usize) -> Option<NodeRef<T>> {
    let mut result = None;
    let mut power = template;
    let mut remaining = copies;

    while remaining > 0 {
        if remaining & 1 == 1 {
            result = concat_optional(result, Some(power.clone()));
        }
        remaining >>= 1;
        if remaining > 0 {
            power = concat(power.clone(), power);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::ReferenceCounter;
    use rstest::rstest;

    fn contents<T: Clone>(node: &NodeRef<T>) -> Vec<T> {
        let mut elements = Vec::with_capacity(node.len());
        node.for_each_block(&mut |block: &[T]| elements.extend_from_slice(block));
        elements
    }

    fn tree(length: usize) -> NodeRef<usize> {
        Node::build((0..length).collect()).unwrap()
    }

    #[rstest]
    #[case(1, 1)]
    #[case(5, 500)]
    #[case(500, 5)]
    #[case(1000, 1000)]
    #[case(10_000, 3)]
    fn test_concat_preserves_order_and_balance(#[case] left: usize, #[case] right: usize) {
        let left_tree = tree(left);
        let right_tree = Node::build((left..left + right).collect()).unwrap();
        let joined = concat(left_tree, right_tree);
        assert_eq!(joined.check(), Ok(()));
        assert_eq!(contents(&joined), (0..left + right).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_concat_with_itself_shares_subtree() {
        let original = tree(1000);
        let doubled = concat(original.clone(), original.clone());
        assert_eq!(doubled.len(), 2000);
        assert_eq!(doubled.check(), Ok(()));
        let expected: Vec<usize> = (0..1000).chain(0..1000).collect();
        assert_eq!(contents(&doubled), expected);
        assert_eq!(contents(&original), (0..1000).collect::<Vec<_>>());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(LEAF_CAPACITY)]
    #[case(777)]
    #[case(1999)]
    #[case(2000)]
    fn test_split_partitions_at_index(#[case] index: usize) {
        let source = tree(2000);
        let (before, after) = split(source.clone(), index);
        let before = before.map(|node| contents(&node)).unwrap_or_default();
        let after = after.map(|node| contents(&node)).unwrap_or_default();
        assert_eq!(before, (0..index).collect::<Vec<_>>());
        assert_eq!(after, (index..2000).collect::<Vec<_>>());
        assert_eq!(contents(&source), (0..2000).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_split_results_are_balanced() {
        let source = tree(5000);
        for index in (1..5000).step_by(337) {
            let (before, after) = split(source.clone(), index);
            assert_eq!(before.unwrap().check(), Ok(()));
            assert_eq!(after.unwrap().check(), Ok(()));
        }
    }

    #[rstest]
    fn test_insert_splits_full_leaf() {
        let mut root = tree(LEAF_CAPACITY);
        insert(&mut root, 10, 9999);
        assert!(!root.is_leaf());
        assert_eq!(root.len(), LEAF_CAPACITY + 1);
        assert_eq!(*root.get(10), 9999);
        assert_eq!(root.check(), Ok(()));
    }

    #[rstest]
    fn test_repeated_front_insert_stays_balanced() {
        let mut root = Node::leaf(vec![0_usize]);
        for value in 1..5000 {
            insert(&mut root, 0, value);
        }
        assert_eq!(root.check(), Ok(()));
        assert_eq!(*root.get(0), 4999);
        assert_eq!(*root.get(4999), 0);
        assert!(root.height() < 20);
    }

    #[rstest]
    fn test_insert_into_shared_tree_leaves_original() {
        let original = tree(1000);
        let mut copy = original.clone();
        insert(&mut copy, 500, 7);
        assert_eq!(copy.len(), 1001);
        assert_eq!(original.len(), 1000);
        assert_eq!(*original.get(500), 500);
        assert_eq!(*copy.get(500), 7);
    }

    #[rstest]
    fn test_remove_until_single_element() {
        let mut root = tree(600);
        let mut expected: Vec<usize> = (0..600).collect();
        let mut step = 0_usize;
        while expected.len() > 1 {
            step += 1;
            let index = (step * 7919) % expected.len();
            let removed = remove(&mut root, index);
            assert_eq!(removed, expected.remove(index));
            assert_eq!(root.check(), Ok(()));
        }
        assert_eq!(contents(&root), expected);
    }

    #[rstest]
    fn test_remove_from_shared_tree_leaves_original() {
        let original = tree(400);
        let mut copy = original.clone();
        assert_eq!(remove(&mut copy, 0), 0);
        assert_eq!(copy.len(), 399);
        assert_eq!(contents(&original), (0..400).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_update_returns_previous_value() {
        let mut root = tree(300);
        assert_eq!(update(&mut root, 250, 1), 250);
        assert_eq!(*root.get(250), 1);
    }

    #[rstest]
    fn test_remove_range_and_splice() {
        let root = tree(1000);
        let removed = remove_range(root.clone(), 100, 800).unwrap();
        let expected: Vec<usize> = (0..100).chain(900..1000).collect();
        assert_eq!(contents(&removed), expected);

        let middle = Node::build(vec![7, 7, 7]).unwrap();
        let spliced = splice(Some(removed), 100, middle);
        let expected: Vec<usize> = (0..100).chain([7, 7, 7]).chain(900..1000).collect();
        assert_eq!(contents(&spliced), expected);
        assert_eq!(spliced.check(), Ok(()));
    }

    #[rstest]
    fn test_sub_range_leaves_source_intact() {
        let root = tree(10_000);
        let range = sub_range(&root, 1234, 5000).unwrap();
        assert_eq!(contents(&range), (1234..6234).collect::<Vec<_>>());
        assert_eq!(range.check(), Ok(()));
        assert_eq!(ReferenceCounter::strong_count(&root), 1);
        assert_eq!(contents(&root), (0..10_000).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_sub_range_reuses_whole_subtrees() {
        let root = tree(10_000);
        let Node::Branch { right, .. } = root.as_ref() else {
            panic!("large tree should be a branch");
        };
        let right_start = root.len() - right.len();
        let range = sub_range(&root, right_start, right.len()).unwrap();
        assert!(ReferenceCounter::ptr_eq(&range, right));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(7)]
    #[case(1000)]
    fn test_repeat_builds_copies(#[case] copies: usize) {
        let template = Node::build(vec![1_usize, 2, 3]).unwrap();
        let repeated = repeat(template, copies);
        let expected: Vec<usize> = std::iter::repeat_n([1, 2, 3], copies).flatten().collect();
        match repeated {
            Some(node) => {
                assert_eq!(node.check(), Ok(()));
                assert_eq!(contents(&node), expected);
            }
            None => assert!(expected.is_empty()),
        }
    }

    #[rstest]
    fn test_repeat_handles_huge_counts_without_materializing() {
        let template = Node::leaf(vec![0_u8; LEAF_CAPACITY]);
        let repeated = repeat(template, 1 << 20).unwrap();
        assert_eq!(repeated.len(), LEAF_CAPACITY << 20);
        assert_eq!(repeated.check(), Ok(()));
    }
}
