//! Integration tests for the fail-fast VersionedIter cursor.

use lambars_collections::error::{CollectionError, ErrorKind};
use lambars_collections::sequence::{BigList, IteratorState, VersionedIter};
use rstest::rstest;

type Mutation = fn(&mut BigList<i32>);

fn drain(cursor: &mut VersionedIter<i32>, list: &BigList<i32>) -> Vec<i32> {
    let mut produced = Vec::new();
    while let Some(element) = cursor.next_element(list).unwrap() {
        produced.push(element);
    }
    produced
}

#[rstest]
#[case(4)]
#[case(1_000)]
fn test_unmodified_iteration_yields_every_element_once(#[case] length: i32) {
    let list: BigList<i32> = (0..length).collect();
    let mut cursor = list.versioned_iter();
    assert_eq!(cursor.state(), IteratorState::Created);
    assert_eq!(cursor.remaining(), length as usize);

    assert_eq!(drain(&mut cursor, &list), (0..length).collect::<Vec<_>>());
    assert_eq!(cursor.state(), IteratorState::Exhausted);
    assert_eq!(cursor.remaining(), 0);
    assert_eq!(cursor.next_element(&list), Ok(None));
}

#[rstest]
#[case::push(|list: &mut BigList<i32>| list.push(9).unwrap())]
#[case::push_front(|list: &mut BigList<i32>| list.push_front(9).unwrap())]
#[case::insert(|list: &mut BigList<i32>| list.insert(2, 9).unwrap())]
#[case::set(|list: &mut BigList<i32>| { list.set(0, 9).unwrap(); })]
#[case::remove_at(|list: &mut BigList<i32>| { list.remove_at(3).unwrap(); })]
#[case::remove_range(|list: &mut BigList<i32>| list.remove_range(1, 2).unwrap())]
#[case::insert_many(|list: &mut BigList<i32>| list.insert_many(0, [7, 8]).unwrap())]
#[case::sort(|list: &mut BigList<i32>| list.sort())]
#[case::reverse(|list: &mut BigList<i32>| list.reverse())]
#[case::clear(|list: &mut BigList<i32>| list.clear())]
fn test_mutation_between_second_and_third_element_fails(#[case] mutation: Mutation) {
    let mut list: BigList<i32> = (0..6).collect();
    let mut cursor = list.versioned_iter();
    assert_eq!(cursor.next_element(&list), Ok(Some(0)));
    assert_eq!(cursor.next_element(&list), Ok(Some(1)));
    assert_eq!(cursor.state(), IteratorState::Iterating);

    mutation(&mut list);

    let error = cursor.next_element(&list).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::StateConflict);
    assert!(matches!(error, CollectionError::ConcurrentModification { .. }));
    assert_eq!(cursor.state(), IteratorState::Failed);
}

#[rstest]
fn test_failure_is_permanent() {
    let mut list: BigList<i32> = (0..4).collect();
    let mut cursor = list.versioned_iter();
    cursor.next_element(&list).unwrap();
    list.push(4).unwrap();
    assert!(cursor.next_element(&list).is_err());
    assert!(cursor.next_element(&list).is_err());
    assert_eq!(cursor.state(), IteratorState::Failed);
}

#[rstest]
fn test_rejected_mutations_do_not_invalidate() {
    let mut list: BigList<i32> = (0..4).collect();
    let mut cursor = list.versioned_iter();
    cursor.next_element(&list).unwrap();
    assert!(list.insert(99, 0).is_err());
    list.remove_range(2, 0).unwrap();
    assert_eq!(drain(&mut cursor, &list), vec![1, 2, 3]);
}

#[rstest]
fn test_mutating_a_clone_does_not_invalidate() {
    let list: BigList<i32> = (0..500).collect();
    let mut clone = list.clone();
    let mut cursor = list.versioned_iter();
    cursor.next_element(&list).unwrap();
    clone.set(1, -1).unwrap();
    clone.clear();
    let rest = drain(&mut cursor, &list);
    assert_eq!(rest, (1..500).collect::<Vec<_>>());
}

#[rstest]
fn test_other_list_is_rejected_as_owner() {
    let list: BigList<i32> = (0..4).collect();
    let clone = list.clone();
    let mut cursor = list.versioned_iter();
    let error = cursor.next_element(&clone).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    assert_eq!(error.parameter(), Some("owner"));
    assert_eq!(cursor.state(), IteratorState::Created);
    assert_eq!(cursor.next_element(&list), Ok(Some(0)));
}

#[rstest]
fn test_empty_list_exhausts_immediately() {
    let list: BigList<i32> = BigList::new();
    let mut cursor = list.versioned_iter();
    assert_eq!(cursor.next_element(&list), Ok(None));
    assert_eq!(cursor.state(), IteratorState::Exhausted);
}

#[rstest]
fn test_captured_version_matches_list() {
    let mut list: BigList<i32> = BigList::new();
    list.push(1).unwrap();
    list.push(2).unwrap();
    let cursor = list.versioned_iter();
    assert_eq!(cursor.captured_version(), list.version());
}
