// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

fn names() -> StationNames {
    [(1, "K0"), (2, "A1"), (3, "G1"), (10, "A1")]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect()
}

#[test]
fn test_station_name_fallback() {
    let names = names();
    assert_eq!(names.name(1), "K0");
    assert!(names.is_named(1));
    // Unknown stations are named after their identifier.
    assert_eq!(names.name(42), "42");
    assert!(!names.is_named(42));
    assert_eq!(names.label(&StaIndex::from([1, 42, 2])), "K0-42-A1");
}

#[test]
fn test_numeric_label() {
    assert_eq!(StaIndex::from([3, 1]).numeric_label(), "3-1");
    assert_eq!(StaIndex::from([7]).numeric_label(), "7");
    assert_eq!(StaIndex::from([3, 1]).to_string(), "[3, 1]");
}

#[test]
fn test_station_order() {
    let names = names();
    let order = StationOrder::new(&names);
    // By name: A1 (2), A1 (10), G1 (3), K0 (1). Equal names are ordered by
    // identifier.
    assert_eq!(
        order.sorted(&StaIndex::from([1, 3, 2])),
        StaIndex::from([2, 3, 1])
    );
    assert_eq!(
        order.sorted(&StaIndex::from([10, 2])),
        StaIndex::from([2, 10])
    );
    assert_eq!(order.cmp(2, 10), Ordering::Less);
    assert_eq!(order.cmp(3, 3), Ordering::Equal);
}

#[test]
fn test_distinct_sta_indexes() {
    let a = StaIndex::from([1, 2]);
    let b = StaIndex::from([2, 1]);
    let c = StaIndex::from([2, 3]);
    let rows = [Some(&a), Some(&b), None, Some(&a), Some(&c)];
    let distinct = DistinctStaIndexes::from_rows(rows).unwrap();

    assert_eq!(distinct.len(), 3);
    assert_eq!(distinct.arity(), Some(2));
    assert_eq!(distinct.num_rows(), 5);
    assert_eq!(distinct.row_tuple(0), Some(0));
    assert_eq!(distinct.row_tuple(1), Some(1));
    assert_eq!(distinct.row_tuple(2), None);
    assert_eq!(distinct.row_tuple(3), Some(0));
    assert_eq!(distinct.row_tuple(4), Some(2));
    assert_eq!(distinct.row_tuple(5), None);
    assert_eq!(distinct.get(2), Some(&c));
}

#[test]
fn test_distinct_sta_indexes_without_stations() {
    let distinct = DistinctStaIndexes::from_rows([None, None]).unwrap();
    assert!(distinct.is_empty());
    assert_eq!(distinct.arity(), None);
    assert_eq!(distinct.num_rows(), 2);
}

#[test]
fn test_distinct_sta_indexes_arity_mismatch() {
    let a = StaIndex::from([1, 2]);
    let b = StaIndex::from([1, 2, 3]);
    let result = DistinctStaIndexes::from_rows([Some(&a), Some(&b)]);
    assert_eq!(
        result.unwrap_err(),
        StaIndexError::ArityMismatch {
            row: 1,
            expected: 2,
            got: 3
        }
    );
}

#[test]
fn test_distinct_sta_indexes_repeated_station() {
    assert_eq!(StaIndex::from([1, 2, 3]).repeated_station(), None);
    assert_eq!(StaIndex::from([3, 1, 3]).repeated_station(), Some(3));

    let a = StaIndex::from([1, 2]);
    let b = StaIndex::from([2, 2]);
    let result = DistinctStaIndexes::from_rows([Some(&a), None, Some(&b)]);
    assert_eq!(
        result.unwrap_err(),
        StaIndexError::DuplicateStation { row: 2, id: 2 }
    );
}

#[test]
fn test_distinct_sta_indexes_invalid_arity() {
    let a = StaIndex::from([1, 2, 3, 4]);
    let result = DistinctStaIndexes::from_rows([Some(&a)]);
    assert_eq!(
        result.unwrap_err(),
        StaIndexError::InvalidArity { row: 0, arity: 4 }
    );

    let empty = StaIndex::new(vec![]);
    let result = DistinctStaIndexes::from_rows([Some(&empty)]);
    assert!(matches!(
        result,
        Err(StaIndexError::InvalidArity { row: 0, arity: 0 })
    ));
}
