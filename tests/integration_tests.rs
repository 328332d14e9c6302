use locsort::prelude::*;
use locsort::{NullPlacement, OrderError};
use rand::Rng;

fn stable_reference(input: &[Vec<u8>]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..input.len()).collect();
    indices.sort_by(|&a, &b| input[a].cmp(&input[b]));
    indices
}

#[test]
fn test_basic_order_strings() {
    let input = vec![
        "banana".to_string(),
        "apple".to_string(),
        "cherry".to_string(),
        "date".to_string(),
    ];

    let permutation = order_keys(&input);

    let sorted: Vec<&String> = permutation.iter().map(|i| &input[i]).collect();
    assert_eq!(sorted, vec!["apple", "banana", "cherry", "date"]);
}

#[test]
fn test_long_common_prefix() {
    let prefix = "a".repeat(100);
    let input: Vec<String> = (0..500)
        .map(|i| format!("{prefix}{:03}", 499 - i))
        .collect();

    let permutation = order_keys(&input);
    let expected: Vec<usize> = (0..500).rev().collect();
    assert_eq!(permutation.indices(), expected.as_slice());
}

#[test]
fn test_cache_boundary_order() {
    // Differences at bytes 7, 8 and 9 straddle the 8-byte cached window.
    let base = vec![0u8; 16];
    let mut input = Vec::new();
    for pos in [7, 8, 9] {
        for value in [2u8, 1] {
            let mut v = base.clone();
            v[pos] = value;
            input.push(v);
        }
    }
    // Pad past the comparison-sort threshold so the radix path runs too.
    for _ in 0..200 {
        input.push(base.clone());
    }

    let permutation = order_keys(&input);
    assert_eq!(permutation.into_vec(), stable_reference(&input));
}

#[test]
fn test_fuzz_random_matches_stable_sort() {
    let mut rng = rand::rng();
    let mut input: Vec<Vec<u8>> = Vec::new();

    for _ in 0..10_000 {
        let len = rng.random_range(0..12);
        // A tiny alphabet forces many duplicates and shared prefixes.
        let row: Vec<u8> = (0..len).map(|_| rng.random_range(0..3)).collect();
        input.push(row);
    }

    let permutation = order_keys(&input);
    assert_eq!(permutation.into_vec(), stable_reference(&input));
}

#[test]
fn test_fuzz_random_mut() {
    let mut rng = rand::rng();

    for _ in 0..2_000 {
        let count = rng.random_range(0..20);
        let mut input: Vec<Vec<u8>> = (0..count)
            .map(|_| {
                let inner_len = rng.random_range(0..50);
                let mut inner = vec![0u8; inner_len];
                rng.fill(&mut inner[..]);
                inner
            })
            .collect();

        let mut expected = input.clone();
        expected.sort();

        order_mut(&mut input);
        assert_eq!(input, expected);
    }
}

#[test]
fn test_fuzz_edge_cases_mut() {
    // All empty
    let mut input = vec![vec![]; 500];
    let expected = input.clone();
    order_mut(&mut input);
    assert_eq!(input, expected);

    // All same
    let mut input = vec![vec![1, 2, 3]; 500];
    let expected = input.clone();
    order_mut(&mut input);
    assert_eq!(input, expected);

    // Reversed
    let mut input: Vec<Vec<u8>> = (0..500u32).map(|i| i.to_be_bytes().to_vec()).rev().collect();
    let mut expected = input.clone();
    expected.sort();
    order_mut(&mut input);
    assert_eq!(input, expected);
}

#[test]
fn test_vec_deque() {
    use std::collections::VecDeque;
    let input: VecDeque<String> = VecDeque::from(vec![
        "banana".to_string(),
        "apple".to_string(),
        "cherry".to_string(),
    ]);

    let permutation = order_keys(&input);
    assert_eq!(permutation.indices(), &[1, 0, 2]);
}

#[test]
fn test_identical_keys_give_identity() {
    let input = vec![b"same".to_vec(); 5_000];
    let permutation = order_keys(&input);
    assert_eq!(permutation, Permutation::identity(5_000));
}

#[test]
fn test_stability_on_first_column() {
    let table = Table::new([
        ("k", Column::integers([1, 2, 1])),
        ("v", Column::strings(["a", "b", "c"])),
    ])
    .unwrap();
    let spec = SortSpec::new().by(SortColumn::asc("k"));

    let permutation = order(&table, &spec, &OrderContext::new()).unwrap();
    assert_eq!(permutation.indices(), &[0, 2, 1]);
}

#[test]
fn test_secondary_direction_is_independent() {
    let table = Table::new([
        ("x", Column::integers([1, 1, 2])),
        ("y", Column::strings(["b", "a", "a"])),
    ])
    .unwrap();
    let spec = SortSpec::new()
        .by(SortColumn::asc("x"))
        .by(SortColumn::desc("y"));
    let permutation = order(&table, &spec, &OrderContext::new()).unwrap();
    assert_eq!(permutation.indices(), &[0, 1, 2]);

    let spec = SortSpec::new()
        .by(SortColumn::desc("x"))
        .by(SortColumn::asc("y"));
    let permutation = order(&table, &spec, &OrderContext::new()).unwrap();
    assert_eq!(permutation.indices(), &[2, 1, 0]);
}

#[test]
fn test_null_placement() {
    let table = Table::new([("x", Column::from(vec![Some(2i64), None, Some(1), None]))]).unwrap();
    let ctx = OrderContext::new();

    let last = SortSpec::new().by(SortColumn::desc("x"));
    assert_eq!(order(&table, &last, &ctx).unwrap().indices(), &[0, 2, 1, 3]);

    let first = SortSpec::new().by(SortColumn::desc("x").nulls(NullPlacement::First));
    let permutation = order(&table, &first, &ctx).unwrap();
    assert_eq!(permutation.indices(), &[1, 3, 0, 2]);
}

#[test]
fn test_mixed_types_and_records() {
    let table = Table::new([
        ("when", Column::dates([3, 1, 2, 1])),
        ("ok", Column::logicals([true, false, true, true])),
        (
            "pair",
            Column::Record(vec![
                Column::reals([0.5, -1.0, 0.5, 2.0]),
                Column::strings(["z", "y", "a", "x"]),
            ]),
        ),
    ])
    .unwrap();
    let ctx = OrderContext::new();

    let spec = SortSpec::new().by(SortColumn::asc("when")).by(SortColumn::asc("ok"));
    assert_eq!(order(&table, &spec, &ctx).unwrap().indices(), &[1, 3, 2, 0]);

    let spec = SortSpec::new().by(SortColumn::asc("pair"));
    assert_eq!(order(&table, &spec, &ctx).unwrap().indices(), &[1, 2, 0, 3]);
}

#[test]
fn test_natural_column() {
    let table = Table::new([("file", Column::strings(["f10", "f2", "f1"]))]).unwrap();
    let ctx = OrderContext::new();

    let bytes = SortSpec::new().by(SortColumn::asc("file"));
    assert_eq!(order(&table, &bytes, &ctx).unwrap().indices(), &[2, 0, 1]);

    let natural = SortSpec::new().by(SortColumn::asc("file").natural());
    assert_eq!(order(&table, &natural, &ctx).unwrap().indices(), &[2, 1, 0]);
}

#[test]
fn test_sort_table_reorders_every_column() {
    let table = Table::new([
        ("k", Column::integers([3, 1, 2])),
        ("v", Column::strings(["c", "a", "b"])),
    ])
    .unwrap();
    let spec = SortSpec::new().by(SortColumn::asc("k"));
    let sorted = sort_table(&table, &spec, &OrderContext::new()).unwrap();

    assert_eq!(sorted.column("k"), Some(&Column::integers([1, 2, 3])));
    assert_eq!(sorted.column("v"), Some(&Column::strings(["a", "b", "c"])));
}

#[test]
fn test_permutation_inverse_round_trips() {
    let input: Vec<Vec<u8>> = vec![b"d".to_vec(), b"a".to_vec(), b"c".to_vec(), b"b".to_vec()];
    let permutation = order_keys(&input);
    let inverse = permutation.inverse();

    assert_eq!(permutation.then(&inverse), Permutation::identity(4));
    assert_eq!(inverse.then(&permutation), Permutation::identity(4));

    let sorted = permutation.apply(&input);
    assert_eq!(inverse.apply(&sorted), input);
}

#[test]
fn test_permutation_validation() {
    assert!(Permutation::from_indices(vec![2, 0, 1]).is_some());
    assert!(Permutation::from_indices(vec![0, 0, 1]).is_none());
    assert!(Permutation::from_indices(vec![0, 3]).is_none());
}

#[test]
fn test_empty() {
    let input: Vec<String> = vec![];
    assert!(order_keys(&input).is_empty());

    let table = Table::new([("x", Column::integers([]))]).unwrap();
    let spec = SortSpec::new().by(SortColumn::asc("x"));
    assert!(order(&table, &spec, &OrderContext::new()).unwrap().is_empty());
}

#[test]
fn test_invalid_specs() {
    let table = Table::new([("x", Column::integers([1]))]).unwrap();
    let ctx = OrderContext::new();

    let err = order(&table, &SortSpec::new(), &ctx).unwrap_err();
    assert!(matches!(err, OrderError::InvalidSortSpec { .. }));

    let spec = SortSpec::new().by(SortColumn::asc("missing"));
    let err = order(&table, &spec, &ctx).unwrap_err();
    assert!(matches!(err, OrderError::InvalidSortSpec { .. }));
}

#[test]
fn test_table_construction_errors() {
    let err = Table::new([
        ("x", Column::integers([1, 2])),
        ("y", Column::integers([1])),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        OrderError::ColumnLengthMismatch {
            column: "y".to_string(),
            expected: 2,
            actual: 1
        }
    );

    let err = Table::new([("x", Column::integers([1])), ("x", Column::integers([2]))]).unwrap_err();
    assert!(matches!(err, OrderError::DuplicateColumn { .. }));
}

#[test]
fn test_mutable_order() {
    let mut data = vec![
        "banana".to_string(),
        "apple".to_string(),
        "cherry".to_string(),
    ];
    order_mut(&mut data);
    assert_eq!(data, vec!["apple", "banana", "cherry"]);
}
