use std::cmp::Ordering;
use std::collections::HashMap;

use locsort::prelude::*;
use locsort::{OrderError, Value};
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

type Row = (Option<i64>, Option<String>);

/// Nulls sort last, values in natural (byte) order.
fn cmp_nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Reference: gather rows per unique key, then sort the unique keys.
fn group_then_sort(rows: &[Row]) -> Vec<(Row, Vec<usize>)> {
    let mut seen: HashMap<Row, usize> = HashMap::new();
    let mut groups: Vec<(Row, Vec<usize>)> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        match seen.get(row) {
            Some(&g) => groups[g].1.push(i),
            None => {
                seen.insert(row.clone(), groups.len());
                groups.push((row.clone(), vec![i]));
            }
        }
    }
    groups.sort_by(|(a, _), (b, _)| {
        cmp_nulls_last(&a.0, &b.0).then_with(|| cmp_nulls_last(&a.1, &b.1))
    });
    groups
}

fn to_value<T: Into<Value>>(v: Option<T>) -> Value {
    v.map_or(Value::Null, Into::into)
}

fn table_of(rows: &[Row]) -> Table {
    let numbers = rows.iter().map(|r| r.0).collect();
    let strings = rows.iter().map(|r| r.1.clone()).collect();
    Table::new([
        ("n", Column::Integer(numbers)),
        ("s", Column::Character(strings)),
    ])
    .unwrap()
}

const WORDS: [&str; 6] = ["", "a", "A", "ab", "b", "é"];

fn random_rows(rng: &mut StdRng, count: usize) -> Vec<Row> {
    (0..count)
        .map(|_| {
            let n = (rng.random_range(0..10) > 0).then(|| rng.random_range(-3..3));
            let s = (rng.random_range(0..10) > 0)
                .then(|| WORDS[rng.random_range(0..WORDS.len())].to_string());
            (n, s)
        })
        .collect()
}

#[test]
fn test_groups_match_two_pass_reference() {
    let mut rng = StdRng::seed_from_u64(7);
    for count in [0, 1, 2, 10, 100, 1_000, 20_000] {
        let rows = random_rows(&mut rng, count);
        let table = table_of(&rows);
        let groups = locate_sorted_groups(&table, &["n", "s"], &OrderContext::new()).unwrap();
        let reference = group_then_sort(&rows);

        assert_eq!(
            groups.len(),
            reference.len(),
            "group count for {count} rows"
        );
        for (run, ((n, s), members)) in groups.iter().zip(reference) {
            assert_eq!(run.key(), &[to_value(n), to_value(s)]);
            assert_eq!(run.rows(), members.as_slice());
        }
    }
}

#[test]
fn test_groups_match_ordered_runs() {
    let mut rng = StdRng::seed_from_u64(11);
    let rows = random_rows(&mut rng, 5_000);
    let table = table_of(&rows);
    let ctx = OrderContext::new();

    let spec = SortSpec::new().by(SortColumn::asc("n")).by(SortColumn::asc("s"));
    let permutation = order(&table, &spec, &ctx).unwrap();
    let groups = locate_sorted_groups(&table, &["n", "s"], &ctx).unwrap();

    // Concatenating runs in emitted order is exactly the ordered row list.
    let concatenated: Vec<usize> = groups.iter().flat_map(|run| run.rows().to_vec()).collect();
    assert_eq!(concatenated, permutation.into_vec());
}

#[test]
fn test_partition_is_complete() {
    let mut rng = StdRng::seed_from_u64(3);
    let rows = random_rows(&mut rng, 2_500);
    let table = table_of(&rows);
    let groups = locate_sorted_groups(&table, &["s"], &OrderContext::new()).unwrap();

    let mut seen = vec![false; rows.len()];
    for run in &groups {
        for &row in run.rows() {
            assert!(!seen[row], "row {row} in two groups");
            seen[row] = true;
        }
    }
    assert!(seen.iter().all(|&s| s));

    let ids = groups.group_ids();
    for (g, run) in groups.iter().enumerate() {
        assert!(run.rows().iter().all(|&row| ids[row] == g));
    }
    assert_eq!(groups.sizes().iter().sum::<usize>(), rows.len());
}

#[test]
fn test_single_group_and_all_distinct() {
    let same = Table::new([("x", Column::integers([5; 100]))]).unwrap();
    let groups = locate_sorted_groups(&same, &["x"], &OrderContext::new()).unwrap();
    assert_eq!(groups.len(), 1);
    let all: Vec<usize> = (0..100).collect();
    assert_eq!(groups.runs()[0].rows(), all.as_slice());

    let distinct = Table::new([("x", Column::integers((0..100).rev()))]).unwrap();
    let groups = locate_sorted_groups(&distinct, &["x"], &OrderContext::new()).unwrap();
    assert_eq!(groups.len(), 100);
    assert_eq!(groups.runs()[0].key(), &[Value::Integer(0)]);
    assert_eq!(groups.runs()[0].rows(), &[99]);
}

#[test]
fn test_signed_zero_groups_together() {
    let table = Table::new([("x", Column::reals([0.0, -0.0, 1.0]))]).unwrap();
    let groups = locate_sorted_groups(&table, &["x"], &OrderContext::new()).unwrap();
    assert_eq!(groups.sizes(), vec![2, 1]);
    assert_eq!(groups.runs()[0].key(), &[Value::Real(0.0)]);
}

#[test]
fn test_record_keys_decode_to_values() {
    let fields = vec![Column::integers([2, 1, 2]), Column::strings(["x", "y", "x"])];
    let table = Table::new([("r", Column::Record(fields))]).unwrap();
    let groups = locate_sorted_groups(&table, &["r"], &OrderContext::new()).unwrap();

    let (key, rows) = groups.into_runs().remove(1).into_parts();
    let expected = Value::Record(vec![Value::Integer(2), Value::from("x")]);
    assert_eq!(key, vec![expected]);
    assert_eq!(rows, vec![0, 2]);
}

#[test]
fn test_empty_input() {
    let table = Table::new([("x", Column::integers([]))]).unwrap();
    let groups = locate_sorted_groups(&table, &["x"], &OrderContext::new()).unwrap();
    assert!(groups.is_empty());
    assert!(groups.group_ids().is_empty());
}

#[test]
fn test_group_errors() {
    let table = Table::new([
        ("x", Column::integers([1, 2])),
        ("l", Column::List(vec![None, None])),
    ])
    .unwrap();
    let ctx = OrderContext::new();

    assert!(matches!(
        locate_sorted_groups(&table, &[], &ctx).unwrap_err(),
        OrderError::InvalidSortSpec { .. }
    ));
    assert!(matches!(
        locate_sorted_groups(&table, &["nope"], &ctx).unwrap_err(),
        OrderError::InvalidSortSpec { .. }
    ));
    assert!(matches!(
        locate_sorted_groups(&table, &["x", "l"], &ctx).unwrap_err(),
        OrderError::UnsupportedTypeForOrdering { .. }
    ));
}
