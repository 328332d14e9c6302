//! Sorted group location.
//!
//! Grouping orders the rows by the grouping columns and then walks the
//! ordered rows once, starting a new run whenever the key differs from the
//! previous row's. Each run is one group, and the runs come out already in
//! ascending key order, so the unique keys never need a sort of their own.
//! Rows inside a run keep their original relative order because the
//! ordering is stable.

use tracing::debug;

use crate::algo::order_keys;
use crate::context::OrderContext;
use crate::core::KeyAccessor;
use crate::encode::{check_orderable, encode_table};
use crate::error::{OrderError, Result};
use crate::locale::{LocaleId, resolve_locale};
use crate::order::{SortColumn, SortSpec};
use crate::table::{Column, Table, Value};

/// One group: its key values and the rows holding them.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRun {
    key: Vec<Value>,
    rows: Vec<usize>,
}

impl GroupRun {
    /// Key values, one per grouping column, decoded from the table.
    pub fn key(&self) -> &[Value] {
        &self.key
    }

    /// Original row indices in this group, in input order.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Value>, Vec<usize>) {
        (self.key, self.rows)
    }
}

/// All groups of a table, in ascending key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedGroups {
    runs: Vec<GroupRun>,
    num_rows: usize,
}

impl SortedGroups {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of rows in the grouped table.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn runs(&self) -> &[GroupRun] {
        &self.runs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupRun> {
        self.runs.iter()
    }

    pub fn into_runs(self) -> Vec<GroupRun> {
        self.runs
    }

    /// Size of every group.
    pub fn sizes(&self) -> Vec<usize> {
        self.runs.iter().map(GroupRun::len).collect()
    }

    /// For each original row, the index of the group it belongs to.
    pub fn group_ids(&self) -> Vec<usize> {
        let mut ids = vec![0; self.num_rows];
        for (group, run) in self.runs.iter().enumerate() {
            for &row in &run.rows {
                ids[row] = group;
            }
        }
        ids
    }
}

impl<'a> IntoIterator for &'a SortedGroups {
    type Item = &'a GroupRun;
    type IntoIter = std::slice::Iter<'a, GroupRun>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}

/// Groups `table` by the columns named in `group_by`, using the locale
/// resolved from `ctx`.
///
/// # Examples
///
/// ```
/// use locsort::{Column, OrderContext, Table, Value, locate_sorted_groups};
///
/// let table = Table::new([("g", Column::strings(["b", "a", "b", "a"]))])?;
/// let groups = locate_sorted_groups(&table, &["g"], &OrderContext::new())?;
///
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups.runs()[0].key(), &[Value::from("a")]);
/// assert_eq!(groups.runs()[0].rows(), &[1, 3]);
/// assert_eq!(groups.runs()[1].rows(), &[0, 2]);
/// # Ok::<(), locsort::OrderError>(())
/// ```
pub fn locate_sorted_groups(
    table: &Table,
    group_by: &[&str],
    ctx: &OrderContext,
) -> Result<SortedGroups> {
    locate_sorted_groups_with_locale(table, group_by, None, ctx)
}

/// Like [`locate_sorted_groups`], with an explicit locale taking precedence
/// over the context and process-wide settings.
pub fn locate_sorted_groups_with_locale(
    table: &Table,
    group_by: &[&str],
    locale: Option<&LocaleId>,
    ctx: &OrderContext,
) -> Result<SortedGroups> {
    let mut spec: SortSpec = group_by.iter().map(|&name| SortColumn::asc(name)).collect();
    if let Some(locale) = locale {
        spec = spec.with_locale(locale.clone());
    }

    spec.validate(table)?;
    let resolved = resolve_locale(spec.locale(), ctx)?;
    let columns = group_by
        .iter()
        .map(|&name| {
            let column = table
                .column(name)
                .ok_or_else(|| OrderError::invalid_spec(format!("unknown column '{name}'")))?;
            check_orderable(name, column)?;
            Ok::<_, OrderError>(column)
        })
        .collect::<Result<Vec<&Column>>>()?;

    let keys = encode_table(table, &spec, &resolved)?;
    let permutation = order_keys(&keys);

    let mut runs = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for row in permutation.iter() {
        if let Some(&previous) = current.last()
            && keys.get_key(previous) != keys.get_key(row)
        {
            runs.push(make_run(&columns, std::mem::take(&mut current)));
        }
        current.push(row);
    }
    if !current.is_empty() {
        runs.push(make_run(&columns, current));
    }

    debug!(
        rows = table.num_rows(),
        groups = runs.len(),
        "located sorted groups"
    );

    Ok(SortedGroups {
        runs,
        num_rows: table.num_rows(),
    })
}

fn make_run(columns: &[&Column], rows: Vec<usize>) -> GroupRun {
    let first = rows[0];
    GroupRun {
        key: columns.iter().map(|c| c.value(first)).collect(),
        rows,
    }
}
