//! Sort specifications and the table ordering entry points.

use std::sync::Arc;

use crate::algo::{Permutation, order_keys};
use crate::collation::{NaturalText, TextKeyStrategy};
use crate::context::OrderContext;
use crate::encode::{check_orderable, encode_table};
use crate::error::{OrderError, Result};
use crate::locale::{LocaleId, resolve_locale};
use crate::table::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Where missing values go, regardless of direction and locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NullPlacement {
    First,
    #[default]
    Last,
}

/// One column of a [`SortSpec`].
#[derive(Debug, Clone)]
pub struct SortColumn {
    name: String,
    direction: Direction,
    nulls: NullPlacement,
    text: Option<Arc<dyn TextKeyStrategy>>,
}

impl SortColumn {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            nulls: NullPlacement::default(),
            text: None,
        }
    }

    pub fn asc(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Ascending)
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Descending)
    }

    pub fn nulls(mut self, nulls: NullPlacement) -> Self {
        self.nulls = nulls;
        self
    }

    pub fn nulls_first(self) -> Self {
        self.nulls(NullPlacement::First)
    }

    pub fn nulls_last(self) -> Self {
        self.nulls(NullPlacement::Last)
    }

    /// Orders this column's text with `strategy` instead of the call's
    /// collation.
    pub fn text_keys(mut self, strategy: Arc<dyn TextKeyStrategy>) -> Self {
        self.text = Some(strategy);
        self
    }

    /// Orders this column's text naturally, digit runs by numeric value.
    pub fn natural(self) -> Self {
        self.text_keys(Arc::new(NaturalText))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn null_placement(&self) -> NullPlacement {
        self.nulls
    }

    pub fn text_strategy(&self) -> Option<&dyn TextKeyStrategy> {
        self.text.as_deref()
    }
}

/// Ordered list of sort columns plus an optional explicit locale.
///
/// # Examples
///
/// ```
/// use locsort::{Column, OrderContext, SortColumn, SortSpec, Table, order};
///
/// let table = Table::new([
///     ("x", Column::integers([1, 1, 2])),
///     ("y", Column::strings(["b", "a", "a"])),
/// ])?;
/// let spec = SortSpec::new()
///     .by(SortColumn::asc("x"))
///     .by(SortColumn::desc("y"));
///
/// let permutation = order(&table, &spec, &OrderContext::new())?;
/// assert_eq!(permutation.indices(), &[0, 1, 2]);
/// # Ok::<(), locsort::OrderError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SortSpec {
    columns: Vec<SortColumn>,
    locale: Option<LocaleId>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(mut self, column: SortColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_locale(mut self, locale: LocaleId) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn columns(&self) -> &[SortColumn] {
        &self.columns
    }

    pub fn locale(&self) -> Option<&LocaleId> {
        self.locale.as_ref()
    }

    /// Checks that there is at least one sort column and that each one exists.
    pub fn validate(&self, table: &Table) -> Result<()> {
        if self.columns.is_empty() {
            return Err(OrderError::invalid_spec("no columns to order by"));
        }
        for column in &self.columns {
            if table.column(column.name()).is_none() {
                return Err(OrderError::invalid_spec(format!(
                    "unknown column '{}'",
                    column.name()
                )));
            }
        }
        Ok(())
    }

    fn check_types(&self, table: &Table) -> Result<()> {
        for sort_column in &self.columns {
            if let Some(column) = table.column(sort_column.name()) {
                check_orderable(sort_column.name(), column)?;
            }
        }
        Ok(())
    }
}

impl FromIterator<SortColumn> for SortSpec {
    fn from_iter<I: IntoIterator<Item = SortColumn>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
            locale: None,
        }
    }
}

/// Computes the stable permutation ordering `table` by `spec`.
///
/// Validation runs before any row is encoded, in this order: the columns, the
/// locale, the column types.
pub fn order(table: &Table, spec: &SortSpec, ctx: &OrderContext) -> Result<Permutation> {
    spec.validate(table)?;
    let locale = resolve_locale(spec.locale(), ctx)?;
    spec.check_types(table)?;

    let keys = encode_table(table, spec, &locale)?;
    Ok(order_keys(&keys))
}

/// Returns `table` with its rows reordered by `spec`.
pub fn sort_table(table: &Table, spec: &SortSpec, ctx: &OrderContext) -> Result<Table> {
    let permutation = order(table, spec, ctx)?;
    Ok(table.take(&permutation))
}
