//! Columnar table model consumed by the engine.
//!
//! A [`Table`] is an ordered set of uniquely named [`Column`]s of equal
//! length. Columns are immutable once built; reordering produces a new table
//! via [`Table::take`].

use std::fmt;

use crate::algo::Permutation;
use crate::error::{OrderError, Result};

/// A single cell value, used when decoding group keys and rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Logical(bool),
    Character(String),
    /// Days since 1970-01-01.
    Date(i32),
    /// Microseconds since 1970-01-01T00:00:00Z.
    DateTime(i64),
    Record(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Logical(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Character(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Character(v)
    }
}

/// Declared element type of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Real,
    Logical,
    Character,
    Date,
    DateTime,
    Record(Vec<DataType>),
    List,
}

impl DataType {
    /// Whether values of this type have a total order.
    pub fn is_orderable(&self) -> bool {
        match self {
            DataType::List => false,
            DataType::Record(fields) => fields.iter().all(DataType::is_orderable),
            _ => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => f.write_str("integer"),
            DataType::Real => f.write_str("real"),
            DataType::Logical => f.write_str("logical"),
            DataType::Character => f.write_str("character"),
            DataType::Date => f.write_str("date"),
            DataType::DateTime => f.write_str("datetime"),
            DataType::List => f.write_str("list"),
            DataType::Record(fields) => {
                f.write_str("record<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(">")
            }
        }
    }
}

/// A typed, nullable column.
///
/// `Record` columns hold equally-long field columns; nulls live in the
/// fields, a record row itself is never null.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Integer(Vec<Option<i64>>),
    Real(Vec<Option<f64>>),
    Logical(Vec<Option<bool>>),
    Character(Vec<Option<String>>),
    Date(Vec<Option<i32>>),
    DateTime(Vec<Option<i64>>),
    Record(Vec<Column>),
    List(Vec<Option<Vec<Value>>>),
}

impl Column {
    pub fn integers(values: impl IntoIterator<Item = i64>) -> Self {
        Column::Integer(values.into_iter().map(Some).collect())
    }

    pub fn reals(values: impl IntoIterator<Item = f64>) -> Self {
        Column::Real(values.into_iter().map(Some).collect())
    }

    pub fn logicals(values: impl IntoIterator<Item = bool>) -> Self {
        Column::Logical(values.into_iter().map(Some).collect())
    }

    pub fn strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Column::Character(values.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn dates(values: impl IntoIterator<Item = i32>) -> Self {
        Column::Date(values.into_iter().map(Some).collect())
    }

    /// Number of rows. A record with no fields has zero rows.
    pub fn len(&self) -> usize {
        match self {
            Column::Integer(v) => v.len(),
            Column::Real(v) => v.len(),
            Column::Logical(v) => v.len(),
            Column::Character(v) => v.len(),
            Column::Date(v) => v.len(),
            Column::DateTime(v) => v.len(),
            Column::Record(fields) => fields.first().map_or(0, Column::len),
            Column::List(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Column::Integer(_) => DataType::Integer,
            Column::Real(_) => DataType::Real,
            Column::Logical(_) => DataType::Logical,
            Column::Character(_) => DataType::Character,
            Column::Date(_) => DataType::Date,
            Column::DateTime(_) => DataType::DateTime,
            Column::Record(fields) => {
                DataType::Record(fields.iter().map(Column::data_type).collect())
            }
            Column::List(_) => DataType::List,
        }
    }

    /// Decodes the value stored at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn value(&self, row: usize) -> Value {
        match self {
            Column::Integer(v) => v[row].map_or(Value::Null, Value::Integer),
            Column::Real(v) => v[row].map_or(Value::Null, Value::Real),
            Column::Logical(v) => v[row].map_or(Value::Null, Value::Logical),
            Column::Character(v) => v[row].clone().map_or(Value::Null, Value::Character),
            Column::Date(v) => v[row].map_or(Value::Null, Value::Date),
            Column::DateTime(v) => v[row].map_or(Value::Null, Value::DateTime),
            Column::Record(fields) => Value::Record(fields.iter().map(|f| f.value(row)).collect()),
            Column::List(v) => v[row].clone().map_or(Value::Null, Value::List),
        }
    }

    /// Gathers the rows named by `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Column {
        fn gather<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| values[i].clone()).collect()
        }

        match self {
            Column::Integer(v) => Column::Integer(gather(v, indices)),
            Column::Real(v) => Column::Real(gather(v, indices)),
            Column::Logical(v) => Column::Logical(gather(v, indices)),
            Column::Character(v) => Column::Character(gather(v, indices)),
            Column::Date(v) => Column::Date(gather(v, indices)),
            Column::DateTime(v) => Column::DateTime(gather(v, indices)),
            Column::Record(fields) => {
                Column::Record(fields.iter().map(|f| f.take(indices)).collect())
            }
            Column::List(v) => Column::List(gather(v, indices)),
        }
    }

    pub(crate) fn check_record_lengths(&self, name: &str) -> Result<()> {
        if let Column::Record(fields) = self {
            let expected = self.len();
            for (i, field) in fields.iter().enumerate() {
                if field.len() != expected {
                    return Err(OrderError::ColumnLengthMismatch {
                        column: format!("{name}.{i}"),
                        expected,
                        actual: field.len(),
                    });
                }
                field.check_record_lengths(&format!("{name}.{i}"))?;
            }
        }
        Ok(())
    }
}

impl From<Vec<Option<i64>>> for Column {
    fn from(v: Vec<Option<i64>>) -> Self {
        Column::Integer(v)
    }
}

impl From<Vec<Option<f64>>> for Column {
    fn from(v: Vec<Option<f64>>) -> Self {
        Column::Real(v)
    }
}

impl From<Vec<Option<bool>>> for Column {
    fn from(v: Vec<Option<bool>>) -> Self {
        Column::Logical(v)
    }
}

impl From<Vec<Option<&str>>> for Column {
    fn from(v: Vec<Option<&str>>) -> Self {
        Column::Character(v.into_iter().map(|s| s.map(str::to_string)).collect())
    }
}

/// An ordered set of named, equally-long columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Builds a table, checking that names are unique and lengths agree.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = (S, Column)>) -> Result<Self> {
        let mut table = Table::default();
        for (name, column) in columns {
            let name = name.into();
            if table.names.contains(&name) {
                return Err(OrderError::DuplicateColumn { name });
            }
            column.check_record_lengths(&name)?;
            if table.columns.is_empty() {
                table.num_rows = column.len();
            } else if column.len() != table.num_rows {
                return Err(OrderError::ColumnLengthMismatch {
                    column: name,
                    expected: table.num_rows,
                    actual: column.len(),
                });
            }
            table.names.push(name);
            table.columns.push(column);
        }
        Ok(table)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Decodes every column at `row`.
    pub fn row(&self, row: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.value(row)).collect()
    }

    /// Reorders every column by `permutation`.
    pub fn take(&self, permutation: &Permutation) -> Table {
        Table {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| c.take(permutation.indices()))
                .collect(),
            num_rows: permutation.len(),
        }
    }
}
