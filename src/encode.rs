//! Byte-comparable key encoding.
//!
//! Every cell becomes a byte string such that comparing two strings byte-wise
//! gives the order of the cells under their column's direction and
//! collation. Multi-column keys are the per-column encodings concatenated in
//! sort order; every per-column encoding is prefix-free, so the
//! concatenation compares column by column.
//!
//! Per-cell layout:
//! - A null tag: with nulls first a null is `0x00` and a value `0x01`; with
//!   nulls last a value is `0x01` and a null `0x02`. Nothing follows a null.
//!   The tag is never inverted, so null placement ignores direction.
//! - The payload:
//!   - integer / datetime: `i64` with the sign bit flipped, big-endian,
//!   - date: `i32` with the sign bit flipped, big-endian,
//!   - logical: one byte,
//!   - real: IEEE-754 total-order bits (`-0.0` folded onto `0.0`, every NaN
//!     folded onto one NaN that sorts above `+inf`),
//!   - character: the text strategy's bytes with `0x00` escaped to
//!     `0x00 0xFF`, then a `0x00 0x00` terminator,
//!   - record: each field encoded in turn, with its own null tag.
//! - For descending columns, every payload byte is inverted.

use std::ops::Range;

use rayon::prelude::*;
use tracing::debug;

use crate::collation::TextKeyStrategy;
use crate::core::KeyAccessor;
use crate::error::{OrderError, Result};
use crate::locale::ResolvedLocale;
use crate::order::{Direction, NullPlacement, SortSpec};
use crate::table::{Column, Table};

const TAG_NULL_FIRST: u8 = 0x00;
const TAG_VALUE: u8 = 0x01;
const TAG_NULL_LAST: u8 = 0x02;

const SIGN_BIT_64: u64 = 1 << 63;
const SIGN_BIT_32: u32 = 1 << 31;

const PARALLEL_ENCODE_ROWS: usize = 16 * 1024;

/// Encoded keys for a whole table, one per row, in a single flat buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedKeys {
    data: Vec<u8>,
    offsets: Vec<usize>,
}

impl EncodedKeys {
    fn with_capacity(rows: usize) -> Self {
        let mut offsets = Vec::with_capacity(rows + 1);
        offsets.push(0);
        Self {
            data: Vec::new(),
            offsets,
        }
    }

    /// Key of row `index`.
    pub fn key(&self, index: usize) -> &[u8] {
        &self.data[self.offsets[index]..self.offsets[index + 1]]
    }

    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of key bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    fn finish_row(&mut self) {
        self.offsets.push(self.data.len());
    }

    fn append(&mut self, other: EncodedKeys) {
        let base = self.data.len();
        self.data.extend_from_slice(&other.data);
        self.offsets
            .extend(other.offsets.iter().skip(1).map(|&o| o + base));
    }
}

impl KeyAccessor for EncodedKeys {
    #[inline]
    fn get_key(&self, index: usize) -> &[u8] {
        self.key(index)
    }

    fn len(&self) -> usize {
        EncodedKeys::len(self)
    }
}

/// One column prepared for encoding.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeyColumn<'a> {
    pub name: &'a str,
    pub column: &'a Column,
    pub text: &'a dyn TextKeyStrategy,
    pub direction: Direction,
    pub nulls: NullPlacement,
}

/// Fails with [`OrderError::UnsupportedTypeForOrdering`] if `column` has no
/// total order.
pub fn check_orderable(name: &str, column: &Column) -> Result<()> {
    let data_type = column.data_type();
    if data_type.is_orderable() {
        Ok(())
    } else {
        Err(OrderError::UnsupportedTypeForOrdering {
            column: name.to_string(),
            data_type: data_type.to_string(),
        })
    }
}

/// Encodes a single column.
///
/// Record fields must all have the record's length, otherwise this fails
/// with [`OrderError::ColumnLengthMismatch`].
pub fn encode_column(
    column: &Column,
    text: &dyn TextKeyStrategy,
    direction: Direction,
    nulls: NullPlacement,
) -> Result<EncodedKeys> {
    column.check_record_lengths("column")?;
    let key_column = KeyColumn {
        name: "column",
        column,
        text,
        direction,
        nulls,
    };
    encode_key_columns(&[key_column], column.len())
}

/// Encodes the composite key of every row of `table` under `spec`.
///
/// `spec` must already be validated against the table. Character columns
/// use `locale` unless their sort column names another text strategy.
pub fn encode_table(
    table: &Table,
    spec: &SortSpec,
    locale: &ResolvedLocale,
) -> Result<EncodedKeys> {
    let columns = spec
        .columns()
        .iter()
        .map(|sort_column| {
            let name = sort_column.name();
            let column = table
                .column(name)
                .ok_or_else(|| OrderError::invalid_spec(format!("unknown column '{name}'")))?;
            Ok::<_, OrderError>(KeyColumn {
                name,
                column,
                text: sort_column.text_strategy().unwrap_or(locale),
                direction: sort_column.direction(),
                nulls: sort_column.null_placement(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    encode_key_columns(&columns, table.num_rows())
}

pub(crate) fn encode_key_columns(columns: &[KeyColumn<'_>], rows: usize) -> Result<EncodedKeys> {
    for c in columns {
        check_orderable(c.name, c.column)?;
    }

    let keys = if rows < PARALLEL_ENCODE_ROWS {
        encode_range(columns, 0..rows)?
    } else {
        let chunks = (0..rows)
            .step_by(PARALLEL_ENCODE_ROWS)
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|start| {
                let end = (start + PARALLEL_ENCODE_ROWS).min(rows);
                encode_range(columns, start..end)
            })
            .collect::<Result<Vec<_>>>()?;
        let mut keys = EncodedKeys::with_capacity(rows);
        chunks.into_iter().for_each(|chunk| keys.append(chunk));
        keys
    };

    debug!(
        rows,
        columns = columns.len(),
        key_bytes = keys.byte_len(),
        "encoded sort keys"
    );
    Ok(keys)
}

fn encode_range(columns: &[KeyColumn<'_>], rows: Range<usize>) -> Result<EncodedKeys> {
    let mut keys = EncodedKeys::with_capacity(rows.len());
    let mut scratch = Vec::new();
    for row in rows {
        for c in columns {
            encode_cell(c, c.column, row, &mut keys.data, &mut scratch)?;
        }
        keys.finish_row();
    }
    Ok(keys)
}

/// Pushes the null tag; returns the value when there is one.
#[inline]
fn tag<T: Copy>(value: Option<T>, nulls: NullPlacement, out: &mut Vec<u8>) -> Option<T> {
    match (value, nulls) {
        (Some(v), _) => {
            out.push(TAG_VALUE);
            Some(v)
        }
        (None, NullPlacement::First) => {
            out.push(TAG_NULL_FIRST);
            None
        }
        (None, NullPlacement::Last) => {
            out.push(TAG_NULL_LAST);
            None
        }
    }
}

#[inline]
fn finish_payload(out: &mut [u8], start: usize, direction: Direction) {
    if direction == Direction::Descending {
        out[start..].iter_mut().for_each(|b| *b = !*b);
    }
}

fn encode_cell(
    c: &KeyColumn<'_>,
    column: &Column,
    row: usize,
    out: &mut Vec<u8>,
    scratch: &mut Vec<u8>,
) -> Result<()> {
    match column {
        Column::Integer(v) | Column::DateTime(v) => {
            if let Some(x) = tag(v[row], c.nulls, out) {
                let start = out.len();
                out.extend_from_slice(&((x as u64) ^ SIGN_BIT_64).to_be_bytes());
                finish_payload(out, start, c.direction);
            }
        }
        Column::Date(v) => {
            if let Some(x) = tag(v[row], c.nulls, out) {
                let start = out.len();
                out.extend_from_slice(&((x as u32) ^ SIGN_BIT_32).to_be_bytes());
                finish_payload(out, start, c.direction);
            }
        }
        Column::Logical(v) => {
            if let Some(x) = tag(v[row], c.nulls, out) {
                let start = out.len();
                out.push(u8::from(x));
                finish_payload(out, start, c.direction);
            }
        }
        Column::Real(v) => {
            if let Some(x) = tag(v[row], c.nulls, out) {
                let start = out.len();
                out.extend_from_slice(&real_key(x).to_be_bytes());
                finish_payload(out, start, c.direction);
            }
        }
        Column::Character(v) => {
            if let Some(text) = tag(v[row].as_deref(), c.nulls, out) {
                scratch.clear();
                c.text.append_key(text, scratch);
                let start = out.len();
                escape_into(scratch, out);
                finish_payload(out, start, c.direction);
            }
        }
        Column::Record(fields) => {
            for field in fields {
                encode_cell(c, field, row, out, scratch)?;
            }
        }
        Column::List(_) => {
            return Err(OrderError::UnsupportedTypeForOrdering {
                column: c.name.to_string(),
                data_type: column.data_type().to_string(),
            });
        }
    }
    Ok(())
}

/// Maps an `f64` to a `u64` whose unsigned order is the numeric order.
#[inline]
fn real_key(x: f64) -> u64 {
    let x = if x == 0.0 {
        0.0
    } else if x.is_nan() {
        f64::NAN
    } else {
        x
    };
    let bits = x.to_bits();
    if bits & SIGN_BIT_64 != 0 {
        !bits
    } else {
        bits | SIGN_BIT_64
    }
}

/// Escapes `0x00` and terminates, keeping the encoding prefix-free.
#[inline]
fn escape_into(bytes: &[u8], out: &mut Vec<u8>) {
    out.reserve(bytes.len() + 2);
    for &b in bytes {
        if b == 0 {
            out.extend_from_slice(&[0x00, 0xFF]);
        } else {
            out.push(b);
        }
    }
    out.extend_from_slice(&[0x00, 0x00]);
}
