//! Error taxonomy for ordering and grouping.
//!
//! Every error is raised while validating a call, before any row is encoded
//! or ordered, so a failed call never yields a partial permutation.

use thiserror::Error;

/// Errors produced by the order/group engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// A column's element type has no defined total order.
    #[error("column '{column}' of type {data_type} has no defined ordering")]
    UnsupportedTypeForOrdering { column: String, data_type: String },

    /// A named locale was requested but no collation service can honour it.
    #[error(
        "locale '{locale}' requires a collation service, but none is available; \
         use the \"C\" locale or install a collation service"
    )]
    UnavailableCollationService { locale: String },

    /// The sort or grouping specification is unusable.
    #[error("invalid sort specification: {reason}")]
    InvalidSortSpec { reason: String },

    /// A locale tag could not be parsed.
    #[error("invalid locale identifier: '{tag}'")]
    InvalidLocale { tag: String },

    /// A column's length differs from the rest of the table.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns share a name.
    #[error("duplicate column name: '{name}'")]
    DuplicateColumn { name: String },
}

impl OrderError {
    pub(crate) fn invalid_spec(reason: impl Into<String>) -> Self {
        Self::InvalidSortSpec {
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, OrderError>;
