//! Error types for table operations

use thiserror::Error;

/// Errors raised by table construction and transformation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Adding or renaming to a column name that already exists
    #[error("column {0:?} already exists")]
    DuplicateColumn(String),

    /// Referencing a column that is not part of the schema
    #[error("column {0:?} does not exist")]
    UnknownColumn(String),

    /// The table does not conform to a requested schema
    #[error("schema mismatch on column {column:?}: {reason}")]
    SchemaMismatch { column: String, reason: String },

    /// Malformed policy strings, wrongly shaped rows, bad expressions
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation needed at least one row to infer structure
    #[error("{0} requires at least one row")]
    EmptyTable(String),
}

impl TableError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TableError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
