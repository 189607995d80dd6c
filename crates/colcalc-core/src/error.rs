//! Error types for colcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in colcalc-core
#[derive(Debug, Error)]
pub enum Error {
    /// Column written with a length different from the table's row count
    #[error("Column '{column}' has {actual} rows, table has {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column not found by name
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Same column name supplied twice when building a table
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Invalid column name
    #[error("Invalid column name: {0:?}")]
    InvalidColumnName(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
