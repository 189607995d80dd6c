//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Expression text does not follow the formula grammar
    #[error("Malformed formula at position {position}: {message}")]
    MalformedFormula { position: usize, message: String },

    /// Function marker that is not in the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Column reference absent from the table at evaluation time
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// A column-valued result whose length differs from the table
    #[error("Result has {actual} rows, table has {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Table error raised while writing a result
    #[error(transparent)]
    Table(#[from] colcalc_core::Error),

    /// Error raised while applying one formula of a batch
    #[error("Failed to evaluate formula for '{target}': {formula}: {source}")]
    InFormula {
        target: String,
        formula: String,
        #[source]
        source: Box<FormulaError>,
    },
}

impl FormulaError {
    pub(crate) fn malformed(position: usize, message: impl Into<String>) -> Self {
        FormulaError::MalformedFormula {
            position,
            message: message.into(),
        }
    }

    /// The underlying error, looking through [`FormulaError::InFormula`]
    pub fn root_cause(&self) -> &FormulaError {
        match self {
            FormulaError::InFormula { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
