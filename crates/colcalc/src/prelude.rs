//! Prelude module - common imports for colcalc users
//!
//! ```rust
//! use colcalc::prelude::*;
//! ```

pub use crate::{
    // Engine types
    ApplyStats,
    EngineConfig,
    // Error types
    Error,
    FormulaEngine,
    FormulaError,
    FormulaResult,
    FormulaStore,
    FormulaValue,
    FunctionArgs,
    FunctionDef,
    FunctionEntry,
    FunctionRegistry,
    IssueKind,
    Result,
    // Main types
    Table,
    ValidationIssue,
    Value,
};

#[cfg(feature = "csv")]
pub use crate::{
    // I/O types
    CsvReader,
    CsvWriter,
    // Extension traits
    TableExt,
};
