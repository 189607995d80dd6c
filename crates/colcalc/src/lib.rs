//! # colcalc
//!
//! Named column formulas over in-memory tables.
//!
//! Each formula is written in a small `@function(args)` language and
//! computes one column from the columns before it. Formulas are applied in
//! order, in a single pass, so a formula can read the columns written by
//! earlier formulas but never the ones written after it.
//!
//! ## Features
//!
//! - Vectorized built-in functions (arithmetic, comparison, logic, text,
//!   null handling, math, aggregation) and custom functions
//! - Static column-reference extraction and validation without evaluation
//! - JSON engine configuration files
//! - CSV input and output (`csv` feature, on by default)
//!
//! ## Example
//!
//! ```rust
//! use colcalc::prelude::*;
//!
//! let mut table = Table::from_columns([
//!     ("price", vec![100.0, 250.0]),
//!     ("qty", vec![2.0, 1.0]),
//! ])
//! .unwrap();
//!
//! let mut engine = FormulaEngine::new();
//! engine
//!     .add_formula("total", "@mul(price, qty)")
//!     .add_formula("big", "@gt(total, 200)");
//!
//! let stats = engine.apply(&mut table).unwrap();
//! assert_eq!(stats.formulas_applied, 2);
//! assert_eq!(table.column("big").unwrap()[1], Value::Boolean(true));
//!
//! // Save to file
//! // table.save("output.csv").unwrap();
//! ```

pub mod config;
pub mod prelude;

// Re-export configuration types
pub use config::{ColumnSpec, ColumnSpecs, ConfigError, ConfigResult, EngineConfig, CONFIG_VERSION};

// Re-export core types
pub use colcalc_core::{Error, OrderedMap, Result, Table, Value};

// Re-export formula types
pub use colcalc_formula::{
    evaluate, evaluate_formula, extract_references, extract_references_batch, parse_formula,
    validate_formulas, ApplyStats, EngineSnapshot, EvaluationContext, Formula, FormulaEngine,
    FormulaError, FormulaExpr, FormulaResult, FormulaStore, FormulaValue, FunctionArgs,
    FunctionDef, FunctionEntry, FunctionRegistry, IssueKind, ReferenceSet, ValidationIssue,
};

// Re-export I/O types
#[cfg(feature = "csv")]
pub use colcalc_csv::{CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter, LineTerminator};

#[cfg(feature = "csv")]
use std::path::Path;

/// Extension trait for Table to add file I/O
#[cfg(feature = "csv")]
pub trait TableExt: Sized {
    /// Open a table from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Save the table to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

#[cfg(feature = "csv")]
impl TableExt for Table {
    fn open<P: AsRef<Path>>(path: P) -> Result<Table> {
        let path = path.as_ref();
        match extension(path).as_deref() {
            Some("csv") | Some("txt") => CsvReader::read_file(path, &CsvReadOptions::default())
                .map_err(|e| Error::other(e.to_string())),
            Some("tsv") => CsvReader::read_file(path, &CsvReadOptions::tsv())
                .map_err(|e| Error::other(e.to_string())),
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match extension(path).as_deref() {
            Some("csv") | Some("txt") => {
                CsvWriter::write_file(self, path, &CsvWriteOptions::default())
                    .map_err(|e| Error::other(e.to_string()))
            }
            Some("tsv") => CsvWriter::write_file(self, path, &CsvWriteOptions::tsv())
                .map_err(|e| Error::other(e.to_string())),
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}

#[cfg(feature = "csv")]
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
