//! # colcalc-csv
//!
//! CSV reader and writer for colcalc tables.
//!
//! The header row supplies the column names; each following record is one
//! table row.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;
