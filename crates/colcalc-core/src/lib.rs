//! # colcalc-core
//!
//! Core data structures for the colcalc formula engine.
//!
//! This crate provides the fundamental types used throughout colcalc:
//! - [`Value`] - A single column value (null, boolean, number, text)
//! - [`Table`] - Ordered, named, equal-length columns
//! - [`OrderedMap`] - Insertion-ordered name map
//!
//! ## Example
//!
//! ```rust
//! use colcalc_core::{Table, Value};
//!
//! let mut table = Table::from_columns([("price", vec![100, 200])]).unwrap();
//! table
//!     .set_column("label", vec![Value::text("a"), Value::text("b")])
//!     .unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.column_count(), 2);
//! ```

pub mod error;
pub mod ordered;
pub mod table;
pub mod value;

pub use error::{Error, Result};
pub use ordered::OrderedMap;
pub use table::Table;
pub use value::Value;
