//! # colcalc-formula
//!
//! Formula language and evaluator for colcalc tables.
//!
//! This crate provides:
//! - Formula parsing (`@function(args)` text → AST)
//! - Static column-reference extraction
//! - A registry of vectorized functions, with the built-ins pre-loaded
//! - Ordered, single-pass evaluation of named formulas into table columns
//! - Validation of formulas against a table without evaluating them
//!
//! ## Example
//!
//! ```rust
//! use colcalc_core::Table;
//! use colcalc_formula::{extract_references, FormulaEngine};
//!
//! let mut table = Table::from_columns([("price", vec![10.0, 20.0]), ("qty", vec![3.0, 1.0])]).unwrap();
//!
//! let mut engine = FormulaEngine::new();
//! engine
//!     .add_formula("total", "@mul(price, qty)")
//!     .add_formula("share", "@round(@pct_of_total(total), 1)");
//!
//! assert!(engine.validate(&table).is_empty());
//! engine.apply(&mut table).unwrap();
//!
//! assert_eq!(extract_references("@mul(price, qty)").len(), 2);
//! assert_eq!(table.column_count(), 4);
//! ```

pub mod ast;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod references;
pub mod store;
pub mod validation;

pub use ast::FormulaExpr;
pub use engine::{ApplyStats, EngineSnapshot, FormulaEngine};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_formula, EvaluationContext, FormulaValue, FunctionArgs};
pub use functions::{FunctionDef, FunctionEntry, FunctionRegistry};
pub use parser::parse_formula;
pub use references::{extract_references, extract_references_batch, ReferenceSet};
pub use store::{Formula, FormulaStore};
pub use validation::{validate_formulas, IssueKind, ValidationIssue};
