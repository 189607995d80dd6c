//! Formula engine
//!
//! Owns a function registry and an ordered set of formulas, and applies them
//! to tables in a single left-to-right pass. Each formula sees the columns
//! written by the formulas before it; there is no dependency analysis, so a
//! formula that reads a column written later fails with
//! [`FormulaError::ColumnNotFound`].
//!
//! # Example
//!
//! ```rust
//! use colcalc_core::{Table, Value};
//! use colcalc_formula::FormulaEngine;
//!
//! let mut table = Table::from_columns([("price", vec![100.0, 250.0])]).unwrap();
//!
//! let mut engine = FormulaEngine::new();
//! engine
//!     .add_constant("vat", 0.2)
//!     .add_formula("tax", "@mul(price, @vat)")
//!     .add_formula("gross", "@add(price, tax)");
//!
//! let stats = engine.apply(&mut table).unwrap();
//! assert_eq!(stats.columns_created, 2);
//! assert_eq!(table.column("gross").unwrap()[1], Value::Number(300.0));
//! ```

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{evaluate_formula, FormulaValue, FunctionArgs};
use crate::functions::{FunctionDef, FunctionEntry, FunctionRegistry};
use crate::parser::parse_formula;
use crate::references::{self, ReferenceSet};
use crate::store::{Formula, FormulaStore};
use crate::validation::{self, ValidationIssue};
use colcalc_core::{Table, Value};
use std::collections::BTreeMap;

/// Statistics from an apply run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Number of formulas evaluated and written
    pub formulas_applied: usize,
    /// Number of target columns that did not exist before
    pub columns_created: usize,
    /// Number of target columns that replaced an existing column
    pub columns_overwritten: usize,
}

/// Exported state of an engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineSnapshot {
    /// Registered function names and their documentation
    pub functions: BTreeMap<String, Option<String>>,
    /// Stored formulas in application order
    pub formulas: FormulaStore,
    /// Named constants
    pub constants: BTreeMap<String, Value>,
}

/// Registry plus ordered formulas
#[derive(Debug, Clone, Default)]
pub struct FormulaEngine {
    registry: FunctionRegistry,
    formulas: FormulaStore,
    constants: BTreeMap<String, Value>,
}

impl FormulaEngine {
    /// Create an engine with the built-in functions and no formulas
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine around an existing registry
    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Self {
            registry,
            formulas: FormulaStore::new(),
            constants: BTreeMap::new(),
        }
    }

    /// Create an engine without any functions
    pub fn empty() -> Self {
        Self::with_registry(FunctionRegistry::empty())
    }

    /// The function registry
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Mutable access to the function registry
    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// The stored formulas
    pub fn formulas(&self) -> &FormulaStore {
        &self.formulas
    }

    /// Named constants registered with [`FormulaEngine::add_constant`]
    pub fn constants(&self) -> &BTreeMap<String, Value> {
        &self.constants
    }

    // === Functions ===

    /// Register a function
    pub fn register<F>(&mut self, name: impl Into<String>, implementation: F, doc: Option<&str>) -> &mut Self
    where
        F: Fn(&FunctionArgs) -> FormulaResult<FormulaValue> + Send + Sync + 'static,
    {
        self.registry.register(name, implementation, doc);
        self
    }

    /// Register a function with arity metadata
    pub fn register_def(&mut self, def: FunctionDef) -> &mut Self {
        self.registry.register_def(def);
        self
    }

    /// Register several functions
    pub fn register_batch<I, N>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, FunctionEntry)>,
        N: Into<String>,
    {
        self.registry.register_batch(entries);
        self
    }

    /// Register a named constant, usable as `@name` or `@name()`
    pub fn add_constant(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();

        let scalar = value.clone();
        let def = FunctionDef::with_params(name.clone(), &[], move |_| {
            Ok(FormulaValue::Scalar(scalar.clone()))
        })
        .doc(format!("Constant {}", value));

        self.registry.register_def(def);
        self.constants.insert(name, value);
        self
    }

    /// List registered function names, sorted
    pub fn list_functions(&self) -> Vec<&str> {
        self.registry.list_functions()
    }

    // === Formulas ===

    /// Add (or replace) the formula for `target`
    pub fn add_formula(&mut self, target: impl Into<String>, expression: impl Into<String>) -> &mut Self {
        let target = target.into();
        if let Some(previous) = self.formulas.insert(target.clone(), expression) {
            log::debug!("replacing formula for '{}' (was {:?})", target, previous);
        }
        self
    }

    /// Add several formulas, in order
    pub fn add_formulas<I, T, E>(&mut self, formulas: I) -> &mut Self
    where
        I: IntoIterator<Item = (T, E)>,
        T: Into<String>,
        E: Into<String>,
    {
        for (target, expression) in formulas {
            self.add_formula(target, expression);
        }
        self
    }

    // === Application ===

    /// Apply the stored formulas to `table`
    pub fn apply(&self, table: &mut Table) -> FormulaResult<ApplyStats> {
        self.apply_formulas(table, &self.formulas)
    }

    /// Apply `formulas` to `table`, in order
    ///
    /// Stops at the first failing formula and returns its error wrapped in
    /// [`FormulaError::InFormula`]. Columns written by the formulas before it
    /// stay in the table.
    pub fn apply_formulas(&self, table: &mut Table, formulas: &FormulaStore) -> FormulaResult<ApplyStats> {
        let mut stats = ApplyStats::default();

        for formula in formulas {
            let created = self
                .apply_one(table, formula)
                .map_err(|source| FormulaError::InFormula {
                    target: formula.target.clone(),
                    formula: formula.expression.clone(),
                    source: Box::new(source),
                })?;

            stats.formulas_applied += 1;
            if created {
                stats.columns_created += 1;
            } else {
                stats.columns_overwritten += 1;
            }
        }

        Ok(stats)
    }

    /// Apply the stored formulas to a copy of `table`
    pub fn applied(&self, table: &Table) -> FormulaResult<Table> {
        let mut out = table.clone();
        self.apply(&mut out)?;
        Ok(out)
    }

    fn apply_one(&self, table: &mut Table, formula: &Formula) -> FormulaResult<bool> {
        let expr = parse_formula(&formula.expression)?;
        let values = evaluate_formula(&expr, &self.registry, table)?;
        let created = table.set_column(formula.target.as_str(), values)?;
        log::debug!(
            "applied '{}' = {} ({})",
            formula.target,
            formula.expression,
            if created { "created" } else { "overwritten" }
        );
        Ok(created)
    }

    // === Static analysis ===

    /// Validate the stored formulas against `table`
    pub fn validate(&self, table: &Table) -> Vec<ValidationIssue> {
        self.validate_formulas(table, &self.formulas)
    }

    /// Validate `formulas` against `table` without evaluating them
    pub fn validate_formulas(&self, table: &Table, formulas: &FormulaStore) -> Vec<ValidationIssue> {
        validation::validate_formulas(table, formulas, &self.registry)
    }

    /// Columns a formula reads
    pub fn extract_references(&self, formula: &str) -> ReferenceSet {
        references::extract_references(formula)
    }

    /// Columns any of `formulas` reads
    pub fn extract_references_batch<I, S>(&self, formulas: I) -> ReferenceSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        references::extract_references_batch(formulas)
    }

    // === Export ===

    /// Export function docs, formulas and constants
    pub fn to_dict(&self) -> EngineSnapshot {
        EngineSnapshot {
            functions: self.registry.to_dict(),
            formulas: self.formulas.clone(),
            constants: self.constants.clone(),
        }
    }
}
