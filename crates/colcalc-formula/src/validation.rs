//! Static formula validation
//!
//! Checks a set of formulas against a table without evaluating anything:
//! every referenced column must exist (or be written by an earlier formula),
//! every function marker must be registered, and the text must parse.

use crate::functions::FunctionRegistry;
use crate::parser::parse_formula;
use crate::references::{extract_references, function_markers};
use crate::store::FormulaStore;
use ahash::AHashSet;
use colcalc_core::Table;
use std::fmt;

/// Kind of problem found by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// A referenced column is neither in the table nor an earlier target
    MissingColumn,
    /// A function marker names an unregistered function
    UnknownFunction,
    /// The formula text does not parse
    MalformedFormula,
}

impl IssueKind {
    /// Short label used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingColumn => "missing column",
            IssueKind::UnknownFunction => "unknown function",
            IssueKind::MalformedFormula => "malformed formula",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Target column of the offending formula
    pub target: String,
    /// What is wrong
    pub kind: IssueKind,
    /// The missing column, the unknown function, or the parse error
    pub detail: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} '{}'", self.target, self.kind, self.detail)
    }
}

/// Validate `formulas`, in order, against `table` and `registry`
///
/// Targets of earlier formulas count as available columns for later ones,
/// mirroring what an apply would see. Returns every issue found.
pub fn validate_formulas(
    table: &Table,
    formulas: &FormulaStore,
    registry: &FunctionRegistry,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut written: AHashSet<&str> = AHashSet::new();

    for formula in formulas {
        let mut report = |kind, detail: String| {
            log::warn!("formula for '{}': {} '{}'", formula.target, kind, detail);
            issues.push(ValidationIssue {
                target: formula.target.clone(),
                kind,
                detail,
            });
        };

        for column in extract_references(&formula.expression) {
            if !table.contains_column(&column) && !written.contains(column.as_str()) {
                report(IssueKind::MissingColumn, column);
            }
        }

        for name in function_markers(&formula.expression) {
            if !registry.contains(&name) {
                report(IssueKind::UnknownFunction, name);
            }
        }

        if let Err(err) = parse_formula(&formula.expression) {
            report(IssueKind::MalformedFormula, err.to_string());
        }

        written.insert(formula.target.as_str());
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        Table::from_columns([("price", vec![1.0, 2.0]), ("qty", vec![3.0, 4.0])]).unwrap()
    }

    fn issue(target: &str, kind: IssueKind, detail: &str) -> ValidationIssue {
        ValidationIssue {
            target: target.into(),
            kind,
            detail: detail.into(),
        }
    }

    #[test]
    fn test_valid_chain() {
        let formulas: FormulaStore = [
            ("total", "@mul(price, qty)"),
            ("share", "@pct_of_total(total)"),
        ]
        .into_iter()
        .collect();
        assert!(validate_formulas(&table(), &formulas, &FunctionRegistry::new()).is_empty());
    }

    #[test]
    fn test_reports_every_issue() {
        let formulas: FormulaStore = [
            ("a", "@mul(price, discount)"),
            ("b", "@frobnicate(qty)"),
            ("c", "@add(later, 1)"),
            ("later", "1"),
        ]
        .into_iter()
        .collect();

        let issues = validate_formulas(&table(), &formulas, &FunctionRegistry::new());
        assert_eq!(
            issues,
            vec![
                issue("a", IssueKind::MissingColumn, "discount"),
                issue("b", IssueKind::UnknownFunction, "frobnicate"),
                issue("c", IssueKind::MissingColumn, "later"),
            ]
        );
    }

    #[test]
    fn test_malformed_formula() {
        let formulas: FormulaStore = [("x", "@add(price, qty")].into_iter().collect();
        let issues = validate_formulas(&table(), &formulas, &FunctionRegistry::new());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MalformedFormula);
        assert!(issues[0].detail.contains("position"));
    }

    #[test]
    fn test_detached_marker_is_malformed() {
        let formulas: FormulaStore = [("t", "@ add(price, 1)")].into_iter().collect();
        let registry = FunctionRegistry::new();
        let issues = validate_formulas(&table(), &formulas, &registry);

        assert!(issues
            .iter()
            .any(|issue| issue.kind == IssueKind::MalformedFormula));

        let mut applied = table();
        let engine = crate::FormulaEngine::new();
        assert!(engine.apply_formulas(&mut applied, &formulas).is_err());
        assert!(!applied.contains_column("t"));
    }

    #[test]
    fn test_display() {
        let issue = issue("a", IssueKind::MissingColumn, "discount");
        assert_eq!(issue.to_string(), "a: missing column 'discount'");
    }
}
