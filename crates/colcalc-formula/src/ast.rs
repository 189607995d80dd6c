//! Formula Abstract Syntax Tree types

use std::collections::BTreeSet;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal (integer, decimal or scientific notation)
    Number(f64),
    /// Quoted string literal
    String(String),

    // === References ===
    /// Column reference, possibly dotted (`a.b`) or indexed (`a[0]`)
    ColumnRef(String),

    // === Function call ===
    /// `@name(args)`
    Function { name: String, args: Vec<FormulaExpr> },

    /// `name=value` inside a function call's argument list
    KeywordArg { name: String, value: Box<FormulaExpr> },
}

impl FormulaExpr {
    /// Names of every function called anywhere in the expression
    pub fn function_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.walk(&mut |expr| {
            if let FormulaExpr::Function { name, .. } = expr {
                names.insert(name.as_str());
            }
        });
        names
    }

    /// Every column referenced anywhere in the expression
    pub fn column_refs(&self) -> BTreeSet<&str> {
        let mut refs = BTreeSet::new();
        self.walk(&mut |expr| {
            if let FormulaExpr::ColumnRef(name) = expr {
                refs.insert(name.as_str());
            }
        });
        refs
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a FormulaExpr)) {
        visit(self);
        match self {
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            FormulaExpr::KeywordArg { value, .. } => value.walk(visit),
            FormulaExpr::Number(_) | FormulaExpr::String(_) | FormulaExpr::ColumnRef(_) => {}
        }
    }
}
