//! Formula evaluator
//!
//! Evaluates formula ASTs against a table. Every value is either a scalar or
//! a whole column, so one evaluation computes a formula for all rows at once.

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{FunctionDef, FunctionRegistry};
use ahash::AHashMap;
use colcalc_core::{Table, Value};

static NULL: Value = Value::Null;

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    /// A single value, broadcast to every row
    Scalar(Value),
    /// One value per row
    Column(Vec<Value>),
}

impl FormulaValue {
    /// Column length, or `None` for a scalar
    pub fn len(&self) -> Option<usize> {
        match self {
            FormulaValue::Scalar(_) => None,
            FormulaValue::Column(values) => Some(values.len()),
        }
    }

    /// Value at `row`, broadcasting scalars
    ///
    /// Rows past the end of a column read as null.
    pub fn get(&self, row: usize) -> &Value {
        match self {
            FormulaValue::Scalar(value) => value,
            FormulaValue::Column(values) => values.get(row).unwrap_or(&NULL),
        }
    }

    /// All values (one for a scalar)
    pub fn values(&self) -> &[Value] {
        match self {
            FormulaValue::Scalar(value) => std::slice::from_ref(value),
            FormulaValue::Column(values) => values,
        }
    }

    /// The scalar, if this is one
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FormulaValue::Scalar(value) => Some(value),
            FormulaValue::Column(_) => None,
        }
    }

    /// Apply `f` to every value, keeping the shape
    pub fn map<F>(&self, f: F) -> FormulaResult<FormulaValue>
    where
        F: Fn(&Value) -> FormulaResult<Value>,
    {
        match self {
            FormulaValue::Scalar(value) => f(value).map(FormulaValue::Scalar),
            FormulaValue::Column(values) => values
                .iter()
                .map(f)
                .collect::<FormulaResult<Vec<_>>>()
                .map(FormulaValue::Column),
        }
    }

    /// Expand to a column of exactly `rows` values
    pub fn into_column(self, rows: usize) -> FormulaResult<Vec<Value>> {
        match self {
            FormulaValue::Scalar(value) => Ok(vec![value; rows]),
            FormulaValue::Column(values) if values.len() == rows => Ok(values),
            FormulaValue::Column(values) => Err(FormulaError::LengthMismatch {
                expected: rows,
                actual: values.len(),
            }),
        }
    }
}

impl From<Value> for FormulaValue {
    fn from(value: Value) -> Self {
        FormulaValue::Scalar(value)
    }
}

impl From<Vec<Value>> for FormulaValue {
    fn from(values: Vec<Value>) -> Self {
        FormulaValue::Column(values)
    }
}

/// Combine several inputs row by row, broadcasting scalars
///
/// The result is a scalar when every input is a scalar, otherwise a column.
/// Columns of different lengths are an error.
pub fn elementwise<F>(inputs: &[&FormulaValue], f: F) -> FormulaResult<FormulaValue>
where
    F: Fn(&[&Value]) -> FormulaResult<Value>,
{
    let mut rows: Option<usize> = None;
    for len in inputs.iter().filter_map(|input| input.len()) {
        match rows {
            Some(expected) if expected != len => {
                return Err(FormulaError::LengthMismatch {
                    expected,
                    actual: len,
                })
            }
            _ => rows = Some(len),
        }
    }

    let mut row_values = Vec::with_capacity(inputs.len());
    let Some(rows) = rows else {
        row_values.extend(inputs.iter().map(|input| input.get(0)));
        return f(&row_values).map(FormulaValue::Scalar);
    };

    let mut out = Vec::with_capacity(rows);
    for row in 0..rows {
        row_values.clear();
        row_values.extend(inputs.iter().map(|input| input.get(row)));
        out.push(f(&row_values)?);
    }
    Ok(FormulaValue::Column(out))
}

/// Arguments passed to a function implementation
///
/// Positional arguments and keyword arguments naming a declared parameter
/// are bound into slots (`@clip(a, upper=5)` fills slots 0 and 2). Keywords
/// given to a function without declared parameters stay available through
/// [`FunctionArgs::keyword`].
#[derive(Debug, Clone)]
pub struct FunctionArgs {
    function: String,
    slots: Vec<Option<FormulaValue>>,
    keywords: Vec<(String, FormulaValue)>,
    rows: usize,
}

impl FunctionArgs {
    /// Create arguments from positional values
    pub fn new(function: impl Into<String>, positional: Vec<FormulaValue>, rows: usize) -> Self {
        Self {
            function: function.into(),
            slots: positional.into_iter().map(Some).collect(),
            keywords: Vec::new(),
            rows,
        }
    }

    /// Name of the function being called
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Row count of the table being evaluated
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of slots (the highest bound position + 1)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no argument was passed
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.keywords.is_empty()
    }

    /// Number of arguments actually supplied
    pub fn supplied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count() + self.keywords.len()
    }

    /// Argument bound to slot `index`
    pub fn get(&self, index: usize) -> Option<&FormulaValue> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Argument bound to slot `index`, failing with a message naming `param`
    pub fn required(&self, index: usize, param: &str) -> FormulaResult<&FormulaValue> {
        self.get(index).ok_or_else(|| {
            FormulaError::Argument(format!(
                "@{} is missing argument '{}'",
                self.function, param
            ))
        })
    }

    /// Every bound argument from slot `start` on, in order
    pub fn rest(&self, start: usize) -> impl Iterator<Item = &FormulaValue> + '_ {
        self.slots.iter().skip(start).flatten()
    }

    /// Keyword argument not bound to a declared parameter
    pub fn keyword(&self, name: &str) -> Option<&FormulaValue> {
        self.keywords
            .iter()
            .find(|(keyword, _)| keyword == name)
            .map(|(_, value)| value)
    }

    fn bind(
        def: &FunctionDef,
        positional: Vec<FormulaValue>,
        keywords: Vec<(String, FormulaValue)>,
        rows: usize,
    ) -> FormulaResult<Self> {
        let mut args = Self::new(def.name.clone(), positional, rows);

        let Some(params) = &def.params else {
            args.keywords = keywords;
            return Ok(args);
        };

        for (keyword, value) in keywords {
            let index = params.iter().position(|p| *p == keyword).ok_or_else(|| {
                FormulaError::Argument(format!(
                    "@{} got an unexpected keyword argument '{}'",
                    def.name, keyword
                ))
            })?;
            if args.slots.len() <= index {
                args.slots.resize(index + 1, None);
            }
            if args.slots[index].is_some() {
                return Err(FormulaError::Argument(format!(
                    "@{} got multiple values for argument '{}'",
                    def.name, keyword
                )));
            }
            args.slots[index] = Some(value);
        }
        Ok(args)
    }
}

/// Context for formula evaluation
///
/// Holds the functions the expression calls, already resolved against the
/// registry, and the table whose columns the expression may reference.
pub struct EvaluationContext<'a> {
    /// Table for column lookups
    pub table: &'a Table,
    functions: AHashMap<&'a str, &'a FunctionDef>,
}

impl<'a> EvaluationContext<'a> {
    /// Resolve every function called in `expr` before anything is evaluated
    pub fn resolve(
        expr: &'a FormulaExpr,
        registry: &'a FunctionRegistry,
        table: &'a Table,
    ) -> FormulaResult<Self> {
        let mut functions = AHashMap::new();
        for name in expr.function_names() {
            functions.insert(name, registry.lookup(name)?);
        }
        Ok(Self { table, functions })
    }

    /// Row count of the table
    pub fn rows(&self) -> usize {
        self.table.row_count()
    }

    /// Get a column from the table
    pub fn column(&self, name: &str) -> FormulaResult<&'a [Value]> {
        self.table
            .column(name)
            .ok_or_else(|| FormulaError::ColumnNotFound(name.to_string()))
    }

    fn function(&self, name: &str) -> FormulaResult<&'a FunctionDef> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext<'_>) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => Ok(FormulaValue::Scalar(Value::Number(*n))),
        FormulaExpr::String(s) => Ok(FormulaValue::Scalar(Value::text(s.as_str()))),

        // === References ===
        FormulaExpr::ColumnRef(name) => Ok(FormulaValue::Column(ctx.column(name)?.to_vec())),

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),

        FormulaExpr::KeywordArg { name, .. } => Err(FormulaError::Evaluation(format!(
            "Keyword argument '{}' outside a function call",
            name
        ))),
    }
}

/// Evaluate an expression to a column of the table's row count
pub fn evaluate_formula(
    expr: &FormulaExpr,
    registry: &FunctionRegistry,
    table: &Table,
) -> FormulaResult<Vec<Value>> {
    let ctx = EvaluationContext::resolve(expr, registry, table)?;
    evaluate(expr, &ctx)?.into_column(ctx.rows())
}

fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext<'_>,
) -> FormulaResult<FormulaValue> {
    let func = ctx.function(name)?;

    // Evaluate arguments
    let mut positional = Vec::with_capacity(args.len());
    let mut keywords = Vec::new();
    for arg in args {
        match arg {
            FormulaExpr::KeywordArg { name, value } => {
                keywords.push((name.clone(), evaluate(value, ctx)?));
            }
            other => positional.push(evaluate(other, ctx)?),
        }
    }

    let call_args = FunctionArgs::bind(func, positional, keywords, ctx.rows())?;

    // Check argument count
    if call_args.supplied() < func.min_args {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: call_args.supplied(),
        });
    }

    if let Some(max) = func.max_args {
        if call_args.len() > max {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {}", max),
                actual: call_args.len(),
            });
        }
    }

    // Call the function
    (func.implementation)(&call_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        Table::from_columns([("a", vec![1, 2, 3]), ("b", vec![4, 5, 6])]).unwrap()
    }

    fn eval(formula: &str) -> FormulaResult<Vec<Value>> {
        let ast = parse_formula(formula)?;
        evaluate_formula(&ast, &FunctionRegistry::new(), &table())
    }

    fn numbers(values: &[f64]) -> Vec<Value> {
        values.iter().map(|&n| Value::Number(n)).collect()
    }

    #[test]
    fn test_column_reference() {
        assert_eq!(eval("a").unwrap(), numbers(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_scalar_broadcast() {
        assert_eq!(eval("7").unwrap(), numbers(&[7.0, 7.0, 7.0]));
        assert_eq!(eval("@sum(a)").unwrap(), numbers(&[6.0, 6.0, 6.0]));
    }

    #[test]
    fn test_nested_calls() {
        assert_eq!(
            eval("@add(@mul(a, 2), b)").unwrap(),
            numbers(&[6.0, 9.0, 12.0])
        );
    }

    #[test]
    fn test_unknown_function_before_evaluation() {
        // `missing` would fail too, but function resolution comes first
        let err = eval("@add(@nope(a), missing)").unwrap_err();
        assert!(matches!(err, FormulaError::UnknownFunction(name) if name == "nope"));
    }

    #[test]
    fn test_missing_column() {
        let err = eval("@add(a, nonexistent)").unwrap_err();
        assert!(matches!(err, FormulaError::ColumnNotFound(name) if name == "nonexistent"));
    }

    #[test]
    fn test_argument_count() {
        let err = eval("@add(a)").unwrap_err();
        assert!(matches!(err, FormulaError::ArgumentCount { actual: 1, .. }));

        let err = eval("@abs(a, b)").unwrap_err();
        assert!(matches!(err, FormulaError::ArgumentCount { actual: 2, .. }));
    }

    #[test]
    fn test_keyword_binding() {
        assert_eq!(
            eval("@clip(a, upper=2)").unwrap(),
            numbers(&[1.0, 2.0, 2.0])
        );
        assert_eq!(
            eval("@clip(a, lower=2, upper=2)").unwrap(),
            numbers(&[2.0, 2.0, 2.0])
        );

        let err = eval("@clip(a, bogus=2)").unwrap_err();
        assert!(matches!(err, FormulaError::Argument(_)));

        let err = eval("@clip(a, 1, lower=2)").unwrap_err();
        assert!(matches!(err, FormulaError::Argument(_)));
    }

    #[test]
    fn test_elementwise_length_mismatch() {
        let a = FormulaValue::Column(numbers(&[1.0, 2.0]));
        let b = FormulaValue::Column(numbers(&[1.0]));
        let err = elementwise(&[&a, &b], |_| Ok(Value::Null)).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_into_column() {
        let scalar = FormulaValue::Scalar(Value::from(1));
        assert_eq!(scalar.into_column(2).unwrap(), numbers(&[1.0, 1.0]));

        let column = FormulaValue::Column(numbers(&[1.0]));
        assert!(column.into_column(3).is_err());
    }
}
