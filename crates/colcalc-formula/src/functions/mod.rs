//! Function registry and built-in functions

pub mod aggregation;
pub mod arithmetic;
pub mod comparison;
pub mod logical;
pub mod math;
pub mod null;
pub mod text;

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{FormulaValue, FunctionArgs};
use ahash::AHashMap;
use colcalc_core::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Function implementation signature
///
/// Implementations are vectorized: each argument is a whole column or a
/// scalar, and the result is a column of the table's length or a scalar
/// that gets broadcast.
pub type FunctionImpl = Arc<dyn Fn(&FunctionArgs) -> FormulaResult<FormulaValue> + Send + Sync>;

/// Function definition
#[derive(Clone)]
pub struct FunctionDef {
    /// Function name, as written after `@`
    pub name: String,
    /// Human-readable documentation
    pub doc: Option<String>,
    /// Declared parameter names, used to bind keyword arguments
    pub params: Option<Vec<String>>,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    /// Define a function with no arity metadata
    pub fn new<F>(name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&FunctionArgs) -> FormulaResult<FormulaValue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: None,
            params: None,
            min_args: 0,
            max_args: None,
            implementation: Arc::new(implementation),
        }
    }

    /// Define a function taking exactly `params`, all required
    pub fn with_params<F>(name: impl Into<String>, params: &[&str], implementation: F) -> Self
    where
        F: Fn(&FunctionArgs) -> FormulaResult<FormulaValue> + Send + Sync + 'static,
    {
        Self {
            params: Some(params.iter().map(|p| p.to_string()).collect()),
            min_args: params.len(),
            max_args: Some(params.len()),
            ..Self::new(name, implementation)
        }
    }

    /// Set the documentation
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set the minimum argument count; later parameters become optional
    pub fn with_min_args(mut self, min_args: usize) -> Self {
        self.min_args = min_args;
        self
    }

    /// Accept any number of extra positional arguments
    pub fn variadic(mut self) -> Self {
        self.max_args = None;
        self
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("params", &self.params)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish_non_exhaustive()
    }
}

/// A callable with optional documentation, for [`FunctionRegistry::register_batch`]
///
/// `FunctionEntry::new(f)` is a bare callable, `FunctionEntry::new(f).with_doc(..)`
/// a callable paired with its documentation.
#[derive(Clone)]
pub struct FunctionEntry {
    implementation: FunctionImpl,
    doc: Option<String>,
}

impl FunctionEntry {
    /// Wrap a callable
    pub fn new<F>(implementation: F) -> Self
    where
        F: Fn(&FunctionArgs) -> FormulaResult<FormulaValue> + Send + Sync + 'static,
    {
        Self {
            implementation: Arc::new(implementation),
            doc: None,
        }
    }

    /// Attach documentation
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// Function registry
///
/// Maps names to function definitions. Registering a name that already
/// exists replaces the previous definition.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        arithmetic::register(&mut registry);
        comparison::register(&mut registry);
        logical::register(&mut registry);
        text::register(&mut registry);
        null::register(&mut registry);
        math::register(&mut registry);
        aggregation::register(&mut registry);

        registry
    }

    /// Create a registry without any functions
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Look up a function by name, failing if it is not registered
    pub fn lookup(&self, name: &str) -> FormulaResult<&FunctionDef> {
        self.get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))
    }

    /// Check if a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Register a function definition
    pub fn register_def(&mut self, def: FunctionDef) -> &mut Self {
        if self.functions.contains_key(&def.name) {
            log::debug!("replacing function '{}'", def.name);
        }
        self.functions.insert(def.name.clone(), def);
        self
    }

    /// Register a callable under `name`
    ///
    /// # Example
    /// ```rust
    /// use colcalc_formula::functions::FunctionRegistry;
    /// use colcalc_formula::FormulaValue;
    /// use colcalc_core::Value;
    ///
    /// let mut registry = FunctionRegistry::new();
    /// registry.register("answer", |_args| Ok(FormulaValue::Scalar(Value::from(42))), Some("The answer"));
    /// assert_eq!(registry.to_dict()["answer"].as_deref(), Some("The answer"));
    /// ```
    pub fn register<F>(&mut self, name: impl Into<String>, implementation: F, doc: Option<&str>) -> &mut Self
    where
        F: Fn(&FunctionArgs) -> FormulaResult<FormulaValue> + Send + Sync + 'static,
    {
        let mut def = FunctionDef::new(name, implementation);
        def.doc = doc.map(str::to_string);
        self.register_def(def)
    }

    /// Register several callables at once
    pub fn register_batch<I, N>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, FunctionEntry)>,
        N: Into<String>,
    {
        for (name, entry) in entries {
            let def = FunctionDef {
                name: name.into(),
                doc: entry.doc,
                params: None,
                min_args: 0,
                max_args: None,
                implementation: entry.implementation,
            };
            self.register_def(def);
        }
        self
    }

    /// Remove a function, returning its definition
    pub fn unregister(&mut self, name: &str) -> Option<FunctionDef> {
        self.functions.remove(name)
    }

    /// All registered function names, sorted
    pub fn list_functions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Function names mapped to their documentation
    pub fn to_dict(&self) -> BTreeMap<String, Option<String>> {
        self.functions
            .iter()
            .map(|(name, def)| (name.clone(), def.doc.clone()))
            .collect()
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if no function is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.list_functions())
            .finish()
    }
}

// === Helpers shared by the built-in functions ===

/// Read a value as a number; null (or NaN) reads as `None`
pub(crate) fn number(value: &Value, function: &str) -> FormulaResult<Option<f64>> {
    if value.is_null() {
        return Ok(None);
    }
    value.as_number().map(Some).ok_or_else(|| {
        FormulaError::Argument(format!(
            "@{} expects numbers, got {} {:?}",
            function,
            value.type_name(),
            value.to_string()
        ))
    })
}

/// Read a scalar argument as a number
pub(crate) fn scalar_number(arg: &FormulaValue, param: &str, function: &str) -> FormulaResult<f64> {
    arg.as_scalar()
        .and_then(|value| value.as_number())
        .ok_or_else(|| {
            FormulaError::Argument(format!("@{}: '{}' must be a single number", function, param))
        })
}

/// Wrap a numeric result; NaN becomes null
pub(crate) fn number_value(n: Option<f64>) -> Value {
    n.filter(|n| !n.is_nan()).map_or(Value::Null, Value::Number)
}

/// Elementwise numeric transform of the first argument
pub(crate) fn unary_numeric(args: &FunctionArgs, f: fn(f64) -> f64) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    a.map(|value| Ok(number_value(number(value, args.function())?.map(f))))
}

/// Elementwise numeric combination of the first two arguments
pub(crate) fn binary_numeric(
    args: &FunctionArgs,
    f: fn(f64, f64) -> f64,
) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let b = args.required(1, "b")?;
    crate::evaluator::elementwise(&[a, b], |row| {
        let x = number(row[0], args.function())?;
        let y = number(row[1], args.function())?;
        Ok(number_value(x.zip(y).map(|(x, y)| f(x, y))))
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtins_registered() {
        let registry = FunctionRegistry::new();
        for name in [
            "add", "sub", "mul", "div", "mod", "pow", "abs", "eq", "ne", "gt", "gte", "lt",
            "lte", "and", "or", "not", "if_else", "upper", "lower", "strip", "concat",
            "contains", "isnull", "notnull", "coalesce", "fillna", "round", "ceil", "floor",
            "sqrt", "log", "clip", "sum", "mean", "min", "max", "std", "pct_of_total",
        ] {
            assert!(registry.contains(name), "missing builtin {}", name);
            assert!(registry.get(name).unwrap().doc.is_some());
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = FunctionRegistry::new();
        let err = registry.lookup("nope").unwrap_err();
        assert!(matches!(err, FormulaError::UnknownFunction(name) if name == "nope"));
    }

    #[test]
    fn test_register_batch_with_and_without_docs() {
        let mut registry = FunctionRegistry::empty();
        registry.register_batch([
            (
                "triple",
                FunctionEntry::new(|args| unary_numeric(args, |x| x * 3.0)),
            ),
            (
                "double",
                FunctionEntry::new(|args| unary_numeric(args, |x| x * 2.0))
                    .with_doc("Multiply by 2"),
            ),
        ]);

        let docs = registry.to_dict();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs["triple"], None);
        assert_eq!(docs["double"].as_deref(), Some("Multiply by 2"));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = FunctionRegistry::empty();
        registry
            .register("f", |_| Ok(FormulaValue::Scalar(Value::from(1))), Some("one"))
            .register("f", |_| Ok(FormulaValue::Scalar(Value::from(2))), None);

        assert_eq!(registry.len(), 1);
        let def = registry.lookup("f").unwrap();
        let result = (def.implementation)(&FunctionArgs::new("f", vec![], 1)).unwrap();
        assert_eq!(result, FormulaValue::Scalar(Value::Number(2.0)));
        assert_eq!(registry.to_dict()["f"], None);
    }

    #[test]
    fn test_unregister() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.unregister("add").is_some());
        assert!(!registry.contains("add"));
        assert!(registry.unregister("add").is_none());
    }

    #[test]
    fn test_list_functions_sorted() {
        let registry = FunctionRegistry::new();
        let names = registry.list_functions();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
