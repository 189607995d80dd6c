//! Comparison functions
//!
//! Null operands compare false, except for `ne` which reports them as
//! different. Ordering text against a number is an error.

use super::{FunctionDef, FunctionRegistry};
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{elementwise, FormulaValue, FunctionArgs};
use colcalc_core::Value;
use std::cmp::Ordering;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    let comparisons: [(&str, &str, fn(Ordering) -> bool); 4] = [
        ("gt", "True where a > b", Ordering::is_gt),
        ("gte", "True where a >= b", Ordering::is_ge),
        ("lt", "True where a < b", Ordering::is_lt),
        ("lte", "True where a <= b", Ordering::is_le),
    ];

    registry
        .register_def(
            FunctionDef::with_params("eq", &["a", "b"], |args| {
                compare(args, |a, b| Ok(Some(equals(a, b))))
            })
            .doc("True where a equals b"),
        )
        .register_def(
            FunctionDef::with_params("ne", &["a", "b"], fn_ne).doc("True where a differs from b"),
        );

    for (name, doc, accept) in comparisons {
        registry.register_def(
            FunctionDef::with_params(name, &["a", "b"], move |args| {
                compare(args, |a, b| Ok(order(a, b, args.function())?.map(accept)))
            })
            .doc(doc),
        );
    }
}

/// NE function
fn fn_ne(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let b = args.required(1, "b")?;
    elementwise(&[a, b], |row| {
        Ok(Value::Boolean(
            row[0].is_null() || row[1].is_null() || !equals(row[0], row[1]),
        ))
    })
}

/// Compare two arguments row by row; `None` from `f` or a null operand reads as false
fn compare<F>(args: &FunctionArgs, f: F) -> FormulaResult<FormulaValue>
where
    F: Fn(&Value, &Value) -> FormulaResult<Option<bool>>,
{
    let a = args.required(0, "a")?;
    let b = args.required(1, "b")?;
    elementwise(&[a, b], |row| {
        if row[0].is_null() || row[1].is_null() {
            return Ok(Value::Boolean(false));
        }
        Ok(Value::Boolean(f(row[0], row[1])?.unwrap_or(false)))
    })
}

fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => x == y,
        (Value::Text(_), _) | (_, Value::Text(_)) => false,
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn order(a: &Value, b: &Value, function: &str) -> FormulaResult<Option<Ordering>> {
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => Ok(Some(x.cmp(y))),
        (Value::Text(_), _) | (_, Value::Text(_)) => Err(FormulaError::Evaluation(format!(
            "@{} cannot order {} against {}",
            function,
            a.type_name(),
            b.type_name()
        ))),
        _ => Ok(a
            .as_number()
            .zip(b.as_number())
            .and_then(|(x, y)| x.partial_cmp(&y))),
    }
}
