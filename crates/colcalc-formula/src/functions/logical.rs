//! Logical functions

use super::{FunctionDef, FunctionRegistry};
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{elementwise, FormulaValue, FunctionArgs};
use colcalc_core::Value;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry
        .register_def(
            FunctionDef::with_params("and", &["a", "b"], |args| {
                binary_logic(args, |x, y| x && y)
            })
            .doc("Logical AND of two conditions"),
        )
        .register_def(
            FunctionDef::with_params("or", &["a", "b"], |args| binary_logic(args, |x, y| x || y))
                .doc("Logical OR of two conditions"),
        )
        .register_def(FunctionDef::with_params("not", &["a"], fn_not).doc("Logical negation"))
        .register_def(
            FunctionDef::with_params("if_else", &["cond", "then", "else"], fn_if_else)
                .doc("Pick `then` where cond holds, otherwise `else`"),
        );
}

/// Read a value as a condition; null reads as false
fn truthy(value: &Value, function: &str) -> FormulaResult<bool> {
    if value.is_null() {
        return Ok(false);
    }
    value.as_bool().ok_or_else(|| {
        FormulaError::Argument(format!(
            "@{} expects a condition, got {} {:?}",
            function,
            value.type_name(),
            value.to_string()
        ))
    })
}

fn binary_logic(args: &FunctionArgs, f: fn(bool, bool) -> bool) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let b = args.required(1, "b")?;
    elementwise(&[a, b], |row| {
        let x = truthy(row[0], args.function())?;
        let y = truthy(row[1], args.function())?;
        Ok(Value::Boolean(f(x, y)))
    })
}

/// NOT function
fn fn_not(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    a.map(|value| Ok(Value::Boolean(!truthy(value, args.function())?)))
}

/// IF_ELSE function
fn fn_if_else(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let cond = args.required(0, "cond")?;
    let then = args.required(1, "then")?;
    let otherwise = args.required(2, "else")?;
    elementwise(&[cond, then, otherwise], |row| {
        let picked = if truthy(row[0], args.function())? {
            row[1]
        } else {
            row[2]
        };
        Ok(picked.clone())
    })
}
