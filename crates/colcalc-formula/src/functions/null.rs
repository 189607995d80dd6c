//! Null-handling functions
//!
//! NaN numbers count as null.

use super::{FunctionDef, FunctionRegistry};
use crate::error::FormulaResult;
use crate::evaluator::{elementwise, FormulaValue, FunctionArgs};
use colcalc_core::Value;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry
        .register_def(
            FunctionDef::with_params("isnull", &["a"], |args| {
                let a = args.required(0, "a")?;
                a.map(|value| Ok(Value::Boolean(value.is_null())))
            })
            .doc("True where the value is missing"),
        )
        .register_def(
            FunctionDef::with_params("notnull", &["a"], |args| {
                let a = args.required(0, "a")?;
                a.map(|value| Ok(Value::Boolean(!value.is_null())))
            })
            .doc("True where the value is present"),
        )
        .register_def(
            FunctionDef::new("coalesce", fn_coalesce)
                .with_min_args(1)
                .doc("First non-null value among the arguments"),
        )
        .register_def(
            FunctionDef::with_params("fillna", &["a", "value"], fn_fillna)
                .doc("Replace missing values with value"),
        );
}

/// COALESCE function
fn fn_coalesce(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let inputs: Vec<&FormulaValue> = args.rest(0).collect();
    elementwise(&inputs, |row| {
        Ok(row
            .iter()
            .find(|value| !value.is_null())
            .map_or(Value::Null, |value| (*value).clone()))
    })
}

/// FILLNA function
fn fn_fillna(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let value = args.required(1, "value")?;
    elementwise(&[a, value], |row| {
        let picked = if row[0].is_null() { row[1] } else { row[0] };
        Ok(picked.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{call, col, scalar};
    use super::*;
    use pretty_assertions::assert_eq;

    fn sparse() -> FormulaValue {
        col(vec![Value::Number(1.0), Value::Null, Value::Number(f64::NAN)])
    }

    #[test]
    fn test_isnull_notnull() {
        assert_eq!(call("isnull", vec![sparse()]).unwrap(), col(vec![false, true, true]));
        assert_eq!(call("notnull", vec![sparse()]).unwrap(), col(vec![true, false, false]));
    }

    #[test]
    fn test_fillna() {
        assert_eq!(call("fillna", vec![sparse(), scalar(0)]).unwrap(), col(vec![1, 0, 0]));
    }

    #[test]
    fn test_coalesce() {
        let b = col(vec![Value::Null, Value::Null, Value::text("b")]);
        assert_eq!(
            call("coalesce", vec![sparse(), b, scalar("z")]).unwrap(),
            col(vec![Value::Number(1.0), Value::text("z"), Value::text("b")])
        );
    }
}
