//! Arithmetic functions

use super::{binary_numeric, number, number_value, unary_numeric, FunctionDef, FunctionRegistry};
use crate::error::FormulaResult;
use crate::evaluator::{elementwise, FormulaValue, FunctionArgs};
use colcalc_core::Value;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry
        .register_def(
            FunctionDef::with_params("add", &["a", "b"], fn_add)
                .doc("Add two values elementwise; text operands are concatenated"),
        )
        .register_def(
            FunctionDef::with_params("sub", &["a", "b"], |args| binary_numeric(args, |x, y| x - y))
                .doc("Subtract b from a elementwise"),
        )
        .register_def(
            FunctionDef::with_params("mul", &["a", "b"], |args| binary_numeric(args, |x, y| x * y))
                .doc("Multiply two values elementwise"),
        )
        .register_def(
            FunctionDef::with_params("div", &["a", "b"], |args| binary_numeric(args, |x, y| x / y))
                .doc("Divide a by b elementwise"),
        )
        .register_def(
            FunctionDef::with_params("mod", &["a", "b"], |args| binary_numeric(args, floored_mod))
                .doc("Remainder of a / b, with the sign of b"),
        )
        .register_def(
            FunctionDef::with_params("floordiv", &["a", "b"], |args| {
                binary_numeric(args, |x, y| (x / y).floor())
            })
            .doc("Divide a by b and round down"),
        )
        .register_def(
            FunctionDef::with_params("pow", &["a", "b"], |args| binary_numeric(args, f64::powf))
                .doc("Raise a to the power b"),
        )
        .register_def(
            FunctionDef::with_params("abs", &["a"], |args| unary_numeric(args, f64::abs))
                .doc("Absolute value"),
        )
        .register_def(
            FunctionDef::with_params("neg", &["a"], |args| unary_numeric(args, |x| -x))
                .doc("Negate a value"),
        );
}

/// ADD function
fn fn_add(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let b = args.required(1, "b")?;
    elementwise(&[a, b], |row| match (row[0], row[1]) {
        (x, y) if x.is_null() || y.is_null() => Ok(Value::Null),
        (Value::Text(x), y) => Ok(Value::Text(format!("{}{}", x, y))),
        (x, Value::Text(y)) => Ok(Value::Text(format!("{}{}", x, y))),
        (x, y) => {
            let x = number(x, args.function())?;
            let y = number(y, args.function())?;
            Ok(number_value(x.zip(y).map(|(x, y)| x + y)))
        }
    })
}

fn floored_mod(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && (r < 0.0) != (y < 0.0) {
        r + y
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{call, col, scalar};
    use super::*;
    use crate::error::FormulaError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_columns_and_scalars() {
        assert_eq!(
            call("add", vec![col(vec![1, 2]), scalar(10)]).unwrap(),
            col(vec![11, 12])
        );
        assert_eq!(call("add", vec![scalar(1), scalar(2)]).unwrap(), scalar(3));
    }

    #[test]
    fn test_add_text_concatenates() {
        assert_eq!(
            call("add", vec![col(vec!["a", "b"]), scalar("_x")]).unwrap(),
            col(vec!["a_x", "b_x"])
        );
    }

    #[test]
    fn test_null_propagates() {
        assert_eq!(
            call("mul", vec![col(vec![Some(2.0), None]), scalar(3)]).unwrap(),
            col(vec![Value::Number(6.0), Value::Null])
        );
    }

    #[test]
    fn test_div() {
        assert_eq!(
            call("div", vec![col(vec![1, 0]), scalar(0)]).unwrap(),
            col(vec![Value::Number(f64::INFINITY), Value::Null])
        );
    }

    #[test]
    fn test_floored_mod_and_floordiv() {
        assert_eq!(
            call("mod", vec![col(vec![7, -7, 7]), col(vec![3, 3, -3])]).unwrap(),
            col(vec![1, 2, -2])
        );
        assert_eq!(
            call("floordiv", vec![col(vec![7, -7]), scalar(2)]).unwrap(),
            col(vec![3, -4])
        );
    }

    #[test]
    fn test_unary() {
        assert_eq!(call("abs", vec![col(vec![-1.5, 2.0])]).unwrap(), col(vec![1.5, 2.0]));
        assert_eq!(call("neg", vec![scalar(4)]).unwrap(), scalar(-4));
        assert_eq!(call("pow", vec![scalar(2), scalar(10)]).unwrap(), scalar(1024));
    }

    #[test]
    fn test_text_rejected_by_numeric() {
        let err = call("sub", vec![scalar("x"), scalar(1)]).unwrap_err();
        assert!(matches!(err, FormulaError::Argument(_)));
    }
}
