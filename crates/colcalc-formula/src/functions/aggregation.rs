//! Aggregation functions
//!
//! Reductions skip nulls and return a scalar, which the evaluator broadcasts
//! to every row. `pct_of_total`, `normalize` and `zscore` combine each value
//! with a reduction of the whole column and stay elementwise.

use super::{number, number_value, FunctionDef, FunctionRegistry};
use crate::error::FormulaResult;
use crate::evaluator::{FormulaValue, FunctionArgs};
use colcalc_core::Value;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    let reductions: [(&str, &str, fn(&[f64]) -> Option<f64>); 7] = [
        ("sum", "Sum of the column", |xs| Some(xs.iter().sum())),
        ("mean", "Mean of the column", mean),
        ("median", "Median of the column", median),
        ("min", "Smallest value in the column", |xs| {
            xs.iter().copied().reduce(f64::min)
        }),
        ("max", "Largest value in the column", |xs| {
            xs.iter().copied().reduce(f64::max)
        }),
        ("var", "Sample variance of the column", variance),
        ("std", "Sample standard deviation of the column", |xs| {
            variance(xs).map(f64::sqrt)
        }),
    ];
    for (name, doc, reduce) in reductions {
        registry.register_def(
            FunctionDef::with_params(name, &["a"], move |args| {
                let xs = present_numbers(args)?;
                Ok(FormulaValue::Scalar(number_value(reduce(&xs))))
            })
            .doc(doc),
        );
    }

    registry
        .register_def(
            FunctionDef::with_params("count", &["a"], fn_count)
                .doc("Number of non-null values in the column"),
        )
        .register_def(
            FunctionDef::with_params("pct_of_total", &["a"], fn_pct_of_total)
                .doc("Each value as a percentage of the column total"),
        )
        .register_def(
            FunctionDef::with_params("normalize", &["a"], |args| {
                rescale(args, |xs| {
                    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
                    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    (lo, hi - lo)
                })
            })
            .doc("Min-max scale the column to [0, 1]"),
        )
        .register_def(
            FunctionDef::with_params("zscore", &["a"], |args| {
                rescale(args, |xs| {
                    let centre = mean(xs).unwrap_or(f64::NAN);
                    let spread = variance(xs).map_or(f64::NAN, f64::sqrt);
                    (centre, spread)
                })
            })
            .doc("Standard score of each value within the column"),
        );
}

/// Non-null values of the first argument as numbers
fn present_numbers(args: &FunctionArgs) -> FormulaResult<Vec<f64>> {
    let a = args.required(0, "a")?;
    let mut xs = Vec::with_capacity(a.values().len());
    for value in a.values() {
        if let Some(x) = number(value, args.function())? {
            xs.push(x);
        }
    }
    Ok(xs)
}

fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

fn median(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Sample variance (n - 1 denominator)
fn variance(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    Some(ss / (xs.len() - 1) as f64)
}

/// COUNT function
fn fn_count(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let count = a.values().iter().filter(|value| !value.is_null()).count();
    Ok(FormulaValue::Scalar(Value::Number(count as f64)))
}

/// PCT_OF_TOTAL function
fn fn_pct_of_total(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let total: f64 = present_numbers(args)?.iter().sum();
    a.map(|value| {
        let x = number(value, args.function())?;
        Ok(number_value(x.map(|x| x / total * 100.0)))
    })
}

/// Map each value to `(x - offset) / scale`, with both taken from the column
fn rescale(args: &FunctionArgs, stats: fn(&[f64]) -> (f64, f64)) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let (offset, scale) = stats(&present_numbers(args)?);
    a.map(|value| {
        let x = number(value, args.function())?;
        Ok(number_value(x.map(|x| (x - offset) / scale)))
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{call, col, scalar};
    use super::*;
    use pretty_assertions::assert_eq;

    fn values() -> FormulaValue {
        col(vec![
            Value::Number(2.0),
            Value::Null,
            Value::Number(4.0),
            Value::Number(4.0),
            Value::Number(6.0),
        ])
    }

    #[test]
    fn test_reductions_skip_nulls() {
        assert_eq!(call("sum", vec![values()]).unwrap(), scalar(16));
        assert_eq!(call("mean", vec![values()]).unwrap(), scalar(4));
        assert_eq!(call("median", vec![values()]).unwrap(), scalar(4));
        assert_eq!(call("min", vec![values()]).unwrap(), scalar(2));
        assert_eq!(call("max", vec![values()]).unwrap(), scalar(6));
        assert_eq!(call("count", vec![values()]).unwrap(), scalar(4));
    }

    #[test]
    fn test_sample_statistics() {
        // deviations -2, 0, 0, 2 -> 8 / (4 - 1)
        let var = call("var", vec![values()]).unwrap();
        assert_eq!(var, scalar(8.0 / 3.0));
        assert_eq!(call("std", vec![values()]).unwrap(), scalar((8.0f64 / 3.0).sqrt()));

        assert_eq!(call("std", vec![col(vec![1])]).unwrap(), scalar(Value::Null));
    }

    #[test]
    fn test_empty_column() {
        let empty = col(Vec::<Value>::new());
        assert_eq!(call("sum", vec![empty.clone()]).unwrap(), scalar(0));
        assert_eq!(call("mean", vec![empty]).unwrap(), scalar(Value::Null));
    }

    #[test]
    fn test_pct_of_total() {
        assert_eq!(
            call("pct_of_total", vec![col(vec![1, 3])]).unwrap(),
            col(vec![25, 75])
        );
    }

    #[test]
    fn test_normalize_and_zscore() {
        assert_eq!(
            call("normalize", vec![col(vec![10, 15, 20])]).unwrap(),
            col(vec![0.0, 0.5, 1.0])
        );
        assert_eq!(
            call("zscore", vec![col(vec![1, 2, 3])]).unwrap(),
            col(vec![-1.0, 0.0, 1.0])
        );
        assert_eq!(
            call("normalize", vec![col(vec![Value::Null, Value::Number(1.0)])]).unwrap(),
            col(vec![Value::Null, Value::Null])
        );
    }
}
