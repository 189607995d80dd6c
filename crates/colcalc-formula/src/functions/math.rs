//! Math functions

use super::{number, number_value, scalar_number, unary_numeric, FunctionDef, FunctionRegistry};
use crate::error::FormulaResult;
use crate::evaluator::{elementwise, FormulaValue, FunctionArgs};
use colcalc_core::Value;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    let unary: [(&str, &str, fn(f64) -> f64); 11] = [
        ("ceil", "Round up to the nearest integer", f64::ceil),
        ("floor", "Round down to the nearest integer", f64::floor),
        ("sqrt", "Square root", f64::sqrt),
        ("log", "Natural logarithm", f64::ln),
        ("log10", "Base-10 logarithm", f64::log10),
        ("log2", "Base-2 logarithm", f64::log2),
        ("exp", "e raised to the value", f64::exp),
        ("sin", "Sine (radians)", f64::sin),
        ("cos", "Cosine (radians)", f64::cos),
        ("tan", "Tangent (radians)", f64::tan),
        ("sign", "Sign of the value (-1, 0 or 1)", sign),
    ];
    for (name, doc, f) in unary {
        registry.register_def(
            FunctionDef::with_params(name, &["a"], move |args| unary_numeric(args, f)).doc(doc),
        );
    }

    registry
        .register_def(
            FunctionDef::with_params("round", &["a", "decimals"], fn_round)
                .with_min_args(1)
                .doc("Round to the given number of decimals, ties to even"),
        )
        .register_def(
            FunctionDef::with_params("clip", &["a", "lower", "upper"], fn_clip)
                .with_min_args(1)
                .doc("Limit values to [lower, upper]; either bound may be omitted"),
        );
}

fn sign(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x.signum()
    }
}

/// ROUND function
fn fn_round(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let decimals = match args.get(1) {
        Some(decimals) => scalar_number(decimals, "decimals", args.function())? as i32,
        None => 0,
    };
    let scale = 10f64.powi(decimals);

    a.map(|value| {
        let rounded = number(value, args.function())?.map(|x| round_to(x, decimals, scale));
        Ok(number_value(rounded))
    })
}

/// Round `x` to `decimals` places, where `scale` is `10^decimals`
///
/// A scale that overflows leaves `x` as is (it has no digits that far
/// down); one that underflows rounds everything to zero.
fn round_to(x: f64, decimals: i32, scale: f64) -> f64 {
    if decimals == 0 {
        return x.round_ties_even();
    }
    if scale == 0.0 {
        return 0.0f64.copysign(x);
    }
    let scaled = x * scale;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round_ties_even() / scale
}

/// CLIP function
fn fn_clip(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let unbounded = FormulaValue::Scalar(Value::Null);
    let lower = args.get(1).unwrap_or(&unbounded);
    let upper = args.get(2).unwrap_or(&unbounded);

    elementwise(&[a, lower, upper], |row| {
        let Some(mut x) = number(row[0], args.function())? else {
            return Ok(Value::Null);
        };
        if let Some(lo) = number(row[1], args.function())? {
            x = x.max(lo);
        }
        if let Some(hi) = number(row[2], args.function())? {
            x = x.min(hi);
        }
        Ok(Value::Number(x))
    })
}
