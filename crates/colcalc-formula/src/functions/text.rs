//! Text functions
//!
//! Non-text, non-null operands are used in their displayed form, so
//! `@upper(1)` is `"1"`. Null propagates, except where noted.

use super::{scalar_number, FunctionDef, FunctionRegistry};
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{elementwise, FormulaValue, FunctionArgs};
use colcalc_core::Value;
use regex::Regex;
use std::borrow::Cow;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry
        .register_def(
            FunctionDef::with_params("upper", &["a"], |args| map_text(args, |s| s.to_uppercase()))
                .doc("Convert text to upper case"),
        )
        .register_def(
            FunctionDef::with_params("lower", &["a"], |args| map_text(args, |s| s.to_lowercase()))
                .doc("Convert text to lower case"),
        )
        .register_def(
            FunctionDef::with_params("strip", &["a"], |args| map_text(args, |s| s.trim().into()))
                .doc("Remove leading and trailing whitespace"),
        )
        .register_def(
            FunctionDef::with_params("lstrip", &["a"], |args| {
                map_text(args, |s| s.trim_start().into())
            })
            .doc("Remove leading whitespace"),
        )
        .register_def(
            FunctionDef::with_params("rstrip", &["a"], |args| {
                map_text(args, |s| s.trim_end().into())
            })
            .doc("Remove trailing whitespace"),
        )
        .register_def(
            FunctionDef::with_params("str_len", &["a"], fn_str_len)
                .doc("Number of characters in the text"),
        )
        .register_def(
            FunctionDef::new("concat", fn_concat)
                .with_min_args(2)
                .doc("Join two or more values as text; null counts as empty"),
        )
        .register_def(
            FunctionDef::new("concat_sep", fn_concat_sep)
                .with_min_args(3)
                .doc("Join values as text with the separator given first"),
        )
        .register_def(
            FunctionDef::with_params("contains", &["a", "pattern"], fn_contains)
                .doc("True where the text matches a regular expression"),
        )
        .register_def(
            FunctionDef::with_params("startswith", &["a", "prefix"], |args| {
                test_affix(args, "prefix", |s, p| s.starts_with(p))
            })
            .doc("True where the text starts with prefix"),
        )
        .register_def(
            FunctionDef::with_params("endswith", &["a", "suffix"], |args| {
                test_affix(args, "suffix", |s, p| s.ends_with(p))
            })
            .doc("True where the text ends with suffix"),
        )
        .register_def(
            FunctionDef::with_params("replace", &["a", "old", "new"], fn_replace)
                .doc("Replace every occurrence of old with new"),
        )
        .register_def(
            FunctionDef::with_params("slice", &["a", "start", "stop"], fn_slice)
                .with_min_args(2)
                .doc("Characters from start up to stop; negative positions count from the end"),
        );
}

fn as_str(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Text(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

fn scalar_text<'a>(arg: &'a FormulaValue, param: &str, function: &str) -> FormulaResult<&'a str> {
    arg.as_scalar()
        .and_then(Value::as_text)
        .ok_or_else(|| {
            FormulaError::Argument(format!("@{}: '{}' must be a single text value", function, param))
        })
}

fn map_text(args: &FunctionArgs, f: fn(&str) -> String) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    a.map(|value| {
        Ok(if value.is_null() {
            Value::Null
        } else {
            Value::Text(f(&as_str(value)))
        })
    })
}

/// STR_LEN function
fn fn_str_len(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    a.map(|value| {
        Ok(if value.is_null() {
            Value::Null
        } else {
            Value::Number(as_str(value).chars().count() as f64)
        })
    })
}

fn join(parts: &[&Value], sep: &str) -> Value {
    let joined = parts
        .iter()
        .map(|value| as_str(value))
        .collect::<Vec<_>>()
        .join(sep);
    Value::Text(joined)
}

/// CONCAT function
fn fn_concat(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let inputs: Vec<&FormulaValue> = args.rest(0).collect();
    elementwise(&inputs, |row| Ok(join(row, "")))
}

/// CONCAT_SEP function
fn fn_concat_sep(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let sep = scalar_text(args.required(0, "sep")?, "sep", args.function())?;
    let inputs: Vec<&FormulaValue> = args.rest(1).collect();
    elementwise(&inputs, |row| Ok(join(row, sep)))
}

/// CONTAINS function
fn fn_contains(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let pattern = scalar_text(args.required(1, "pattern")?, "pattern", args.function())?;
    let re = Regex::new(pattern).map_err(|e| {
        FormulaError::Argument(format!("@{}: invalid pattern: {}", args.function(), e))
    })?;
    a.map(|value| Ok(Value::Boolean(!value.is_null() && re.is_match(&as_str(value)))))
}

/// Shared body of STARTSWITH and ENDSWITH; null reads as false
fn test_affix(
    args: &FunctionArgs,
    param: &str,
    test: fn(&str, &str) -> bool,
) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let affix = args.required(1, param)?;
    elementwise(&[a, affix], |row| {
        let hit = !row[0].is_null() && !row[1].is_null() && test(&as_str(row[0]), &as_str(row[1]));
        Ok(Value::Boolean(hit))
    })
}

/// REPLACE function
fn fn_replace(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let old = args.required(1, "old")?;
    let new = args.required(2, "new")?;
    elementwise(&[a, old, new], |row| {
        if row[0].is_null() {
            return Ok(Value::Null);
        }
        let old = as_str(row[1]);
        Ok(Value::Text(as_str(row[0]).replace(&*old, &as_str(row[2]))))
    })
}

/// SLICE function
fn fn_slice(args: &FunctionArgs) -> FormulaResult<FormulaValue> {
    let a = args.required(0, "a")?;
    let start = scalar_number(args.required(1, "start")?, "start", args.function())? as i64;
    let stop = match args.get(2) {
        Some(stop) => Some(scalar_number(stop, "stop", args.function())? as i64),
        None => None,
    };

    a.map(|value| {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let chars: Vec<char> = as_str(value).chars().collect();
        let len = chars.len() as i64;
        let clamp = |i: i64| {
            let i = if i < 0 { (len + i).max(0) } else { i.min(len) };
            i as usize
        };
        let from = clamp(start);
        let to = clamp(stop.unwrap_or(len));
        let sliced: String = if from < to {
            chars[from..to].iter().collect()
        } else {
            String::new()
        };
        Ok(Value::Text(sliced))
    })
}
