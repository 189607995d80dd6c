//! End-to-end tests for ordered formula application

use colcalc::prelude::*;
use colcalc::{extract_references, extract_references_batch, EngineConfig};
use pretty_assertions::assert_eq;

fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().map(|&n| Value::Number(n)).collect()
}

fn sales() -> Table {
    Table::from_columns([
        ("price", vec![10.0, 20.0, 5.0]),
        ("quantity", vec![3.0, 1.0, 4.0]),
        ("cost", vec![12.0, 15.0, 30.0]),
    ])
    .unwrap()
}

/// Test that later formulas see columns written by earlier ones
#[test]
fn test_apply_uses_just_written_columns() {
    let mut engine = FormulaEngine::new();
    engine
        .add_formula("total", "@mul(price,quantity)")
        .add_formula("profit", "@sub(total,cost)");

    let mut table = sales();
    engine.apply(&mut table).unwrap();

    assert_eq!(table.column("total").unwrap(), numbers(&[30.0, 20.0, 20.0]).as_slice());
    assert_eq!(table.column("profit").unwrap(), numbers(&[18.0, 5.0, -10.0]).as_slice());
}

/// Test that a formula cannot read a column written after it
#[test]
fn test_forward_reference_fails() {
    let mut engine = FormulaEngine::new();
    engine
        .add_formula("profit", "@sub(total,cost)")
        .add_formula("total", "@mul(price,quantity)");

    let mut table = sales();
    let err = engine.apply(&mut table).unwrap_err();

    assert!(
        matches!(err.root_cause(), FormulaError::ColumnNotFound(name) if name == "total"),
        "unexpected error: {}",
        err
    );
    assert!(err.to_string().contains("profit"));
}

/// Test that a failing formula leaves earlier results in place
#[test]
fn test_partial_mutation_is_observable() {
    let mut engine = FormulaEngine::new();
    engine
        .add_formula("total", "@mul(price,quantity)")
        .add_formula("broken", "@nope(total)")
        .add_formula("after", "@add(total, 1)");

    let mut table = sales();
    assert!(engine.apply(&mut table).is_err());
    assert!(table.contains_column("total"));
    assert!(!table.contains_column("broken"));
    assert!(!table.contains_column("after"));
}

/// Test that validation agrees with what apply would do
#[test]
fn test_validate_matches_apply() {
    let table = sales();

    let mut good = FormulaEngine::new();
    good.add_formula("total", "@mul(price,quantity)")
        .add_formula("profit", "@sub(total,cost)");
    assert!(good.validate(&table).is_empty());
    assert!(good.applied(&table).is_ok());

    let mut bad = FormulaEngine::new();
    bad.add_formula("profit", "@sub(total,cost)")
        .add_formula("total", "@mul(price,quantity)");
    let issues = bad.validate(&table);
    assert_eq!(
        issues,
        vec![ValidationIssue {
            target: "profit".into(),
            kind: IssueKind::MissingColumn,
            detail: "total".into(),
        }]
    );
    assert!(bad.applied(&table).is_err());
}

/// Test reference extraction on the documented examples
#[test]
fn test_reference_extraction() {
    assert!(extract_references("0").is_empty());
    assert!(extract_references("101325").is_empty());
    assert_eq!(
        extract_references("@div(@clip(score, lower=0), 1e6)")
            .into_iter()
            .collect::<Vec<_>>(),
        vec!["score"]
    );

    let engine = FormulaEngine::new();
    let batch = ["@mul(price,quantity)", "@sub(total,cost)", "@fillna(x, value=y)"];
    let union = extract_references_batch(batch);
    assert_eq!(
        union.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["cost", "price", "quantity", "total", "x", "y"]
    );
    for name in engine.list_functions() {
        assert!(!union.contains(name));
    }
}

/// Test batch registration with and without documentation
#[test]
fn test_register_batch_docs() {
    let mut engine = FormulaEngine::new();
    engine.register_batch([
        (
            "myfunc1",
            FunctionEntry::new(|args: &FunctionArgs| Ok(args.required(0, "a")?.clone())),
        ),
        (
            "myfunc2",
            FunctionEntry::new(|args: &FunctionArgs| Ok(args.required(0, "a")?.clone()))
                .with_doc("Identity"),
        ),
    ]);

    let docs = engine.to_dict().functions;
    assert_eq!(docs["myfunc1"], None);
    assert_eq!(docs["myfunc2"].as_deref(), Some("Identity"));

    let mut table = sales();
    engine.add_formula("copy", "@myfunc2(price)");
    engine.apply(&mut table).unwrap();
    assert_eq!(table.column("copy"), table.column("price"));
}

/// Test that re-registering a name replaces the callable
#[test]
fn test_reregistration_overwrites() {
    let mut engine = FormulaEngine::new();
    engine
        .register("scale", |_| Ok(FormulaValue::Scalar(Value::from(1))), None)
        .add_formula("s", "@mul(price, @scale())");

    let mut table = sales();
    engine.apply(&mut table).unwrap();
    assert_eq!(table.column("s").unwrap(), numbers(&[10.0, 20.0, 5.0]).as_slice());

    engine.register("scale", |_| Ok(FormulaValue::Scalar(Value::from(10))), Some("x10"));
    let lookup = engine.registry().lookup("scale").unwrap();
    assert_eq!(lookup.doc.as_deref(), Some("x10"));

    engine.apply(&mut table).unwrap();
    assert_eq!(table.column("s").unwrap(), numbers(&[100.0, 200.0, 50.0]).as_slice());
}

/// Test that re-adding a formula keeps its place in the order
#[test]
fn test_readding_formula_keeps_position() {
    let mut engine = FormulaEngine::new();
    engine
        .add_formula("a", "@mul(price, 2)")
        .add_formula("b", "@add(a, 1)")
        .add_formula("a", "@mul(price, 3)");

    assert_eq!(engine.formulas().targets().collect::<Vec<_>>(), vec!["a", "b"]);

    let table = engine.applied(&sales()).unwrap();
    assert_eq!(table.column("b").unwrap(), numbers(&[31.0, 61.0, 16.0]).as_slice());
}

/// Test the row count is fixed by the table
#[test]
fn test_row_count_invariant() {
    let mut engine = FormulaEngine::new();
    engine
        .add_formula("const", "42")
        .add_formula("avg", "@mean(price)")
        .add_formula("label", "'x'");

    let table = engine.applied(&sales()).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column("const").unwrap(), numbers(&[42.0; 3]).as_slice());
    assert_eq!(
        table.column("avg").unwrap(),
        numbers(&[35.0 / 3.0; 3]).as_slice()
    );
    assert_eq!(table.column("label").unwrap()[2], Value::text("x"));
}

/// Test a configuration document end to end
#[test]
fn test_config_driven_apply() {
    let config = EngineConfig::from_json_str(
        r#"{
            "constants": { "markup": 1.5 },
            "columns": {
                "total": "@mul(price, quantity)",
                "retail": "@round(@mul(price, @markup), 2)",
                "skipped": { "formula": "@nope(x)", "enabled": false },
                "tier": "@if_else(@gte(total, 25), 'high', 'low')"
            }
        }"#,
    )
    .unwrap();

    let engine = config.build_engine();
    let mut table = sales();
    let stats = engine.apply(&mut table).unwrap();

    assert_eq!(stats.formulas_applied, 3);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["price", "quantity", "cost", "total", "retail", "tier"]
    );
    assert_eq!(table.column("retail").unwrap(), numbers(&[15.0, 30.0, 7.5]).as_slice());
    assert_eq!(
        table.column("tier").unwrap(),
        &[Value::text("high"), Value::text("low"), Value::text("low")]
    );
}
