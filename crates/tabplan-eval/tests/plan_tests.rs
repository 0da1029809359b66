//! End-to-end plan tests: JSON plans run against CSV fixtures on disk.

use serde_json::{json, Value as JsonValue};
use std::fs;
use tabplan_eval::{CsvSource, Engine, EngineState, MemorySource, PlanOutput};
use tabplan_types::{Cell, Column, ErrorKind, Plan, RunError, Table};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

const SALES: &str = "category,amount,item\nFood,10,bread\nFood,20,cheese\nToys,5,ball\n";

fn fixture(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, body) in files {
        fs::write(dir.path().join(name), body).expect("write fixture");
    }
    dir
}

fn plan(ops: JsonValue) -> Plan {
    Plan::from_value(json!({ "operations": ops })).expect("valid plan")
}

fn run_csv(files: &[(&str, &str)], ops: JsonValue) -> Result<JsonValue, RunError> {
    let dir = fixture(files);
    let source = CsvSource::with_base_dir(dir.path());
    Engine::new(&source).run(&plan(ops)).map(|out| out.to_json())
}

fn load(path: &str, out: &str) -> JsonValue {
    json!({
        "operation_type": "read_csv",
        "parameters": {"filepath": path},
        "output_data_key": out
    })
}

fn memory(name: &str, table: Table) -> MemorySource {
    MemorySource::new().with(name, table)
}

fn count_rows(value: &JsonValue) -> usize {
    value.as_array().map_or(0, Vec::len)
}

// ══════════════════════════════════════════════════════════════════════════════
// Full scenarios
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn group_then_display_returns_grouped_table() {
    let out = run_csv(
        &[("sales.csv", SALES)],
        json!([
            load("sales.csv", "S"),
            {
                "operation_type": "group_and_aggregate",
                "input_data_key": "S",
                "parameters": {
                    "by_columns": ["category"],
                    "aggregations": [
                        {"column": "amount", "function": "sum", "output_column_name": "Total"}
                    ]
                },
                "output_data_key": "G"
            },
            {"operation_type": "display_data", "input_data_key": "G", "parameters": {"label": "Totals"}}
        ]),
    )
    .unwrap();
    assert_eq!(
        out,
        json!([
            {"category": "Food", "Total": 30},
            {"category": "Toys", "Total": 5}
        ])
    );
}

#[test]
fn labeled_scalars_are_returned_together() {
    let out = run_csv(
        &[("sales.csv", SALES)],
        json!([
            load("sales.csv", "S"),
            {"operation_type": "calculate_sum", "input_data_key": "S",
             "parameters": {"column": "amount"}, "output_data_key": "total"},
            {"operation_type": "calculate_average", "input_data_key": "S",
             "parameters": {"column": "amount"}, "output_data_key": "mean"}
        ]),
    )
    .unwrap();
    assert_eq!(out, json!({"total": 35, "mean": 35.0 / 3.0}));
}

#[test]
fn unlabeled_step_result_wins() {
    let out = run_csv(
        &[("sales.csv", SALES)],
        json!([
            load("sales.csv", "S"),
            {"operation_type": "calculate_sum", "input_data_key": "S",
             "parameters": {"column": "amount"}, "output_data_key": "total"},
            {"operation_type": "filter_rows", "input_data_key": "S",
             "parameters": {"column": "amount", "operator": ">", "value": 8}}
        ]),
    )
    .unwrap();
    assert_eq!(count_rows(&out), 2);
}

#[test]
fn unlabeled_load_then_latest_table() {
    let dir = fixture(&[("sales.csv", SALES)]);
    let source = CsvSource::with_base_dir(dir.path());
    let p = plan(json!([
        {"operation_type": "read_csv", "parameters": {"filepath": "sales.csv"}}
    ]));
    let out = Engine::new(&source).run(&p).unwrap();
    assert!(matches!(out, PlanOutput::Unlabeled(_)));

    let mut engine = Engine::new(&source);
    let p = plan(json!([
        load("sales.csv", "S"),
        {"operation_type": "display_data", "input_data_key": "S"}
    ]));
    let out = engine.run(&p).unwrap();
    assert!(matches!(out, PlanOutput::LatestTable { ref name, .. } if name == "S"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Failure handling
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn empty_plan_is_rejected() {
    let source = MemorySource::new();
    let mut engine = Engine::new(&source);
    let err = engine.run(&plan(json!([]))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyPlan);
    assert_eq!(err.step_index(), None);
    assert!(engine.env().is_empty());
}

#[test]
fn unknown_binding_halts_the_run() {
    let dir = fixture(&[("sales.csv", SALES)]);
    let source = CsvSource::with_base_dir(dir.path());
    let mut engine = Engine::new(&source);
    let err = engine
        .run(&plan(json!([
            load("sales.csv", "S"),
            {"operation_type": "sort_column", "input_data_key": "nope",
             "parameters": {"column": "amount"}, "output_data_key": "sorted"},
            load("sales.csv", "later")
        ])))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BindingNotFound);
    assert_eq!(err.step_index(), Some(1));
    assert_eq!(engine.state(), EngineState::Failed);
    assert!(engine.env().contains("S"));
    assert!(!engine.env().contains("later"));
    assert!(err.to_string().starts_with("step 2 (sort) failed"));
}

#[test]
fn missing_file_is_source_unavailable() {
    let err = run_csv(&[], json!([load("absent.csv", "S")])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
}

#[test]
fn unknown_operation_kind_rejected_at_parse() {
    let err = Plan::from_value(json!({"operations": [
        {"operation_type": "pivot_table", "parameters": {}}
    ]}))
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperationKind);
}

#[test]
fn scalar_fed_to_table_step_is_type_mismatch() {
    let err = run_csv(
        &[("sales.csv", SALES)],
        json!([
            load("sales.csv", "S"),
            {"operation_type": "calculate_sum", "input_data_key": "S",
             "parameters": {"column": "amount"}, "output_data_key": "total"},
            {"operation_type": "sort_column", "input_data_key": "total",
             "parameters": {"column": "amount"}}
        ]),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

// ══════════════════════════════════════════════════════════════════════════════
// Operation properties
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn load_matches_source_shape() {
    let dir = fixture(&[("sales.csv", SALES)]);
    let source = CsvSource::with_base_dir(dir.path());
    let mut engine = Engine::new(&source);
    engine.run(&plan(json!([load("sales.csv", "S")]))).unwrap();
    let t = engine.env().lookup_table("S").unwrap();
    assert_eq!(t.shape(), (3, 3));
    assert_eq!(
        t.column_names().collect::<Vec<_>>(),
        vec!["category", "amount", "item"]
    );
}

#[test]
fn equal_and_not_equal_partition_rows() {
    let filter = |op: &str| {
        run_csv(
            &[("sales.csv", SALES)],
            json!([
                load("sales.csv", "S"),
                {"operation_type": "filter_rows", "input_data_key": "S",
                 "parameters": {"column": "amount", "operator": op, "value": 10},
                 "output_data_key": "F"}
            ]),
        )
        .unwrap()
    };
    let eq = filter("==");
    let ne = filter("!=");
    assert_eq!(count_rows(&eq), 1);
    assert_eq!(count_rows(&eq) + count_rows(&ne), 3);
}

#[test]
fn sort_is_idempotent() {
    let sort = json!({"operation_type": "sort_column", "input_data_key": "S",
                      "parameters": {"column": "amount", "order": "descending"}});
    let once = run_csv(&[("sales.csv", SALES)], json!([load("sales.csv", "S"), sort])).unwrap();
    let twice = run_csv(
        &[("sales.csv", SALES)],
        json!([load("sales.csv", "S"), sort, sort]),
    )
    .unwrap();
    assert_eq!(once, twice);
    assert_eq!(once[0]["amount"], json!(20));
}

#[test]
fn drop_then_rename_leaves_single_column() {
    let table = Table::new(vec![
        Column::new("A", vec![Cell::Int(1), Cell::Int(2)]),
        Column::new("B", vec![Cell::Int(3), Cell::Int(4)]),
        Column::new("C", vec![Cell::Int(5), Cell::Int(6)]),
    ])
    .unwrap();
    let source = memory("abc", table);
    let out = Engine::new(&source)
        .run(&plan(json!([
            load("abc", "T"),
            {"operation_type": "drop_columns", "input_data_key": "T",
             "parameters": {"columns_to_drop": ["A", "B"]}, "output_data_key": "T"},
            {"operation_type": "rename_column", "input_data_key": "T",
             "parameters": {"old_name": "C", "new_name": "D"}, "output_data_key": "T"}
        ])))
        .unwrap();
    assert_eq!(out.to_json(), json!([{"D": 5}, {"D": 6}]));
}

#[test]
fn rename_onto_existing_column_overwrites_it() {
    let table = Table::new(vec![
        Column::new("old", vec![Cell::Int(1)]),
        Column::new("new", vec![Cell::Int(9)]),
    ])
    .unwrap();
    let source = memory("t", table);
    let out = Engine::new(&source)
        .run(&plan(json!([
            load("t", "T"),
            {"operation_type": "rename_column", "input_data_key": "T",
             "parameters": {"old_name": "old", "new_name": "new"}}
        ])))
        .unwrap();
    assert_eq!(out.to_json(), json!([{"new": 1}]));
}

#[test]
fn merge_inner_and_outer() {
    let customers = "id,name\n1,Ann\n2,Bo\n3,Cy\n";
    let orders = "id,total\n2,50\n3,70\n4,90\n";
    let merge = |how: &str| {
        run_csv(
            &[("c.csv", customers), ("o.csv", orders)],
            json!([
                load("c.csv", "C"),
                load("o.csv", "O"),
                {"operation_type": "merge_dataframes", "input_data_key": "C",
                 "parameters": {"right_data_key": "O", "on_column": "id", "how": how},
                 "output_data_key": "M"}
            ]),
        )
        .unwrap()
    };

    let inner = merge("inner");
    assert_eq!(
        inner,
        json!([
            {"id": 2, "name": "Bo", "total": 50},
            {"id": 3, "name": "Cy", "total": 70}
        ])
    );

    let outer = merge("outer");
    assert_eq!(count_rows(&outer), 4);
    assert_eq!(outer[0], json!({"id": 1, "name": "Ann", "total": null}));
    assert_eq!(outer[3], json!({"id": 4, "name": null, "total": 90}));
}

#[test]
fn hyphenated_kind_names_are_accepted() {
    let out = run_csv(
        &[("sales.csv", SALES)],
        json!([
            {"operation_type": "load-table", "parameters": {"filepath": "sales.csv"},
             "output_data_key": "S"},
            {"operation_type": "sum", "input_data_key": "S", "parameters": {"column": "amount"}}
        ]),
    )
    .unwrap();
    assert_eq!(out, json!(35));
}

#[test]
fn transcript_records_steps_and_display() {
    let dir = fixture(&[("sales.csv", SALES)]);
    let source = CsvSource::with_base_dir(dir.path());
    let mut engine = Engine::new(&source);
    engine
        .run(&plan(json!([
            load("sales.csv", "S"),
            {"operation_type": "display_data", "input_data_key": "S",
             "parameters": {"label": "Sales"}, "description": "Show sales"}
        ])))
        .unwrap();
    let transcript = engine.transcript().join("\n");
    assert!(transcript.contains("STEP 2: Show sales"));
    assert!(transcript.contains("--- Sales ---"));
    assert!(transcript.contains("cheese"));
}
