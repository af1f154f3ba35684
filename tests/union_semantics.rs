//! Union Semantics Tests
//!
//! - UNION ALL: row count is always the sum of the inputs
//! - Result schema is left columns, then right-only columns
//! - Missing columns are filled with an explicit absent marker
//! - Conflicting column types fail without registering anything

use std::collections::BTreeSet;

use serde_json::{json, Map, Value as JsonValue};
use tabledb::{union_tables, ColumnType, Database, ErrorKind, TableError, Value};

fn obj(value: JsonValue) -> Map<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

fn sample_db() -> Database {
    let mut db = Database::new("test");
    db.create_table("A", [("id", "integer"), ("name", "string")]).unwrap();
    db.create_table("B", [("id", "integer"), ("age", "integer")]).unwrap();
    db.insert_row("A", &obj(json!({"id": 1, "name": "Alice"}))).unwrap();
    db.insert_row("B", &obj(json!({"id": 2, "age": 30}))).unwrap();
    db
}

// =============================================================================
// Schema Merging
// =============================================================================

#[test]
fn test_union_fills_absent_columns() {
    let db = sample_db();
    let result = union_tables(db.get_table("A").unwrap(), db.get_table("B").unwrap()).unwrap();

    assert_eq!(result.name(), "A_UNION_B");
    assert_eq!(
        result.schema(),
        vec![
            ("id", ColumnType::Integer),
            ("name", ColumnType::String),
            ("age", ColumnType::Integer),
        ]
    );
    assert_eq!(
        result.to_json()["rows"],
        json!([
            {"id": 1, "name": "Alice", "age": null},
            {"id": 2, "name": null, "age": 30}
        ])
    );
    assert_eq!(result.rows()[0].get("age"), Some(&Value::Absent));
}

#[test]
fn test_union_column_set_is_set_union() {
    let mut db = Database::new("test");
    db.create_table("L", [("x", "string"), ("y", "date"), ("z", "real")]).unwrap();
    db.create_table("R", [("w", "char"), ("z", "real"), ("x", "string")]).unwrap();

    let result = db.union("L", "R", None).unwrap();
    let names: Vec<&str> = result.columns().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["x", "y", "z", "w"]);

    let set: BTreeSet<&str> = names.into_iter().collect();
    assert_eq!(set, ["w", "x", "y", "z"].into_iter().collect());
}

// =============================================================================
// Row Counts
// =============================================================================

#[test]
fn test_self_union_doubles_rows_and_keeps_schema() {
    let mut db = Database::new("test");
    db.create_table("t", [("id", "integer"), ("d", "date")]).unwrap();
    for i in 0..3 {
        db.insert_row("t", &obj(json!({"id": i, "d": "2024-05-01"}))).unwrap();
    }

    let original = db.get_table("t").unwrap().clone();
    let result = db.union("t", "t", None).unwrap();

    assert_eq!(result.row_count(), 6);
    assert_eq!(result.schema_signature(), original.schema_signature());
    assert_eq!(result.get_rows()[..3], original.get_rows()[..]);
    assert_eq!(result.get_rows()[3..], original.get_rows()[..]);
}

#[test]
fn test_duplicates_are_preserved() {
    let mut db = Database::new("test");
    db.create_table("a", [("v", "string")]).unwrap();
    db.create_table("b", [("v", "string")]).unwrap();
    db.insert_row("a", &obj(json!({"v": "same"}))).unwrap();
    db.insert_row("a", &obj(json!({"v": "same"}))).unwrap();
    db.insert_row("b", &obj(json!({"v": "same"}))).unwrap();

    let result = db.union("a", "b", Some("all")).unwrap();
    assert_eq!(result.name(), "all");
    assert_eq!(result.row_count(), 3);
}

// =============================================================================
// Failure Modes
// =============================================================================

#[test]
fn test_incompatible_types_fail_without_table() {
    let mut db = Database::new("test");
    db.create_table("a", [("id", "integer")]).unwrap();
    db.create_table("b", [("id", "string")]).unwrap();

    let err = db.union("a", "b", None).unwrap_err();
    assert_eq!(
        err,
        TableError::IncompatibleSchema {
            column: "id".into(),
            left: ColumnType::Integer,
            right: ColumnType::String,
        }
    );
    assert_eq!(err.kind(), ErrorKind::Incompatibility);
    assert_eq!(db.len(), 2);
}

#[test]
fn test_union_of_unknown_table() {
    let mut db = sample_db();
    assert_eq!(
        db.union("A", "nope", None).unwrap_err(),
        TableError::TableNotFound("nope".into())
    );
}

// =============================================================================
// Result Naming
// =============================================================================

#[test]
fn test_repeated_union_gets_suffixed_names() {
    let mut db = sample_db();
    assert_eq!(db.union("A", "B", None).unwrap().name(), "A_UNION_B");
    assert_eq!(db.union("A", "B", None).unwrap().name(), "A_UNION_B (1)");
    assert_eq!(db.union("A", "B", Some("  A_UNION_B ")).unwrap().name(), "A_UNION_B (2)");
}

#[test]
fn test_long_union_names_are_capped() {
    let mut db = Database::new("test");
    let long = "t".repeat(50);
    db.create_table(&long, [("v", "integer")]).unwrap();

    let first = db.union(&long, &long, None).unwrap().name().to_string();
    assert_eq!(first.chars().count(), 60);

    let second = db.union(&long, &long, None).unwrap().name().to_string();
    assert_eq!(second.chars().count(), 60);
    assert!(second.ends_with(" (1)"));
}

/// The union result is an ordinary table.
#[test]
fn test_union_result_accepts_new_rows() {
    let mut db = sample_db();
    db.union("A", "B", Some("people")).unwrap();

    db.insert_row("people", &obj(json!({"id": 3, "name": "Cy", "age": "41"})))
        .unwrap();
    let rows = db.get_table("people").unwrap().get_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["age"], json!(41));
}
