//! Catalog and Request Tests
//!
//! End-to-end through the JSON request handler:
//! - Every operation answers with a status envelope
//! - Failures keep their error codes and change nothing
//! - State survives reopening the storage directory

use std::fs;

use serde_json::{json, Value};
use tabledb::api::{ApiHandler, Response};
use tabledb::catalog::Catalog;
use tabledb::config::Config;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open(dir: &TempDir) -> ApiHandler {
    ApiHandler::new(Catalog::open(Config::with_storage_dir(dir.path())).unwrap())
}

fn ok(handler: &mut ApiHandler, request: Value) -> Value {
    let response = handler.handle(&request.to_string());
    match response.data() {
        Some(data) => data.clone(),
        None => panic!("{} failed: {}", request, response.to_json()),
    }
}

fn fail(handler: &mut ApiHandler, request: Value) -> String {
    let response: Response = handler.handle(&request.to_string());
    response
        .error_code()
        .unwrap_or_else(|| panic!("{} unexpectedly succeeded", request))
        .to_string()
}

fn seed(handler: &mut ApiHandler) {
    ok(
        handler,
        json!({"op": "create_table", "name": "A", "schema": [{"name": "id", "type": "integer"}, {"name": "name", "type": "string"}]}),
    );
    ok(
        handler,
        json!({"op": "create_table", "name": "B", "schema": [["id", "integer"], ["age", "integer"]]}),
    );
    ok(handler, json!({"op": "insert_row", "table": "A", "values": {"id": 1, "name": "Alice"}}));
    ok(handler, json!({"op": "insert_row", "table": "B", "values": {"id": 2, "age": 30}}));
}

// =============================================================================
// Table Operations
// =============================================================================

#[test]
fn test_union_request_returns_table_document() {
    let dir = TempDir::new().unwrap();
    let mut h = open(&dir);
    seed(&mut h);

    let table = ok(&mut h, json!({"op": "union", "left": "A", "right": "B"}));
    assert_eq!(
        table,
        json!({
            "name": "A_UNION_B",
            "columns": [
                {"name": "id", "type": "integer"},
                {"name": "name", "type": "string"},
                {"name": "age", "type": "integer"}
            ],
            "rows": [
                {"id": 1, "name": "Alice", "age": null},
                {"id": 2, "name": null, "age": 30}
            ]
        })
    );

    let listing = ok(&mut h, json!({"op": "list_tables"}));
    assert_eq!(listing["tables"].as_array().unwrap().len(), 3);
}

#[test]
fn test_error_codes() {
    let dir = TempDir::new().unwrap();
    let mut h = open(&dir);
    seed(&mut h);

    assert_eq!(
        fail(&mut h, json!({"op": "create_table", "name": "A", "schema": [["x", "string"]]})),
        "TDB_TABLE_EXISTS"
    );
    assert_eq!(
        fail(&mut h, json!({"op": "create_table", "name": "C", "schema": [["x", "string"], ["x", "date"]]})),
        "TDB_SCHEMA_DUPLICATE_COLUMN"
    );
    assert_eq!(
        fail(&mut h, json!({"op": "insert_row", "table": "A", "values": {"id": "x", "name": "n"}})),
        "TDB_VALIDATION_FAILED"
    );
    assert_eq!(
        fail(&mut h, json!({"op": "update_row", "table": "B", "row_index": 9, "values": {"id": 1, "age": 2}})),
        "TDB_ROW_INDEX_OUT_OF_RANGE"
    );
    assert_eq!(
        fail(&mut h, json!({"op": "delete_row", "table": "B", "row_index": -1})),
        "TDB_INVALID_REQUEST"
    );
    assert_eq!(fail(&mut h, json!({"op": "drop_table", "name": "Z"})), "TDB_TABLE_NOT_FOUND");

    ok(&mut h, json!({"op": "create_table", "name": "C", "schema": [["id", "string"]]}));
    assert_eq!(
        fail(&mut h, json!({"op": "union", "left": "A", "right": "C"})),
        "TDB_INCOMPATIBLE_SCHEMA"
    );

    let view = ok(&mut h, json!({"op": "view_table", "name": "A"}));
    assert_eq!(view["rows"], json!([{"id": 1, "name": "Alice"}]));
}

#[test]
fn test_row_lifecycle() {
    let dir = TempDir::new().unwrap();
    let mut h = open(&dir);
    seed(&mut h);

    let updated = ok(
        &mut h,
        json!({"op": "update_row", "table": "A", "row_index": 0, "values": {"id": "10", "name": "Al"}}),
    );
    assert_eq!(updated["row"], json!({"id": 10, "name": "Al"}));

    let deleted = ok(&mut h, json!({"op": "delete_row", "table": "A", "row_index": 0}));
    assert_eq!(deleted["row"]["name"], json!("Al"));

    let view = ok(&mut h, json!({"op": "view_table", "name": "A"}));
    assert_eq!(view["rows"], json!([]));
}

// =============================================================================
// Databases
// =============================================================================

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut h = open(&dir);
        ok(&mut h, json!({"op": "create_database", "name": "inventory"}));
        ok(&mut h, json!({"op": "create_table", "name": "items", "schema": [["sku", "string"]]}));
        ok(&mut h, json!({"op": "insert_row", "table": "items", "values": {"sku": "X-1"}}));
    }

    let mut h = open(&dir);
    let listing = ok(&mut h, json!({"op": "list_databases"}));
    assert_eq!(listing["active"], json!("default"));
    assert!(listing["databases"].as_array().unwrap().contains(&json!("inventory")));

    ok(&mut h, json!({"op": "switch_database", "name": "inventory"}));
    let view = ok(&mut h, json!({"op": "view_table", "name": "items"}));
    assert_eq!(view["rows"], json!([{"sku": "X-1"}]));
}

#[test]
fn test_database_management() {
    let dir = TempDir::new().unwrap();
    let mut h = open(&dir);

    assert_eq!(fail(&mut h, json!({"op": "delete_database", "name": "default"})), "TDB_LAST_DATABASE");
    ok(&mut h, json!({"op": "create_database", "name": "a"}));
    assert_eq!(fail(&mut h, json!({"op": "create_database", "name": "a"})), "TDB_DATABASE_EXISTS");

    let renamed = ok(&mut h, json!({"op": "rename_database", "old": "a", "new": "b"}));
    assert_eq!(renamed["active"], json!("b"));
    assert!(dir.path().join("b.json").exists());

    let deleted = ok(&mut h, json!({"op": "delete_database", "name": "b"}));
    assert_eq!(deleted["active"], json!("default"));
    assert!(!dir.path().join("b.json").exists());
    assert_eq!(
        fail(&mut h, json!({"op": "switch_database", "name": ""})),
        "TDB_INVALID_NAME"
    );
}

#[test]
fn test_export_import_and_explicit_paths() {
    let dir = TempDir::new().unwrap();
    let mut h = open(&dir);
    seed(&mut h);

    let exported = ok(&mut h, json!({"op": "export"}));
    assert_eq!(exported["name"], json!("default"));

    let imported = ok(&mut h, json!({"op": "import_database", "name": "default", "data": exported.to_string()}));
    assert_eq!(imported["database"], json!("default (1)"));
    let tables = ok(&mut h, json!({"op": "list_tables"}));
    assert_eq!(tables["database"], json!("default (1)"));
    assert_eq!(tables["tables"].as_array().unwrap().len(), 2);

    let backup = dir.path().join("backups").join("copy.json");
    ok(&mut h, json!({"op": "save", "name": "default", "path": backup}));
    assert!(backup.exists());

    let loaded = ok(&mut h, json!({"op": "load", "name": "restored", "path": backup}));
    assert_eq!(loaded["active"], json!("restored"));
    assert_eq!(loaded["tables"], json!(["A", "B"]));

    assert_eq!(
        fail(&mut h, json!({"op": "import_database", "name": "x", "data": [1]})),
        "TDB_STORAGE_MALFORMED"
    );
}

#[test]
fn test_corrupt_database_file_is_replaced_by_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("default.json"), "not json at all").unwrap();

    let mut h = open(&dir);
    let tables = ok(&mut h, json!({"op": "list_tables"}));
    assert_eq!(tables, json!({"database": "default", "tables": []}));
}

#[test]
fn test_autosave_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        autosave: false,
        ..Config::with_storage_dir(dir.path())
    };
    let mut h = ApiHandler::new(Catalog::open(config).unwrap());
    ok(&mut h, json!({"op": "create_table", "name": "t", "schema": [["v", "real"]]}));
    assert!(!dir.path().join("default.json").exists());

    let saved = ok(&mut h, json!({"op": "save"}));
    assert_eq!(saved["database"], json!("default"));
    assert!(dir.path().join("default.json").exists());
}
