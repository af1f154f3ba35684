//! API request types
//!
//! JSON request parsing for all supported operations.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::schema::ColumnSpec;

use super::errors::{ApiError, ApiResult};

/// Every accepted value of the `op` field
pub const OPERATIONS: &[&str] = &[
    "create_table",
    "drop_table",
    "list_tables",
    "view_table",
    "insert_row",
    "update_row",
    "delete_row",
    "union",
    "list_databases",
    "create_database",
    "switch_database",
    "delete_database",
    "rename_database",
    "save",
    "load",
    "export",
    "import_database",
];

/// Unified request envelope, tagged by `op`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    CreateTable {
        name: String,
        schema: Vec<ColumnSpec>,
    },
    DropTable {
        name: String,
    },
    ListTables,
    ViewTable {
        name: String,
    },
    InsertRow {
        table: String,
        values: Map<String, Value>,
    },
    UpdateRow {
        table: String,
        row_index: usize,
        values: Map<String, Value>,
    },
    DeleteRow {
        table: String,
        row_index: usize,
    },
    Union {
        left: String,
        right: String,
        #[serde(default)]
        name: Option<String>,
    },
    ListDatabases,
    CreateDatabase {
        name: String,
    },
    SwitchDatabase {
        name: String,
    },
    DeleteDatabase {
        name: String,
    },
    /// `old` defaults to the active database
    RenameDatabase {
        #[serde(default)]
        old: Option<String>,
        new: String,
    },
    /// Without `path` the database is written to its catalog file
    Save {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Load {
        name: String,
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Export {
        #[serde(default)]
        name: Option<String>,
    },
    ImportDatabase {
        name: String,
        data: Value,
    },
}

impl Request {
    /// Parse a request from JSON string
    pub fn parse(json: &str) -> ApiResult<Self> {
        let raw: Value = serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e)))?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> ApiResult<Self> {
        let op = raw
            .as_object()
            .ok_or_else(|| ApiError::invalid_request("Request must be a JSON object"))?
            .get("op")
            .ok_or_else(|| ApiError::invalid_request("Missing op"))?
            .as_str()
            .ok_or_else(|| ApiError::invalid_request("op must be a string"))?;

        if !OPERATIONS.contains(&op) {
            return Err(ApiError::unknown_operation(op));
        }

        serde_json::from_value(raw).map_err(|e| ApiError::invalid_request(e.to_string()))
    }

    /// The `op` name this request was parsed from
    pub fn op(&self) -> &'static str {
        match self {
            Request::CreateTable { .. } => "create_table",
            Request::DropTable { .. } => "drop_table",
            Request::ListTables => "list_tables",
            Request::ViewTable { .. } => "view_table",
            Request::InsertRow { .. } => "insert_row",
            Request::UpdateRow { .. } => "update_row",
            Request::DeleteRow { .. } => "delete_row",
            Request::Union { .. } => "union",
            Request::ListDatabases => "list_databases",
            Request::CreateDatabase { .. } => "create_database",
            Request::SwitchDatabase { .. } => "switch_database",
            Request::DeleteDatabase { .. } => "delete_database",
            Request::RenameDatabase { .. } => "rename_database",
            Request::Save { .. } => "save",
            Request::Load { .. } => "load",
            Request::Export { .. } => "export",
            Request::ImportDatabase { .. } => "import_database",
        }
    }

    /// Whether the request changes the active database's tables
    pub fn mutates_tables(&self) -> bool {
        matches!(
            self,
            Request::CreateTable { .. }
                | Request::DropTable { .. }
                | Request::InsertRow { .. }
                | Request::UpdateRow { .. }
                | Request::DeleteRow { .. }
                | Request::Union { .. }
        )
    }
}
