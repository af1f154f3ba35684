//! Database: a named registry of tables with whole-document JSON persistence
//!
//! Document format:
//!
//! ```json
//! {"name": "db", "tables": [{"name": "t", "columns": [...], "rows": [...]}]}
//! ```
//!
//! Loading trusts the document: rows are decoded by column type but not
//! normalized again. `save` writes the whole document in one pass with no
//! partial-write recovery; the catalog layer provides atomic replacement.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};

use crate::errors::{TableError, TableResult};
use crate::schema::{normalize_schema, ColumnSpec};
use crate::table::{Row, Table};
use crate::union::{union_name, union_tables_as};

/// Default cap on generated table names
pub const MAX_TABLE_NAME_LEN: usize = 60;

fn default_database_name() -> String {
    "database".to_string()
}

#[derive(Deserialize)]
struct DatabaseDocument {
    #[serde(default = "default_database_name")]
    name: String,
    #[serde(default)]
    tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Database {
    name: String,
    tables: BTreeMap<String, Table>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Creates and registers an empty table.
    ///
    /// The schema accepts `(name, type)` pairs or [`ColumnSpec`] records.
    ///
    /// # Errors
    ///
    /// - `TableExists` if `name` is already registered
    /// - `DuplicateColumn` / `UnsupportedType` for a bad schema
    pub fn create_table<I, S>(&mut self, name: &str, schema: I) -> TableResult<&Table>
    where
        I: IntoIterator<Item = S>,
        S: Into<ColumnSpec>,
    {
        if self.tables.contains_key(name) {
            return Err(TableError::TableExists(name.to_string()));
        }
        let columns = normalize_schema(schema)?;
        let table = Table::from_schema(name, columns);
        Ok(self.tables.entry(name.to_string()).or_insert(table))
    }

    pub fn drop_table(&mut self, name: &str) -> TableResult<Table> {
        self.tables
            .remove(name)
            .ok_or_else(|| TableError::TableNotFound(name.to_string()))
    }

    pub fn get_table(&self, name: &str) -> TableResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| TableError::TableNotFound(name.to_string()))
    }

    fn get_table_mut(&mut self, name: &str) -> TableResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| TableError::TableNotFound(name.to_string()))
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn insert_row(&mut self, table: &str, values: &Map<String, JsonValue>) -> TableResult<&Row> {
        self.get_table_mut(table)?.add_row(values)
    }

    pub fn edit_row(
        &mut self,
        table: &str,
        index: usize,
        values: &Map<String, JsonValue>,
    ) -> TableResult<&Row> {
        self.get_table_mut(table)?.update_row(index, values)
    }

    pub fn delete_row(&mut self, table: &str, index: usize) -> TableResult<Row> {
        self.get_table_mut(table)?.remove_row(index)
    }

    /// Per-table listing: name, columns, row count and rows
    pub fn summaries(&self) -> Vec<JsonValue> {
        self.tables
            .values()
            .map(|t| {
                let doc = t.to_json();
                json!({
                    "name": t.name(),
                    "columns": doc["columns"],
                    "rowCount": t.row_count(),
                    "rows": doc["rows"],
                })
            })
            .collect()
    }

    /// Unions two registered tables and registers the result.
    ///
    /// See [`Database::union_with_limit`].
    pub fn union(&mut self, left: &str, right: &str, requested: Option<&str>) -> TableResult<&Table> {
        self.union_with_limit(left, right, requested, MAX_TABLE_NAME_LEN)
    }

    /// Unions two registered tables and registers the result under a unique
    /// name derived from `requested` (or `{left}_UNION_{right}`), trimmed and
    /// capped at `max_len` characters. Collisions get a ` (n)` suffix.
    pub fn union_with_limit(
        &mut self,
        left: &str,
        right: &str,
        requested: Option<&str>,
        max_len: usize,
    ) -> TableResult<&Table> {
        let left = self.get_table(left)?;
        let right = self.get_table(right)?;

        let base = match requested {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => union_name(left, right),
        };
        let name = self.unique_table_name(&base, max_len);
        let result = union_tables_as(left, right, name.clone())?;

        Ok(self.tables.entry(name).or_insert(result))
    }

    /// Picks a free table name: `base` capped at `max_len` characters, or
    /// `base (n)` with the smallest free `n`, shortening `base` so the whole
    /// name still fits.
    pub fn unique_table_name(&self, base: &str, max_len: usize) -> String {
        let base = truncate_chars(base, max_len);
        let mut name = base.clone();
        let mut counter = 1;
        while self.tables.contains_key(&name) {
            let suffix = format!(" ({})", counter);
            let max_base = max_len.saturating_sub(suffix.chars().count());
            name = format!("{}{}", truncate_chars(&base, max_base), suffix);
            counter += 1;
        }
        name
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "name": self.name,
            "tables": self.tables.values().map(Table::to_json).collect::<Vec<_>>(),
        })
    }

    pub fn from_json(data: &JsonValue) -> TableResult<Self> {
        let doc = DatabaseDocument::deserialize(data).map_err(|e| TableError::Malformed(e.to_string()))?;
        let mut db = Database::new(doc.name);
        for table in doc.tables {
            db.tables.insert(table.name().to_string(), table);
        }
        Ok(db)
    }

    /// Writes the document, pretty-printed, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> TableResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TableError::io(parent.display(), e))?;
        }

        let file = File::create(path).map_err(|e| TableError::io(path.display(), e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .map_err(|e| TableError::io(path.display(), e))
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &self.to_json())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    pub fn load(path: impl AsRef<Path>) -> TableResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TableError::io(path.display(), e))?;
        let data: JsonValue = serde_json::from_str(&content)
            .map_err(|e| TableError::Malformed(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&data)
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
