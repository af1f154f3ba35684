//! Table: a named, ordered schema plus an ordered list of validated rows

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::errors::{TableError, TableResult};
use crate::schema::{Column, ColumnType, SchemaSignature, TypeValidator};

use super::row::Row;

/// A named table.
///
/// Rows change only through `add_row`, `update_row` and `remove_row`; each
/// of them validates first and mutates only on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableDocument")]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

/// Stored shape of a table, before rows are decoded against the columns
#[derive(Deserialize)]
struct TableDocument {
    name: String,
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Map<String, JsonValue>>,
}

impl TryFrom<TableDocument> for Table {
    type Error = TableError;

    fn try_from(doc: TableDocument) -> Result<Self, Self::Error> {
        let rows = doc
            .rows
            .iter()
            .map(|data| Row::from_json(data, &doc.columns))
            .collect::<TableResult<Vec<_>>>()
            .map_err(|e| match e {
                TableError::Malformed(msg) => {
                    TableError::Malformed(format!("table '{}': {}", doc.name, msg))
                }
                other => other,
            })?;

        Ok(Table {
            name: doc.name,
            columns: doc.columns,
            rows,
        })
    }
}

impl Table {
    /// Creates an empty table.
    ///
    /// Column names are expected to be unique already; `Database::create_table`
    /// checks that before calling here.
    pub fn from_schema(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row without validation. Only for values taken from rows
    /// that were already validated.
    pub(crate) fn push_row_unchecked(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `(name, type)` pairs in column order
    pub fn schema(&self) -> Vec<(&str, ColumnType)> {
        self.columns
            .iter()
            .map(|c| (c.name(), c.column_type()))
            .collect()
    }

    pub fn column_types(&self) -> HashMap<&str, ColumnType> {
        self.columns
            .iter()
            .map(|c| (c.name(), c.column_type()))
            .collect()
    }

    /// Validates and appends a row, returning the stored row.
    pub fn add_row(&mut self, values: &Map<String, JsonValue>) -> TableResult<&Row> {
        let row = TypeValidator::validate_row(&self.columns, values)?;
        self.rows.push(row);
        Ok(&self.rows[self.rows.len() - 1])
    }

    /// Validates and replaces the row at `index`.
    pub fn update_row(&mut self, index: usize, values: &Map<String, JsonValue>) -> TableResult<&Row> {
        self.check_index(index)?;
        let row = TypeValidator::validate_row(&self.columns, values)?;
        self.rows[index] = row;
        Ok(&self.rows[index])
    }

    /// Removes and returns the row at `index`.
    pub fn remove_row(&mut self, index: usize) -> TableResult<Row> {
        self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    fn check_index(&self, index: usize) -> TableResult<()> {
        if index >= self.rows.len() {
            return Err(TableError::RowIndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    /// Row values as plain mappings, in insertion order
    pub fn get_rows(&self) -> Vec<Map<String, JsonValue>> {
        self.rows.iter().map(Row::to_json).collect()
    }

    pub fn schema_signature(&self) -> SchemaSignature {
        SchemaSignature::from_columns(&self.columns)
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "name": self.name,
            "columns": self.columns.iter().map(Column::to_json).collect::<Vec<_>>(),
            "rows": self.get_rows(),
        })
    }

    pub fn from_json(data: &JsonValue) -> TableResult<Self> {
        let doc = TableDocument::deserialize(data)
            .map_err(|e| TableError::Malformed(format!("table: {}", e)))?;
        Table::try_from(doc)
    }
}
