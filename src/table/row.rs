//! Row storage
//!
//! A row is an ordered mapping from column name to normalized value, kept
//! in its table's column order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::errors::{TableError, TableResult};
use crate::schema::Column;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<(String, Value)>,
}

impl Row {
    pub(crate) fn from_values(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Iterates `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Plain `{column: value}` mapping, not wrapped
    pub fn to_json(&self) -> Map<String, JsonValue> {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }

    /// Decodes a stored row against its table's columns.
    ///
    /// Stored rows are trusted: values are decoded, not normalized, and
    /// columns missing from the document stay missing. A key that names no
    /// column makes the document malformed.
    pub fn from_json(data: &Map<String, JsonValue>, columns: &[Column]) -> TableResult<Self> {
        if let Some(key) = data
            .keys()
            .find(|key| !columns.iter().any(|c| c.name() == key.as_str()))
        {
            return Err(TableError::Malformed(format!("row has unknown column '{}'", key)));
        }

        let mut values = Vec::with_capacity(data.len());
        for column in columns {
            if let Some(raw) = data.get(column.name()) {
                let value = Value::decode(raw, column.column_type()).map_err(|e| {
                    TableError::Malformed(format!("column '{}': {}", column.name(), e))
                })?;
                values.push((column.name().to_string(), value));
            }
        }

        Ok(Self { values })
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
