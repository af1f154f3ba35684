//! Column and schema type definitions
//!
//! Supported column types:
//! - integer: 64-bit signed integer
//! - real: 64-bit floating point
//! - char: exactly one character
//! - string: UTF-8 string
//! - date: ISO-8601 calendar date (YYYY-MM-DD)
//! - dateInterval: ordered pair of dates {start, end}

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::errors::{TableError, TableResult};

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "String")]
pub enum ColumnType {
    Integer,
    Real,
    Char,
    String,
    Date,
    DateInterval,
}

impl ColumnType {
    pub const ALL: [ColumnType; 6] = [
        ColumnType::Integer,
        ColumnType::Real,
        ColumnType::Char,
        ColumnType::String,
        ColumnType::Date,
        ColumnType::DateInterval,
    ];

    /// Returns the type tag used in documents and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Char => "char",
            ColumnType::String => "string",
            ColumnType::Date => "date",
            ColumnType::DateInterval => "dateInterval",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integer" => Ok(ColumnType::Integer),
            "real" => Ok(ColumnType::Real),
            "char" => Ok(ColumnType::Char),
            "string" => Ok(ColumnType::String),
            "date" => Ok(ColumnType::Date),
            // "dateInvl" is the legacy tag found in older database files
            "dateInterval" | "dateInvl" => Ok(ColumnType::DateInterval),
            other => Err(TableError::UnsupportedType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ColumnType {
    type Error = TableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An immutable (name, type) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Encodes as `{name, type}`
    pub fn to_json(&self) -> JsonValue {
        json!({ "name": self.name, "type": self.column_type.as_str() })
    }

    pub fn from_json(value: &JsonValue) -> TableResult<Self> {
        Column::deserialize(value).map_err(|e| TableError::Malformed(format!("column: {}", e)))
    }
}

/// Untyped schema entry as supplied by callers.
///
/// Accepts both `{"name": .., "type": ..}` records and `[name, type]` pairs.
/// The type tag is checked when the schema is normalized, not here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ColumnSpecRepr")]
pub struct ColumnSpec {
    pub name: String,
    pub type_name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnSpecRepr {
    Record {
        name: String,
        #[serde(rename = "type")]
        type_name: String,
    },
    Pair(String, String),
}

impl From<ColumnSpecRepr> for ColumnSpec {
    fn from(repr: ColumnSpecRepr) -> Self {
        match repr {
            ColumnSpecRepr::Record { name, type_name } | ColumnSpecRepr::Pair(name, type_name) => {
                ColumnSpec { name, type_name }
            }
        }
    }
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

impl<N: Into<String>, T: Into<String>> From<(N, T)> for ColumnSpec {
    fn from((name, type_name): (N, T)) -> Self {
        ColumnSpec::new(name, type_name)
    }
}

impl From<Column> for ColumnSpec {
    fn from(column: Column) -> Self {
        ColumnSpec::new(column.name, column.column_type.as_str())
    }
}

/// Normalizes caller-supplied schema entries into columns.
///
/// Rejects duplicate column names and unsupported type tags.
pub fn normalize_schema<I, S>(specs: I) -> TableResult<Vec<Column>>
where
    I: IntoIterator<Item = S>,
    S: Into<ColumnSpec>,
{
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    for spec in specs {
        let spec = spec.into();
        if !seen.insert(spec.name.clone()) {
            return Err(TableError::DuplicateColumn(spec.name));
        }
        let column_type: ColumnType = spec.type_name.parse()?;
        columns.push(Column::new(spec.name, column_type));
    }

    Ok(columns)
}

/// Order-preserving, hashable view of a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaSignature(Vec<(String, ColumnType)>);

impl SchemaSignature {
    pub fn from_columns(columns: &[Column]) -> Self {
        SchemaSignature(
            columns
                .iter()
                .map(|c| (c.name.clone(), c.column_type))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[(String, ColumnType)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
