//! Error types for the table core
//!
//! Error kinds:
//! - Schema (duplicate column, unsupported type tag)
//! - NotFound (unknown table or database)
//! - AlreadyExists (table or database name collision)
//! - Validation (value normalization, missing or unexpected row key)
//! - Index (row position out of range)
//! - Incompatibility (union over a shared column with differing types)
//! - Storage (file I/O, malformed documents)
//!
//! Every error carries enough context (column, value, types) for a caller to
//! build its own message. Codes follow the `TDB_<CATEGORY>_<NAME>` format.

use std::fmt;

use thiserror::Error;

use crate::schema::ColumnType;

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Coarse error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    NotFound,
    AlreadyExists,
    Validation,
    Index,
    Incompatibility,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Schema => "SCHEMA",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Index => "INDEX",
            ErrorKind::Incompatibility => "INCOMPATIBILITY",
            ErrorKind::Storage => "STORAGE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason a single value failed normalization.
///
/// Carries no column context; [`TableError::InvalidValue`] adds it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("boolean is not accepted as {0}")]
    Boolean(ColumnType),

    #[error("not a valid integer")]
    InvalidInteger,

    #[error("integer out of range")]
    IntegerOverflow,

    #[error("not a valid real")]
    InvalidReal,

    #[error("char must be a string")]
    CharNotString,

    #[error("char must be exactly one character, got {0}")]
    CharLength(usize),

    #[error("invalid date format, expected YYYY-MM-DD")]
    InvalidDate,

    #[error("invalid date value")]
    DateNotString,

    #[error("invalid dateInterval, expected {{start,end}}, [start,end] or 'start..end'")]
    IntervalShape,

    #[error("dateInterval start {start} is after end {end}")]
    IntervalOrder { start: String, end: String },
}

/// Table core error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    // ==================
    // Schema
    // ==================
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    // ==================
    // NotFound
    // ==================
    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    #[error("Database '{0}' does not exist")]
    DatabaseNotFound(String),

    // ==================
    // AlreadyExists
    // ==================
    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Database '{0}' already exists")]
    DatabaseExists(String),

    // ==================
    // Validation
    // ==================
    #[error("Unexpected columns: {0:?}")]
    UnexpectedColumns(Vec<String>),

    #[error("Missing value for column '{0}'")]
    MissingValue(String),

    #[error("Invalid value {value} for column '{column}' ({expected}): {source}")]
    InvalidValue {
        column: String,
        expected: ColumnType,
        value: String,
        #[source]
        source: ValueError,
    },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Cannot delete database '{0}': it is the only database")]
    LastDatabase(String),

    // ==================
    // Index
    // ==================
    #[error("Row index {index} out of range for table with {len} rows")]
    RowIndexOutOfRange { index: usize, len: usize },

    // ==================
    // Incompatibility
    // ==================
    #[error("Incompatible schema for column '{column}': {left} vs {right}")]
    IncompatibleSchema {
        column: String,
        left: ColumnType,
        right: ColumnType,
    },

    // ==================
    // Storage
    // ==================
    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Malformed database document: {0}")]
    Malformed(String),
}

impl TableError {
    pub(crate) fn io(path: impl fmt::Display, err: std::io::Error) -> Self {
        TableError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::DuplicateColumn(_) | TableError::UnsupportedType(_) => ErrorKind::Schema,
            TableError::TableNotFound(_) | TableError::DatabaseNotFound(_) => ErrorKind::NotFound,
            TableError::TableExists(_) | TableError::DatabaseExists(_) => ErrorKind::AlreadyExists,
            TableError::UnexpectedColumns(_)
            | TableError::MissingValue(_)
            | TableError::InvalidValue { .. }
            | TableError::InvalidName(_)
            | TableError::LastDatabase(_) => ErrorKind::Validation,
            TableError::RowIndexOutOfRange { .. } => ErrorKind::Index,
            TableError::IncompatibleSchema { .. } => ErrorKind::Incompatibility,
            TableError::Io { .. } | TableError::Malformed(_) => ErrorKind::Storage,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::DuplicateColumn(_) => "TDB_SCHEMA_DUPLICATE_COLUMN",
            TableError::UnsupportedType(_) => "TDB_SCHEMA_UNSUPPORTED_TYPE",
            TableError::TableNotFound(_) => "TDB_TABLE_NOT_FOUND",
            TableError::DatabaseNotFound(_) => "TDB_DATABASE_NOT_FOUND",
            TableError::TableExists(_) => "TDB_TABLE_EXISTS",
            TableError::DatabaseExists(_) => "TDB_DATABASE_EXISTS",
            TableError::UnexpectedColumns(_)
            | TableError::MissingValue(_)
            | TableError::InvalidValue { .. } => "TDB_VALIDATION_FAILED",
            TableError::InvalidName(_) => "TDB_INVALID_NAME",
            TableError::LastDatabase(_) => "TDB_LAST_DATABASE",
            TableError::RowIndexOutOfRange { .. } => "TDB_ROW_INDEX_OUT_OF_RANGE",
            TableError::IncompatibleSchema { .. } => "TDB_INCOMPATIBLE_SCHEMA",
            TableError::Io { .. } => "TDB_STORAGE_IO",
            TableError::Malformed(_) => "TDB_STORAGE_MALFORMED",
        }
    }
}
