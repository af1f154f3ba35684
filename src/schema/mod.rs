//! Schema subsystem
//!
//! Columns, type tags and the type validator that normalizes every value
//! before it is stored.
//!
//! # Design Principles
//!
//! - Schemas are normalized once, at table creation
//! - Validation happens before any row is stored
//! - Rows are full-replace: every column supplied, nothing extra
//! - A failed validation leaves the table unchanged

mod types;
mod validator;

pub use types::{normalize_schema, Column, ColumnSpec, ColumnType, SchemaSignature};
pub use validator::TypeValidator;
