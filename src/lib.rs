//! tabledb - typed in-memory tables with schema-reconciling unions
//!
//! The core (`schema`, `table`, `union`, `database`) is synchronous and
//! never logs or touches the filesystem except through explicit
//! save/load calls. `catalog`, `api` and `cli` build a file-backed,
//! multi-database service on top of it.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod schema;
pub mod table;
pub mod union;
pub mod value;

pub use database::Database;
pub use errors::{ErrorKind, TableError, TableResult, ValueError};
pub use schema::{Column, ColumnSpec, ColumnType, TypeValidator};
pub use table::{Row, Table};
pub use union::{union_tables, union_tables_as};
pub use value::{DateInterval, Value};
