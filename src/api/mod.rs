//! API Layer for tabledb
//!
//! One JSON request object in, one JSON response object out.
//!
//! # Design Principles
//!
//! - One request at a time against a single owned catalog
//! - Error codes passed through unchanged
//! - Requests are logged as handled or rejected, never partially applied
//!
//! # Supported Operations
//!
//! - create_table, drop_table, list_tables, view_table
//! - insert_row, update_row, delete_row
//! - union
//! - list_databases, create_database, switch_database, delete_database,
//!   rename_database
//! - save, load, export, import_database

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiErrorCode, ApiResult};
pub use handler::ApiHandler;
pub use request::{Request, OPERATIONS};
pub use response::{ErrorResponse, Response, SuccessResponse};
