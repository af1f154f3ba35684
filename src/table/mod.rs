//! Table subsystem
//!
//! Tables own their columns and rows. Every row written through the public
//! API is validated by [`crate::schema::TypeValidator`] first.

mod row;
mod table;

pub use row::Row;
pub use table::Table;
