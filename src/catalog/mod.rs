//! Catalog subsystem
//!
//! Owns several databases on disk and tracks which one is active. This is
//! the layer that logs, writes files atomically and recovers from corrupt
//! database files; the table core does none of that.

mod catalog;

pub use catalog::{Catalog, DatabaseListing};
