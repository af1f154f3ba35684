//! Observability for tabledb
//!
//! Structured JSON logging of typed lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No async or background threads
//! 3. Deterministic output
//! 4. The table core never logs; the catalog, API and CLI layers do
//!
//! # Usage
//!
//! ```ignore
//! use tabledb::observability::{Event, Logger};
//!
//! Logger::event(Event::TableCreated, &[("table", "users")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
