//! Observable events
//!
//! Events are explicit and typed; each one has a stable name and a default
//! severity.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Catalog lifecycle
    CatalogOpened,
    DatabaseCreated,
    DatabaseLoaded,
    /// A database file could not be read and an empty database was used
    DatabaseLoadFallback,
    DatabaseSaved,
    DatabaseSwitched,
    DatabaseDropped,
    DatabaseRenamed,
    DatabaseImported,
    /// Saving after a table change failed; the change stays in memory
    AutosaveFailed,
    /// A best-effort file cleanup failed
    FileCleanupFailed,

    // Table operations
    TableCreated,
    TableDropped,
    UnionCompleted,

    // Request processing
    RequestHandled,
    RequestRejected,
    SessionStart,
    SessionEnd,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CatalogOpened => "CATALOG_OPENED",
            Event::DatabaseCreated => "DATABASE_CREATED",
            Event::DatabaseLoaded => "DATABASE_LOADED",
            Event::DatabaseLoadFallback => "DATABASE_LOAD_FALLBACK",
            Event::DatabaseSaved => "DATABASE_SAVED",
            Event::DatabaseSwitched => "DATABASE_SWITCHED",
            Event::DatabaseDropped => "DATABASE_DROPPED",
            Event::DatabaseRenamed => "DATABASE_RENAMED",
            Event::DatabaseImported => "DATABASE_IMPORTED",
            Event::AutosaveFailed => "AUTOSAVE_FAILED",
            Event::FileCleanupFailed => "FILE_CLEANUP_FAILED",
            Event::TableCreated => "TABLE_CREATED",
            Event::TableDropped => "TABLE_DROPPED",
            Event::UnionCompleted => "UNION_COMPLETED",
            Event::RequestHandled => "REQUEST_HANDLED",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::SessionStart => "SESSION_START",
            Event::SessionEnd => "SESSION_END",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::DatabaseLoadFallback
            | Event::AutosaveFailed
            | Event::FileCleanupFailed
            | Event::RequestRejected => Severity::Warn,
            Event::DatabaseSaved => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
