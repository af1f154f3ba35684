//! File-backed registry of databases
//!
//! One `<name>.json` file per database under the configured storage
//! directory. Exactly one database is active at a time. All mutation goes
//! through `&mut self`, so a catalog has a single writer.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::database::Database;
use crate::errors::{TableError, TableResult};
use crate::observability::{Event, Logger};

/// Result of [`Catalog::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseListing {
    pub active: String,
    /// Most recently written first
    pub databases: Vec<String>,
}

pub struct Catalog {
    config: Config,
    databases: BTreeMap<String, Database>,
    active: String,
}

impl Catalog {
    /// Opens the storage directory, loading every database file in it.
    ///
    /// Creates the directory when missing and makes sure the default
    /// database exists and is active.
    pub fn open(config: Config) -> TableResult<Self> {
        let dir = config.storage_dir.clone();
        fs::create_dir_all(&dir).map_err(|e| TableError::io(dir.display(), e))?;

        let mut catalog = Self {
            active: config.default_database.clone(),
            config,
            databases: BTreeMap::new(),
        };

        let entries = fs::read_dir(&dir).map_err(|e| TableError::io(dir.display(), e))?;
        for entry in entries {
            let path = entry.map_err(|e| TableError::io(dir.display(), e))?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                let db = catalog.load_or_create(name);
                catalog.databases.insert(name.to_string(), db);
            }
        }

        let default = catalog.config.default_database.clone();
        if !catalog.databases.contains_key(&default) {
            let db = catalog.load_or_create(&default);
            catalog.databases.insert(default, db);
        }

        let count = catalog.databases.len().to_string();
        Logger::event(
            Event::CatalogOpened,
            &[
                ("databases", count.as_str()),
                ("storage_dir", &dir.display().to_string()),
            ],
        );

        Ok(catalog)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.config.storage_dir.join(format!("{}.json", name))
    }

    /// Loads `<name>.json`, or returns an empty database when the file is
    /// missing or unreadable.
    pub fn load_or_create(&self, name: &str) -> Database {
        let path = self.path_for(name);
        if !path.exists() {
            return Database::new(name);
        }

        match Database::load(&path) {
            Ok(mut db) => {
                db.set_name(name);
                Logger::event(Event::DatabaseLoaded, &[("database", name)]);
                db
            }
            Err(e) => {
                Logger::event(
                    Event::DatabaseLoadFallback,
                    &[("database", name), ("error", &e.to_string())],
                );
                Database::new(name)
            }
        }
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    pub fn active(&self) -> TableResult<&Database> {
        self.get(&self.active)
    }

    pub fn active_mut(&mut self) -> TableResult<&mut Database> {
        let name = self.active.clone();
        self.get_mut(&name)
    }

    pub fn get(&self, name: &str) -> TableResult<&Database> {
        self.databases
            .get(name)
            .ok_or_else(|| TableError::DatabaseNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> TableResult<&mut Database> {
        self.databases
            .get_mut(name)
            .ok_or_else(|| TableError::DatabaseNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    /// Active database plus all names, most recently written first.
    ///
    /// Databases without a file count as newest.
    pub fn list(&self) -> DatabaseListing {
        let mut names: Vec<(Reverse<SystemTime>, &String)> = self
            .databases
            .keys()
            .map(|name| {
                let path = self.path_for(name);
                let modified = if path.exists() {
                    fs::metadata(&path)
                        .and_then(|m| m.modified())
                        .unwrap_or(SystemTime::UNIX_EPOCH)
                } else {
                    SystemTime::now()
                };
                (Reverse(modified), name)
            })
            .collect();
        names.sort();

        DatabaseListing {
            active: self.active.clone(),
            databases: names.into_iter().map(|(_, name)| name.clone()).collect(),
        }
    }

    /// Registers, activates and saves a new database.
    ///
    /// An existing file of that name is loaded rather than overwritten.
    pub fn create_database(&mut self, name: &str) -> TableResult<&Database> {
        check_name(name)?;
        if self.contains(name) {
            return Err(TableError::DatabaseExists(name.to_string()));
        }

        let db = self.load_or_create(name);
        self.databases.insert(name.to_string(), db);
        self.active = name.to_string();
        self.save_database(name)?;

        Logger::event(Event::DatabaseCreated, &[("database", name)]);
        self.get(name)
    }

    /// Activates `name`, loading or creating it when not yet registered.
    pub fn switch_database(&mut self, name: &str) -> TableResult<&Database> {
        check_name(name)?;
        if !self.contains(name) {
            let db = self.load_or_create(name);
            self.databases.insert(name.to_string(), db);
        }
        self.active = name.to_string();

        Logger::event(Event::DatabaseSwitched, &[("database", name)]);
        self.get(name)
    }

    /// Unregisters a database and removes its file.
    ///
    /// When the active database is deleted, the alphabetically first
    /// remaining database becomes active, or the default database is
    /// recreated when none remain.
    pub fn delete_database(&mut self, name: &str) -> TableResult<()> {
        if !self.contains(name) {
            return Err(TableError::DatabaseNotFound(name.to_string()));
        }
        if name == self.config.default_database && self.databases.len() == 1 {
            return Err(TableError::LastDatabase(name.to_string()));
        }

        self.databases.remove(name);
        let path = self.path_for(name);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                Logger::event(
                    Event::FileCleanupFailed,
                    &[("error", &e.to_string()), ("path", &path.display().to_string())],
                );
            }
        }

        if self.active == name {
            match self.databases.keys().next() {
                Some(first) => self.active = first.clone(),
                None => {
                    let default = self.config.default_database.clone();
                    self.databases.insert(default.clone(), Database::new(default.clone()));
                    self.active = default;
                }
            }
        }

        Logger::event(
            Event::DatabaseDropped,
            &[("active", self.active.as_str()), ("database", name)],
        );
        Ok(())
    }

    /// Renames a database and its file, carrying the active marker.
    pub fn rename_database(&mut self, old: &str, new: &str) -> TableResult<()> {
        check_name(new)?;
        if !self.contains(old) {
            return Err(TableError::DatabaseNotFound(old.to_string()));
        }
        if old == new {
            return Ok(());
        }
        if self.contains(new) {
            return Err(TableError::DatabaseExists(new.to_string()));
        }

        let old_path = self.path_for(old);
        let new_path = self.path_for(new);
        if old_path.exists() {
            fs::rename(&old_path, &new_path).map_err(|e| TableError::io(old_path.display(), e))?;
        }

        if let Some(mut db) = self.databases.remove(old) {
            db.set_name(new);
            self.databases.insert(new.to_string(), db);
        }
        if self.active == old {
            self.active = new.to_string();
        }

        Logger::event(Event::DatabaseRenamed, &[("from", old), ("to", new)]);
        Ok(())
    }

    /// Atomically replaces `<name>.json` with the current document.
    pub fn save_database(&self, name: &str) -> TableResult<PathBuf> {
        let db = self.get(name)?;
        let dir = &self.config.storage_dir;
        let path = self.path_for(name);

        fs::create_dir_all(dir).map_err(|e| TableError::io(dir.display(), e))?;
        let tmp = NamedTempFile::new_in(dir).map_err(|e| TableError::io(dir.display(), e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            db.write_to(&mut writer)
                .map_err(|e| TableError::io(tmp.path().display(), e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| TableError::io(tmp.path().display(), e))?;
        tmp.persist(&path)
            .map_err(|e| TableError::io(path.display(), e.error))?;

        Logger::event(Event::DatabaseSaved, &[("database", name)]);
        Ok(path)
    }

    /// Saves `name` to an explicit path.
    pub fn save_database_to(&self, name: &str, path: &Path) -> TableResult<()> {
        self.get(name)?.save(path)
    }

    /// Loads a document from `path`, registers it as `name` and activates it.
    pub fn load_database_from(&mut self, name: &str, path: &Path) -> TableResult<&Database> {
        check_name(name)?;
        let mut db = Database::load(path)?;
        db.set_name(name);
        self.databases.insert(name.to_string(), db);
        self.active = name.to_string();

        Logger::event(
            Event::DatabaseLoaded,
            &[("database", name), ("path", &path.display().to_string())],
        );
        self.get(name)
    }

    pub fn export(&self, name: &str) -> TableResult<JsonValue> {
        Ok(self.get(name)?.to_json())
    }

    /// Imports a database document under a free name derived from `name`.
    ///
    /// `data` is either a JSON object or a string holding one. Returns the
    /// name the database was registered under.
    pub fn import_database(&mut self, name: &str, data: &JsonValue) -> TableResult<String> {
        check_name(name)?;
        let parsed;
        let document = match data {
            JsonValue::String(text) => {
                parsed = serde_json::from_str::<JsonValue>(text)
                    .map_err(|_| TableError::Malformed("Invalid JSON data format".into()))?;
                &parsed
            }
            other => other,
        };
        if !document.is_object() {
            return Err(TableError::Malformed("Data must be JSON object or string".into()));
        }

        let mut db = Database::from_json(document)?;
        let final_name = self.unique_database_name(name);
        db.set_name(final_name.as_str());
        self.databases.insert(final_name.clone(), db);
        self.active = final_name.clone();
        self.save_database(&final_name)?;

        Logger::event(
            Event::DatabaseImported,
            &[("database", final_name.as_str()), ("requested", name)],
        );
        Ok(final_name)
    }

    fn unique_database_name(&self, base: &str) -> String {
        let mut name = base.to_string();
        let mut counter = 1;
        while self.contains(&name) {
            name = format!("{} ({})", base, counter);
            counter += 1;
        }
        name
    }
}

fn check_name(name: &str) -> TableResult<()> {
    if name.trim().is_empty() {
        return Err(TableError::InvalidName("database name must not be empty".into()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(TableError::InvalidName(format!(
            "database name '{}' is not a valid file name",
            name
        )));
    }
    Ok(())
}
