//! Configuration file
//!
//! ```json
//! {
//!   "storage_dir": "databases",
//!   "default_database": "default",
//!   "max_table_name_len": 60,
//!   "autosave": true,
//!   "log_level": "info"
//! }
//! ```
//!
//! Every field is optional. No environment variables are read.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::MAX_TABLE_NAME_LEN;
use crate::observability::Severity;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one `<database>.json` file per database
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    #[serde(default = "default_database")]
    pub default_database: String,

    /// Cap on generated union table names
    #[serde(default = "default_max_table_name_len")]
    pub max_table_name_len: usize,

    /// Persist the active database after every mutating request
    #[serde(default = "default_autosave")]
    pub autosave: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("databases")
}
fn default_database() -> String {
    "default".to_string()
}
fn default_max_table_name_len() -> usize {
    MAX_TABLE_NAME_LEN
}
fn default_autosave() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            default_database: default_database(),
            max_table_name_len: default_max_table_name_len(),
            autosave: default_autosave(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Config rooted at `storage_dir`, everything else defaulted
    pub fn with_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage_dir must not be empty".into()));
        }
        if self.default_database.trim().is_empty() {
            return Err(ConfigError::Invalid("default_database must not be empty".into()));
        }
        if self.max_table_name_len == 0 {
            return Err(ConfigError::Invalid("max_table_name_len must be > 0".into()));
        }
        self.severity()?;
        Ok(())
    }

    pub fn severity(&self) -> Result<Severity, ConfigError> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }
}
