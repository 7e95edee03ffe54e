//! Host-supplied engine configuration.
//!
//! # Responsibility
//! - Bundle the database path and logging settings a host passes to the
//!   engine.
//! - Read them from `LABORPLAN_*` environment variables with defaults.
//!
//! # Invariants
//! - The engine itself never reads the environment; hosts build a
//!   `CoreConfig` and pass its values explicitly.

use crate::db::{open_db, DbResult};
use crate::logging::{default_log_level, init_logging};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "LABORPLAN_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "LABORPLAN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LABORPLAN_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "laborplan.sqlite3";

/// Database and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `LABORPLAN_DB_PATH`, `LABORPLAN_LOG_LEVEL` and
    /// `LABORPLAN_LOG_DIR`; blank or missing values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        config
    }

    /// Starts file logging when `log_dir` is set.
    pub fn init_logging(&self) -> Result<(), String> {
        match &self.log_dir {
            Some(dir) => {
                let dir = dir
                    .to_str()
                    .ok_or_else(|| format!("log_dir `{}` is not valid UTF-8", dir.display()))?;
                init_logging(&self.log_level, dir)
            }
            None => Ok(()),
        }
    }

    /// Opens and migrates the configured database.
    pub fn open_db(&self) -> DbResult<Connection> {
        open_db(&self.db_path)
    }
}
