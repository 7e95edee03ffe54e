//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//! - Translate storage failures into the engine error taxonomy.
//!
//! # Invariants
//! - Write paths validate their input before any SQL mutation.
//! - Multi-row writes are all-or-nothing: one `IMMEDIATE` transaction each.
//! - Repositories refuse connections whose schema is not fully migrated.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod calendar_repo;
pub mod plan_day_repo;
pub mod plan_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Client-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// Referenced date, employee, plan or period is absent.
    NotFound,
    /// Uniqueness violation.
    Conflict,
    /// Underlying datastore failure.
    Storage,
}

impl ErrorKind {
    /// Stable code used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

/// Engine-wide error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    NotFound(String),
    Conflict(String),
    Db(DbError),
    /// Persisted row cannot be decoded into a model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, message))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Conflict(what) => write!(f, "conflict: {what}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::Conflict(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps a unique-constraint failure to `Conflict`, anything else to `Db`.
pub(crate) fn conflict_or_db(err: rusqlite::Error, what: impl FnOnce() -> String) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::Conflict(what())
    } else {
        err.into()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
        }
        _ => false,
    }
}

/// Checks schema version and required tables before a repository is used.
pub(crate) fn ensure_schema_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

/// Builds `?, ?, ?` for a parameterized `IN (...)` list.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
