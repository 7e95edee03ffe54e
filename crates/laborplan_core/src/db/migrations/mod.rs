//! Schema migrations for the planning database.
//!
//! Migrations run in one transaction; the database either reaches
//! [`latest_version`] or keeps its previous `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "plan_day_indexes",
        sql: include_str!("0002_plan_day_indexes.sql"),
    },
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file was written by a
///   newer build.
/// - [`DbError::Migration`] naming the step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        let step = |source| DbError::Migration {
            version: migration.version,
            source,
        };
        tx.execute_batch(migration.sql).map_err(step)?;
        tx.pragma_update(None, "user_version", migration.version)
            .map_err(step)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}
