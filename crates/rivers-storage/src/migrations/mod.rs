//! Schema migrations, applied in order and tracked via `user_version`.

pub mod v001_initial;
pub mod v002_metrics;

use rivers_core::errors::StorageError;
use rusqlite::Connection;
use tracing::debug;

use crate::sqlite_err;

const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_initial::MIGRATION_SQL),
    (2, v002_metrics::MIGRATION_SQL),
];

/// Apply all migrations newer than the database's `user_version`.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(sqlite_err)?;

    for &(version, sql) in MIGRATIONS {
        if version <= current {
            continue;
        }
        debug!(version, "applying migration");
        conn.execute_batch(sql)
            .map_err(|e| StorageError::MigrationError {
                version,
                message: e.to_string(),
            })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| StorageError::MigrationError {
                version,
                message: e.to_string(),
            })?;
    }
    Ok(())
}
