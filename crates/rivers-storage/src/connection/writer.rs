//! Transaction helper for stage rewrites.

use rivers_core::errors::StorageError;
use rusqlite::Connection;

use crate::sqlite_err;

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
///
/// IMMEDIATE acquires the write lock up front, so a stage rewrite never
/// fails midway with SQLITE_BUSY. The wrapping `Transaction` rolls back
/// automatically if the closure errors.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
{
    conn.execute_batch("BEGIN IMMEDIATE").map_err(sqlite_err)?;

    // The BEGIN above already holds the transaction; unchecked_transaction
    // only wraps it for auto-rollback on drop.
    let tx = conn.unchecked_transaction().map_err(sqlite_err)?;

    let result = f(&tx)?;

    tx.commit().map_err(sqlite_err)?;
    Ok(result)
}
