//! Connection pragmas for bulk graph loads.

use rivers_core::errors::StorageError;
use rusqlite::Connection;

use crate::sqlite_err;

/// Apply write-connection pragmas.
///
/// WAL keeps readers unblocked during stage rewrites; NORMAL sync is
/// sufficient because every stage can be rerun from the previous one.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;
         PRAGMA cache_size = -65536;",
    )
    .map_err(sqlite_err)
}
