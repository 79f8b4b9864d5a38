//! nodes table queries.

use rivers_core::types::Confluence;
use rivers_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension};

use crate::sqlite_err;

fn node_from_row(row: &rusqlite::Row<'_>) -> Result<Confluence, rusqlite::Error> {
    Ok(Confluence {
        id: row.get(0)?,
        x: row.get(1)?,
        y: row.get(2)?,
        basin_id: row.get(3)?,
    })
}

/// Insert a batch of confluences, replacing rows that share an id.
pub fn insert_nodes(conn: &Connection, nodes: &[Confluence]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO nodes (id, x, y, basin_id)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sqlite_err)?;

    let mut count = 0;
    for node in nodes {
        stmt.execute(params![node.id, node.x, node.y, node.basin_id])
            .map_err(sqlite_err)?;
        count += 1;
    }
    Ok(count)
}

/// Load the full node set.
pub fn load_nodes(conn: &Connection) -> Result<Vec<Confluence>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, x, y, basin_id FROM nodes ORDER BY id")
        .map_err(sqlite_err)?;

    let rows = stmt.query_map([], node_from_row).map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Get a single confluence by id.
pub fn get_node(conn: &Connection, id: i64) -> Result<Option<Confluence>, StorageError> {
    conn.query_row(
        "SELECT id, x, y, basin_id FROM nodes WHERE id = ?1",
        params![id],
        node_from_row,
    )
    .optional()
    .map_err(sqlite_err)
}

/// Highest node id currently in the set. Seeds the synthetic id counter.
pub fn max_node_id(conn: &Connection) -> Result<Option<i64>, StorageError> {
    conn.query_row("SELECT MAX(id) FROM nodes", [], |row| row.get(0))
        .map_err(sqlite_err)
}

/// Assign a basin to a set of confluences.
pub fn set_basin(conn: &Connection, basin_id: i64, ids: &[i64]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached("UPDATE nodes SET basin_id = ?1 WHERE id = ?2")
        .map_err(sqlite_err)?;

    let mut count = 0;
    for id in ids {
        count += stmt.execute(params![basin_id, id]).map_err(sqlite_err)?;
    }
    Ok(count)
}

/// Delete confluences that were never assigned to a basin.
pub fn delete_unlabeled_nodes(conn: &Connection) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM nodes WHERE basin_id = -1", [])
        .map_err(sqlite_err)
}

/// Remove every node row (stage rewrite).
pub fn clear_nodes(conn: &Connection) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM nodes", []).map_err(sqlite_err)
}

/// Count node rows.
pub fn count_nodes(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
        .map_err(sqlite_err)
}
