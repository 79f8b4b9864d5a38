//! edges table queries.

use rivers_core::types::Edge;
use rivers_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::sqlite_err;

fn edge_from_row(row: &rusqlite::Row<'_>) -> Result<Edge, rusqlite::Error> {
    Ok(Edge {
        id: row.get(0)?,
        downstream_id: row.get(1)?,
        length_km: row.get(2)?,
        upstream_area: row.get(3)?,
        strahler_order: row.get(4)?,
    })
}

/// Insert a batch of edges, replacing rows that share an id.
pub fn insert_edges(conn: &Connection, edges: &[Edge]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO edges
             (id, downstream_id, length_km, upstream_area, strahler_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(sqlite_err)?;

    let mut count = 0;
    for edge in edges {
        stmt.execute(params![
            edge.id,
            edge.downstream_id,
            edge.length_km,
            edge.upstream_area,
            edge.strahler_order,
        ])
        .map_err(sqlite_err)?;
        count += 1;
    }
    Ok(count)
}

/// Load the full edge set.
pub fn load_edges(conn: &Connection) -> Result<Vec<Edge>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, downstream_id, length_km, upstream_area, strahler_order
             FROM edges ORDER BY id",
        )
        .map_err(sqlite_err)?;

    let rows = stmt.query_map([], edge_from_row).map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Get all edges flowing into the given confluence.
pub fn tributaries_of(conn: &Connection, node_id: i64) -> Result<Vec<Edge>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, downstream_id, length_km, upstream_area, strahler_order
             FROM edges WHERE downstream_id = ?1",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map(params![node_id], edge_from_row)
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Confluences with more than two tributaries. Only confluences that are
/// themselves edges count; the id an outlet drains to is outside the set.
pub fn bad_reaches(conn: &Connection) -> Result<Vec<i64>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT e.id
             FROM edges e
             JOIN (SELECT downstream_id, COUNT(*) AS tribs
                   FROM edges GROUP BY downstream_id) t
               ON e.id = t.downstream_id
             WHERE t.tribs > 2
             ORDER BY e.id",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Delete edges whose confluence was never assigned to a basin.
pub fn delete_unlabeled_edges(conn: &Connection) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM edges WHERE id IN (SELECT id FROM nodes WHERE basin_id = -1)",
        [],
    )
    .map_err(sqlite_err)
}

/// Remove every edge row (stage rewrite).
pub fn clear_edges(conn: &Connection) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM edges", []).map_err(sqlite_err)
}

/// Count edge rows.
pub fn count_edges(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
        .map_err(sqlite_err)
}
