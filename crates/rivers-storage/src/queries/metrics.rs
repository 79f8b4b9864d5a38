//! edge_metrics and network_metrics table queries.

use rivers_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension};

use crate::sqlite_err;

/// A per-edge metrics record. `None` means undefined: degenerate geometry,
/// a non-binary node, or a field that does not apply (leaf junction angle).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeMetricsRow {
    pub edge_id: i64,
    pub length: Option<f64>,
    pub curvature: Option<f64>,
    pub meander: Option<f64>,
    pub orientation: Option<f64>,
    pub depth: Option<i64>,
    pub leaves: Option<i64>,
    pub balance_factor: Option<i64>,
    pub cum_depth: Option<i64>,
    pub ave_depth: Option<f64>,
    pub junction_angle: Option<f64>,
}

/// Upsert a batch of per-edge metric rows.
pub fn upsert_edge_metrics(
    conn: &Connection,
    rows: &[EdgeMetricsRow],
) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO edge_metrics
             (edge_id, length, curvature, meander, orientation,
              depth, leaves, balance_factor, cum_depth, ave_depth, junction_angle)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .map_err(sqlite_err)?;

    let mut count = 0;
    for row in rows {
        stmt.execute(params![
            row.edge_id,
            row.length,
            row.curvature,
            row.meander,
            row.orientation,
            row.depth,
            row.leaves,
            row.balance_factor,
            row.cum_depth,
            row.ave_depth,
            row.junction_angle,
        ])
        .map_err(sqlite_err)?;
        count += 1;
    }
    Ok(count)
}

/// Get the metrics row for one edge.
pub fn get_edge_metrics(
    conn: &Connection,
    edge_id: i64,
) -> Result<Option<EdgeMetricsRow>, StorageError> {
    conn.query_row(
        "SELECT edge_id, length, curvature, meander, orientation,
                depth, leaves, balance_factor, cum_depth, ave_depth, junction_angle
         FROM edge_metrics WHERE edge_id = ?1",
        params![edge_id],
        |row| {
            Ok(EdgeMetricsRow {
                edge_id: row.get(0)?,
                length: row.get(1)?,
                curvature: row.get(2)?,
                meander: row.get(3)?,
                orientation: row.get(4)?,
                depth: row.get(5)?,
                leaves: row.get(6)?,
                balance_factor: row.get(7)?,
                cum_depth: row.get(8)?,
                ave_depth: row.get(9)?,
                junction_angle: row.get(10)?,
            })
        },
    )
    .optional()
    .map_err(sqlite_err)
}

/// Upsert one basin's flat network-metric mapping.
/// NaN values are stored as NULL; SQLite has no NaN.
pub fn upsert_network_metrics<'a, I>(
    conn: &Connection,
    basin_id: i64,
    metrics: I,
) -> Result<usize, StorageError>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO network_metrics (basin_id, name, value)
             VALUES (?1, ?2, ?3)",
        )
        .map_err(sqlite_err)?;

    let mut count = 0;
    for (name, value) in metrics {
        let stored: Option<f64> = if value.is_nan() { None } else { Some(value) };
        stmt.execute(params![basin_id, name, stored])
            .map_err(sqlite_err)?;
        count += 1;
    }
    Ok(count)
}

/// Load one basin's network metrics. NULL values come back as NaN.
pub fn load_network_metrics(
    conn: &Connection,
    basin_id: i64,
) -> Result<Vec<(String, f64)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT name, value FROM network_metrics WHERE basin_id = ?1 ORDER BY name",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map(params![basin_id], |row| {
            let name: String = row.get(0)?;
            let value: Option<f64> = row.get(1)?;
            Ok((name, value.unwrap_or(f64::NAN)))
        })
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}
