//! V002: Metric tables — per-edge metrics and the flat network mapping.

pub const MIGRATION_SQL: &str = r#"
-- Per-edge metrics: segment geometry plus post-order tree fields.
-- NULL means undefined (degenerate geometry, non-binary node, leaf angle).
CREATE TABLE IF NOT EXISTS edge_metrics (
    edge_id INTEGER PRIMARY KEY,
    length REAL,
    curvature REAL,
    meander REAL,
    orientation REAL,
    depth INTEGER,
    leaves INTEGER,
    balance_factor INTEGER,
    cum_depth INTEGER,
    ave_depth REAL,
    junction_angle REAL
) STRICT;

-- Network-level aggregates, one flat key/value mapping per basin.
CREATE TABLE IF NOT EXISTS network_metrics (
    basin_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    value REAL,
    PRIMARY KEY (basin_id, name)
) STRICT;
"#;
