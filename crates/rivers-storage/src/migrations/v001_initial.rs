//! V001: Initial schema — edges and nodes.
//! Mirrors the extraction contract: edges and confluences joined 1:1 by id.

pub const MIGRATION_SQL: &str = r#"
-- Edge table: one row per river segment.
-- The downstream_id index is what keeps tributary lookup, basin labeling,
-- and bad-reach detection better than quadratic.
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY,
    downstream_id INTEGER NOT NULL,
    length_km REAL NOT NULL,
    upstream_area REAL NOT NULL,
    strahler_order INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_edges_downstream ON edges(downstream_id);
CREATE INDEX IF NOT EXISTS idx_edges_order ON edges(strahler_order);

-- Node table: the upstream confluence of the edge with the same id.
-- basin_id = -1 means unlabeled; pruning removes those rows.
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY,
    x REAL NOT NULL,
    y REAL NOT NULL,
    basin_id INTEGER NOT NULL DEFAULT -1
) STRICT;

CREATE INDEX IF NOT EXISTS idx_nodes_basin ON nodes(basin_id);
"#;
