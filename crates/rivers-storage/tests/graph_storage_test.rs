//! Graph tables round-trip through SQLite with their indices intact.

use rivers_core::types::{Confluence, Edge};
use rivers_storage::migrations::run_migrations;
use rivers_storage::queries::{edges, metrics, nodes};
use rivers_storage::DatabaseManager;
use rusqlite::Connection;

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
}

fn edge(id: i64, down: i64, area: f64, order: i64) -> Edge {
    Edge::new(id, down, 1.5, area, order)
}

#[test]
fn test_edges_round_trip() {
    let conn = setup_db();

    let rows = vec![edge(1, 3, 1.0, 1), edge(2, 3, 2.0, 1), edge(3, 0, 5.0, 2)];
    assert_eq!(edges::insert_edges(&conn, &rows).unwrap(), 3);

    let loaded = edges::load_edges(&conn).unwrap();
    assert_eq!(loaded, rows);

    // Replace semantics: reinserting the same ids does not duplicate
    edges::insert_edges(&conn, &rows).unwrap();
    assert_eq!(edges::count_edges(&conn).unwrap(), 3);
}

#[test]
fn test_tributary_lookup() {
    let conn = setup_db();
    edges::insert_edges(
        &conn,
        &[edge(1, 3, 1.0, 1), edge(2, 3, 2.0, 1), edge(3, 0, 5.0, 2)],
    )
    .unwrap();

    let tribs = edges::tributaries_of(&conn, 3).unwrap();
    let mut ids: Vec<i64> = tribs.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);

    assert!(edges::tributaries_of(&conn, 1).unwrap().is_empty());
}

#[test]
fn test_bad_reach_detection() {
    let conn = setup_db();
    // Edge 9 takes three tributaries; edge 0 is outside the set and
    // must not count even though three edges drain past it.
    edges::insert_edges(
        &conn,
        &[
            edge(1, 9, 1.0, 1),
            edge(2, 9, 2.0, 1),
            edge(3, 9, 3.0, 1),
            edge(9, 0, 6.0, 2),
        ],
    )
    .unwrap();

    assert_eq!(edges::bad_reaches(&conn).unwrap(), vec![9]);
}

#[test]
fn test_nodes_round_trip_and_basin_update() {
    let conn = setup_db();

    let rows = vec![
        Confluence::new(1, 0.5, 1.5),
        Confluence::new(2, 2.5, 3.5),
        Confluence::new(3, 4.5, 5.5),
    ];
    nodes::insert_nodes(&conn, &rows).unwrap();

    let loaded = nodes::load_nodes(&conn).unwrap();
    assert_eq!(loaded, rows);
    assert_eq!(nodes::max_node_id(&conn).unwrap(), Some(3));

    nodes::set_basin(&conn, 3, &[1, 2, 3]).unwrap();
    let n1 = nodes::get_node(&conn, 1).unwrap().unwrap();
    assert_eq!(n1.basin_id, 3);
}

#[test]
fn test_unlabeled_rows_are_pruned() {
    let conn = setup_db();

    edges::insert_edges(&conn, &[edge(1, 2, 1.0, 1), edge(2, 0, 2.0, 2)]).unwrap();
    nodes::insert_nodes(
        &conn,
        &[Confluence::new(1, 0.0, 0.0), Confluence::new(2, 1.0, 1.0)],
    )
    .unwrap();
    nodes::set_basin(&conn, 1, &[1]).unwrap();

    assert_eq!(edges::delete_unlabeled_edges(&conn).unwrap(), 1);
    assert_eq!(nodes::delete_unlabeled_nodes(&conn).unwrap(), 1);

    assert_eq!(edges::count_edges(&conn).unwrap(), 1);
    assert_eq!(nodes::count_nodes(&conn).unwrap(), 1);

    // Rerun is a no-op
    assert_eq!(edges::delete_unlabeled_edges(&conn).unwrap(), 0);
    assert_eq!(nodes::delete_unlabeled_nodes(&conn).unwrap(), 0);
}

#[test]
fn test_empty_set_has_no_max_id() {
    let conn = setup_db();
    assert_eq!(nodes::max_node_id(&conn).unwrap(), None);
}

#[test]
fn test_edge_metrics_upsert() {
    let conn = setup_db();

    let row = metrics::EdgeMetricsRow {
        edge_id: 7,
        length: Some(12.5),
        curvature: Some(0.2),
        meander: None,
        orientation: Some(-45.0),
        depth: Some(3),
        leaves: Some(4),
        balance_factor: Some(-1),
        cum_depth: Some(9),
        ave_depth: Some(2.25),
        junction_angle: Some(170.0),
    };
    metrics::upsert_edge_metrics(&conn, &[row.clone()]).unwrap();

    let loaded = metrics::get_edge_metrics(&conn, 7).unwrap().unwrap();
    assert_eq!(loaded, row);

    // Upsert overwrites
    let updated = metrics::EdgeMetricsRow {
        depth: Some(4),
        ..row
    };
    metrics::upsert_edge_metrics(&conn, &[updated.clone()]).unwrap();
    let loaded = metrics::get_edge_metrics(&conn, 7).unwrap().unwrap();
    assert_eq!(loaded.depth, Some(4));
}

#[test]
fn test_network_metrics_nan_stored_as_null() {
    let conn = setup_db();

    metrics::upsert_network_metrics(
        &conn,
        42,
        [("density", 1.25), ("std_tja", f64::NAN)].into_iter(),
    )
    .unwrap();

    let loaded = metrics::load_network_metrics(&conn, 42).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], ("density".to_string(), 1.25));
    assert_eq!(loaded[1].0, "std_tja");
    assert!(loaded[1].1.is_nan());
}

#[test]
fn test_all_tables_exist() {
    let conn = setup_db();

    let tables: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    for table in ["edges", "nodes", "edge_metrics", "network_metrics"] {
        assert!(tables.contains(&table.to_string()), "Missing {table} table");
    }
}

#[test]
fn test_on_disk_database_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");

    {
        let db = DatabaseManager::open(&path).unwrap();
        db.with_conn(|conn| edges::insert_edges(conn, &[edge(1, 0, 1.0, 1)]).map(|_| ()))
            .unwrap();
        db.checkpoint().unwrap();
    }

    let db = DatabaseManager::open(&path).unwrap();
    let count = db.with_conn(edges::count_edges).unwrap();
    assert_eq!(count, 1);
    assert_eq!(db.path(), Some(path.as_path()));
}
