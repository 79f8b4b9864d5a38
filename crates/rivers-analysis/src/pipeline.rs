//! Stage orchestration: label, prune, binarize, analyze.
//!
//! Each stage loads the working edge/node set from the store, rewrites it
//! in memory, and bulk-persists the result before the next stage runs.
//! Basins are independent after pruning, so per-basin analysis fans out
//! across a rayon pool; everything within a basin stays sequential.

use std::collections::BTreeMap;

use rayon::prelude::*;
use rivers_core::config::RiversConfig;
use rivers_core::errors::{PipelineError, PipelineResult, TreeError};
use rivers_core::types::collections::FxHashMap;
use rivers_core::types::{Confluence, Edge, Polyline};
use rivers_storage::connection::writer::with_immediate_transaction;
use rivers_storage::queries::metrics::EdgeMetricsRow;
use rivers_storage::{queries, DatabaseManager};
use tracing::{info, warn};

use crate::basins;
use crate::binarize;
use crate::geometry::{Segment, SegmentMetrics};
use crate::network;
use crate::tree;

/// Per-basin result of a pipeline run.
#[derive(Debug, Clone)]
pub struct BasinReport {
    pub basin_id: i64,
    pub edge_count: usize,
    pub metrics: BTreeMap<String, f64>,
}

/// Run the full pipeline against the graph stored in `db`.
///
/// `geometry` maps edge ids to their source polylines; edges without an
/// entry fall back to their stored kilometre length and contribute no
/// orientation. Basin-level failures (ambiguous root) are collected as
/// non-fatal errors; structural failures of the shared stages
/// (binarization non-convergence, storage) abort the run.
pub fn run_pipeline(
    db: &DatabaseManager,
    config: &RiversConfig,
    geometry: &FxHashMap<i64, Polyline>,
) -> Result<PipelineResult<Vec<BasinReport>>, PipelineError> {
    config.validate()?;

    let (mut edges, mut nodes) = db.with_conn(|conn| {
        Ok((
            queries::edges::load_edges(conn)?,
            queries::nodes::load_nodes(conn)?,
        ))
    })?;
    info!(
        edges = edges.len(),
        nodes = nodes.len(),
        threshold = config.order_threshold,
        "pipeline start"
    );

    let mut result = PipelineResult::new(Vec::new());

    // Stage 1: basin labeling. No roots is reported, not fatal; the
    // caller may retry with another threshold.
    let labeling = match basins::label_basins(&edges, &mut nodes, config.order_threshold) {
        Ok(labeling) => labeling,
        Err(e) => {
            result.add_error(e.into());
            return Ok(result);
        }
    };

    // Stage 2: prune and persist the labeled graph.
    let pruned = basins::prune(&mut edges, &mut nodes);
    info!(
        basins = labeling.roots.len(),
        edges_removed = pruned.edges_removed,
        "labeled and pruned"
    );
    persist_graph(db, config, &edges, &nodes)?;

    // Stage 3: binarize and persist. Non-convergence is a counting or
    // id bug, fatal for the whole set.
    let stats = binarize::enforce_binary(&mut edges, &mut nodes, config.max_binarize_passes)?;
    info!(
        passes = stats.passes,
        synthetic = stats.synthetic_edges,
        "binarization converged"
    );
    persist_graph(db, config, &edges, &nodes)?;
    db.checkpoint()?;

    // Stage 4: per-basin tree metrics.
    let basin_edges = group_by_basin(&edges, &nodes);
    let outcomes: Vec<_> = basin_edges
        .par_iter()
        .map(|(basin_id, group)| analyze_basin(*basin_id, group, geometry))
        .collect();

    let mut metric_rows: Vec<EdgeMetricsRow> = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok((report, rows)) => {
                metric_rows.extend(rows);
                result.data.push(report);
            }
            Err(e) => result.add_error(e.into()),
        }
    }

    db.with_conn(|conn| {
        with_immediate_transaction(conn, |tx| {
            for chunk in metric_rows.chunks(config.batch_size.max(1)) {
                queries::metrics::upsert_edge_metrics(tx, chunk)?;
            }
            for report in &result.data {
                queries::metrics::upsert_network_metrics(
                    tx,
                    report.basin_id,
                    report.metrics.iter().map(|(k, v)| (k.as_str(), *v)),
                )?;
            }
            Ok(())
        })
    })?;

    info!(
        basins = result.data.len(),
        failed = result.error_count(),
        "pipeline complete"
    );
    Ok(result)
}

/// Rewrite both graph tables from the in-memory set in one transaction.
fn persist_graph(
    db: &DatabaseManager,
    config: &RiversConfig,
    edges: &[Edge],
    nodes: &[Confluence],
) -> Result<(), rivers_core::errors::StorageError> {
    let batch = config.batch_size.max(1);
    db.with_conn(|conn| {
        with_immediate_transaction(conn, |tx| {
            queries::edges::clear_edges(tx)?;
            for chunk in edges.chunks(batch) {
                queries::edges::insert_edges(tx, chunk)?;
            }
            queries::nodes::clear_nodes(tx)?;
            for chunk in nodes.chunks(batch) {
                queries::nodes::insert_nodes(tx, chunk)?;
            }
            Ok(())
        })
    })
}

/// Partition edges by the basin their confluence belongs to, deterministic
/// basin order.
fn group_by_basin(edges: &[Edge], nodes: &[Confluence]) -> Vec<(i64, Vec<Edge>)> {
    let basin_of: FxHashMap<i64, i64> = nodes.iter().map(|n| (n.id, n.basin_id)).collect();

    let mut groups: BTreeMap<i64, Vec<Edge>> = BTreeMap::new();
    for edge in edges {
        match basin_of.get(&edge.id) {
            Some(&basin) => groups.entry(basin).or_default().push(edge.clone()),
            None => warn!(edge = edge.id, "edge has no confluence row; skipping"),
        }
    }
    groups.into_iter().collect()
}

/// Build one basin's tree, traverse it, and aggregate its metrics.
fn analyze_basin(
    basin_id: i64,
    edges: &[Edge],
    geometry: &FxHashMap<i64, Polyline>,
) -> Result<(BasinReport, Vec<EdgeMetricsRow>), TreeError> {
    let segments: FxHashMap<i64, SegmentMetrics> = edges
        .iter()
        .filter_map(|e| {
            let line = geometry.get(&e.id)?;
            let segment = Segment::from_polyline(line)?;
            Some((e.id, segment.metrics()))
        })
        .collect();

    let children = tree::build_child_map(edges);
    let root = tree::find_root(edges, basin_id)?;

    let orientations: FxHashMap<i64, f64> = segments
        .iter()
        .filter(|(_, s)| s.orientation.is_finite())
        .map(|(&id, s)| (id, s.orientation))
        .collect();

    let node_metrics = tree::postorder_metrics(root, &children, &orientations);
    let metrics = network::network_metrics(edges, &segments, &node_metrics, root);

    let rows = edges
        .iter()
        .map(|e| metric_row(e, &segments, &node_metrics))
        .collect();

    Ok((
        BasinReport {
            basin_id,
            edge_count: edges.len(),
            metrics,
        },
        rows,
    ))
}

fn metric_row(
    edge: &Edge,
    segments: &FxHashMap<i64, SegmentMetrics>,
    node_metrics: &FxHashMap<i64, tree::NodeMetrics>,
) -> EdgeMetricsRow {
    let segment = segments.get(&edge.id);
    let node = node_metrics.get(&edge.id);

    EdgeMetricsRow {
        edge_id: edge.id,
        length: Some(network::effective_length(edge, segments)),
        curvature: segment.and_then(|s| finite(s.curvature)),
        meander: segment.and_then(|s| finite(s.meander)),
        orientation: segment.and_then(|s| finite(s.orientation)),
        depth: node.map(|m| m.depth as i64),
        leaves: node.map(|m| m.leaves as i64),
        balance_factor: node.and_then(|m| m.balance_factor),
        cum_depth: node.map(|m| m.cum_depth as i64),
        ave_depth: node.map(|m| m.ave_depth),
        junction_angle: node.and_then(|m| m.junction_angle),
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
