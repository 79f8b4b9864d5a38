//! Basin root selection and upstream-closure labeling.

pub mod prune;

use rivers_core::errors::BasinError;
use rivers_core::types::collections::{FxHashMap, FxHashSet};
use rivers_core::types::{Confluence, Edge};
use tracing::{debug, warn};

pub use prune::{prune, PruneStats};

/// Outcome of a labeling run.
#[derive(Debug, Clone, Default)]
pub struct BasinLabeling {
    /// Root edge ids, one per basin.
    pub roots: Vec<i64>,
    /// Confluences assigned to a basin.
    pub labeled: usize,
}

/// Select basin roots: edges of order `threshold` that flow directly into
/// an edge of strictly higher order.
pub fn select_roots(edges: &[Edge], threshold: i64) -> Vec<i64> {
    let by_id: FxHashMap<i64, &Edge> = edges.iter().map(|e| (e.id, e)).collect();

    edges
        .iter()
        .filter(|e| e.strahler_order == threshold)
        .filter(|e| {
            by_id
                .get(&e.downstream_id)
                .is_some_and(|down| down.strahler_order > threshold)
        })
        .map(|e| e.id)
        .collect()
}

/// Group edge ids by the confluence they flow into.
pub fn upstream_index(edges: &[Edge]) -> FxHashMap<i64, Vec<i64>> {
    let mut index: FxHashMap<i64, Vec<i64>> = FxHashMap::default();
    for edge in edges {
        index.entry(edge.downstream_id).or_default().push(edge.id);
    }
    index
}

/// Label every confluence in each root's upstream closure with that root.
///
/// The closure walk is an explicit stack, never recursion; basin subtrees
/// can be arbitrarily deep. A confluence reachable from two roots keeps
/// the label written last (malformed input, logged, not corrected).
pub fn label_basins(
    edges: &[Edge],
    nodes: &mut [Confluence],
    threshold: i64,
) -> Result<BasinLabeling, BasinError> {
    let roots = select_roots(edges, threshold);
    if roots.is_empty() {
        return Err(BasinError::NoRoots { threshold });
    }

    let upstream = upstream_index(edges);
    let mut basin_of: FxHashMap<i64, i64> = FxHashMap::default();

    for &root in &roots {
        let mut visited: FxHashSet<i64> = FxHashSet::default();
        let mut stack = vec![root];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(&previous) = basin_of.get(&current) {
                warn!(
                    node = current,
                    previous_root = previous,
                    new_root = root,
                    "confluence reachable from two basin roots; keeping last label"
                );
            }
            basin_of.insert(current, root);

            if let Some(tribs) = upstream.get(&current) {
                stack.extend_from_slice(tribs);
            }
        }
    }

    let mut labeled = 0;
    for node in nodes.iter_mut() {
        if let Some(&basin) = basin_of.get(&node.id) {
            node.basin_id = basin;
            labeled += 1;
        }
    }

    debug!(
        roots = roots.len(),
        labeled, "basin labeling complete"
    );

    Ok(BasinLabeling {
        roots,
        labeled,
    })
}
