//! Drop everything outside the labeled basins.

use rivers_core::types::collections::FxHashSet;
use rivers_core::types::{Confluence, Edge};
use tracing::debug;

/// Rows removed by a pruning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub edges_removed: usize,
    pub nodes_removed: usize,
}

/// Remove every edge and confluence that no basin claimed.
/// Pure filter; rerunning on pruned data removes nothing.
pub fn prune(edges: &mut Vec<Edge>, nodes: &mut Vec<Confluence>) -> PruneStats {
    let labeled: FxHashSet<i64> = nodes
        .iter()
        .filter(|n| n.is_labeled())
        .map(|n| n.id)
        .collect();

    let edges_before = edges.len();
    let nodes_before = nodes.len();

    edges.retain(|e| labeled.contains(&e.id));
    nodes.retain(|n| n.is_labeled());

    let stats = PruneStats {
        edges_removed: edges_before - edges.len(),
        nodes_removed: nodes_before - nodes.len(),
    };
    debug!(?stats, "pruned unlabeled rows");
    stats
}
