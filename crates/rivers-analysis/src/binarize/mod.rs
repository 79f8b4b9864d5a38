//! Confluence binarization.
//!
//! Rewrites every confluence with more than two tributaries into a chain
//! of synthetic binary confluences. The two largest-area tributaries end
//! up siblings at the deepest point of the chain; each smaller tributary
//! is peeled off one synthetic node at a time, smallest first, starting
//! at the original confluence. Synthetic edges carry zero length, the
//! running remainder of the parent's upstream area, and the parent's
//! Strahler order; synthetic nodes copy the parent's coordinates.

use rivers_core::errors::TreeError;
use rivers_core::types::collections::{FxHashMap, FxHashSet};
use rivers_core::types::{Confluence, Edge};
use tracing::{debug, warn};

/// Synthetic id allocator for one binarization run.
///
/// Owned and explicitly passed, never global: ids must be unique and
/// strictly increasing across every pass of the run or the fixpoint
/// loop can fail to converge.
#[derive(Debug)]
pub struct SyntheticIds {
    next: i64,
}

impl SyntheticIds {
    /// Seed from the current maximum node id.
    pub fn seeded_from(max_id: i64) -> Self {
        Self { next: max_id }
    }

    fn next_id(&mut self) -> i64 {
        self.next += 1;
        self.next
    }
}

/// Outcome of a binarization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinarizeStats {
    /// Fixpoint passes that performed at least one split.
    pub passes: u32,
    /// Confluences split across all passes.
    pub reaches_split: usize,
    /// Synthetic edges (and nodes) created.
    pub synthetic_edges: usize,
}

/// Confluences with more than two tributaries, ascending by id.
/// Only confluences that are themselves edges in the set count.
pub fn find_bad_reaches(edges: &[Edge]) -> Vec<i64> {
    let ids: FxHashSet<i64> = edges.iter().map(|e| e.id).collect();

    let mut counts: FxHashMap<i64, usize> = FxHashMap::default();
    for edge in edges {
        *counts.entry(edge.downstream_id).or_default() += 1;
    }

    let mut bad: Vec<i64> = counts
        .into_iter()
        .filter(|&(id, count)| count > 2 && ids.contains(&id))
        .map(|(id, _)| id)
        .collect();
    bad.sort_unstable();
    bad
}

/// Rewrite the edge/node set until no confluence has more than two
/// tributaries.
///
/// Iterates to a fixpoint: one pass is not guaranteed sufficient, so bad
/// reaches are recomputed after every pass and the loop only stops when
/// the query comes back empty. The pass cap turns a counting or id bug
/// into `TreeError::NonConvergence` instead of an endless loop.
pub fn enforce_binary(
    edges: &mut Vec<Edge>,
    nodes: &mut Vec<Confluence>,
    max_passes: u32,
) -> Result<BinarizeStats, TreeError> {
    let max_id = nodes.iter().map(|n| n.id).max().unwrap_or(0);
    let mut ids = SyntheticIds::seeded_from(max_id);
    let mut stats = BinarizeStats::default();

    while stats.passes < max_passes {
        let bad = find_bad_reaches(edges);
        if bad.is_empty() {
            return Ok(stats);
        }
        stats.passes += 1;
        debug!(
            pass = stats.passes,
            reaches = bad.len(),
            "splitting multi-tributary confluences"
        );

        let edge_index: FxHashMap<i64, usize> =
            edges.iter().enumerate().map(|(i, e)| (e.id, i)).collect();
        let node_index: FxHashMap<i64, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        let mut tribs_of: FxHashMap<i64, Vec<usize>> = FxHashMap::default();
        for (i, edge) in edges.iter().enumerate() {
            tribs_of.entry(edge.downstream_id).or_default().push(i);
        }

        for &reach in &bad {
            let Some(&node_idx) = node_index.get(&reach) else {
                warn!(reach, "bad reach has no confluence row; skipping");
                continue;
            };
            split_reach(
                reach,
                edge_index[&reach],
                node_idx,
                &tribs_of[&reach],
                edges,
                nodes,
                &mut ids,
            );
            stats.reaches_split += 1;
            stats.synthetic_edges += tribs_of[&reach].len() - 2;
        }
    }

    let remaining = find_bad_reaches(edges).len();
    if remaining == 0 {
        Ok(stats)
    } else {
        Err(TreeError::NonConvergence {
            passes: stats.passes,
            remaining,
        })
    }
}

/// Fold one confluence's surplus tributaries into a synthetic chain.
///
/// Tributaries sorted ascending by upstream area; the smallest keeps the
/// original confluence as its downstream, each next one is redirected to
/// a fresh synthetic node, and the two largest become siblings under the
/// last synthetic node.
fn split_reach(
    reach: i64,
    edge_idx: usize,
    node_idx: usize,
    trib_idxs: &[usize],
    edges: &mut Vec<Edge>,
    nodes: &mut Vec<Confluence>,
    ids: &mut SyntheticIds,
) {
    let parent_area = edges[edge_idx].upstream_area;
    let parent_order = edges[edge_idx].strahler_order;
    let (px, py, pbasin) = {
        let n = &nodes[node_idx];
        (n.x, n.y, n.basin_id)
    };

    let mut tribs = trib_idxs.to_vec();
    tribs.sort_by(|&a, &b| {
        edges[a]
            .upstream_area
            .partial_cmp(&edges[b].upstream_area)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let k = tribs.len();
    debug_assert!(k > 2);

    let mut chain_parent = reach;
    let mut remainder = parent_area;
    for i in 0..k - 2 {
        let sid = ids.next_id();
        remainder -= edges[tribs[i]].upstream_area;
        edges.push(Edge {
            id: sid,
            downstream_id: chain_parent,
            length_km: 0.0,
            upstream_area: remainder,
            strahler_order: parent_order,
        });
        nodes.push(Confluence {
            id: sid,
            x: px,
            y: py,
            basin_id: pbasin,
        });
        edges[tribs[i + 1]].downstream_id = sid;
        chain_parent = sid;
    }
    edges[tribs[k - 1]].downstream_id = chain_parent;
}
