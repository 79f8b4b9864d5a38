//! Iterative post-order traversal.
//!
//! Basin trees routinely exceed safe call-stack depth, so the traversal
//! runs on an explicit stack: a node is finalized only once every child
//! in its priority-ordered list has been finalized; until then its
//! unfinalized children are pushed and the node stays deferred.

use rivers_core::types::collections::FxHashMap;
use smallvec::SmallVec;
use tracing::warn;

use super::builder::ChildMap;
use super::types::NodeMetrics;

/// Compute per-node metrics for the tree rooted at `root`.
///
/// `orientations` maps edge ids to chord orientations in degrees; a
/// missing or non-finite entry leaves the parent's junction angle
/// undefined rather than poisoning it.
pub fn postorder_metrics(
    root: i64,
    children: &ChildMap,
    orientations: &FxHashMap<i64, f64>,
) -> FxHashMap<i64, NodeMetrics> {
    let mut metrics: FxHashMap<i64, NodeMetrics> = FxHashMap::default();
    let mut stack: Vec<i64> = vec![root];

    while let Some(&node) = stack.last() {
        if metrics.contains_key(&node) {
            stack.pop();
            continue;
        }

        let tribs: &[i64] = children.get(&node).map_or(&[], |c| c.as_slice());
        let pending: SmallVec<[i64; 2]> = tribs
            .iter()
            .copied()
            .filter(|t| !metrics.contains_key(t))
            .collect();

        if pending.is_empty() {
            let record = finalize(node, tribs, &metrics, orientations);
            metrics.insert(node, record);
            stack.pop();
        } else {
            stack.extend(pending);
        }
    }

    metrics
}

/// Compute one node's record from its already-finalized children.
fn finalize(
    node: i64,
    tribs: &[i64],
    metrics: &FxHashMap<i64, NodeMetrics>,
    orientations: &FxHashMap<i64, f64>,
) -> NodeMetrics {
    if tribs.is_empty() {
        return NodeMetrics::leaf();
    }

    let depth = 1 + tribs.iter().map(|t| metrics[t].depth).max().unwrap_or(0);
    let leaves: u64 = tribs.iter().map(|t| metrics[t].leaves).sum();
    let cum_depth: u64 = tribs.iter().map(|t| metrics[t].cum_depth).sum::<u64>() + leaves;
    let ave_depth = cum_depth as f64 / leaves as f64;

    let (balance_factor, junction_angle) = if let [priority, secondary] = tribs {
        let balance = metrics[priority].depth as i64 - metrics[secondary].depth as i64;
        (Some(balance), junction_angle(*priority, *secondary, orientations))
    } else {
        warn!(
            node,
            tributaries = tribs.len(),
            "non-binary confluence after binarization; balance and angle undefined"
        );
        (None, None)
    };

    NodeMetrics {
        depth,
        leaves,
        balance_factor,
        cum_depth,
        ave_depth,
        junction_angle,
    }
}

/// Absolute orientation difference of two tributaries, reflected into
/// [0, 180].
fn junction_angle(a: i64, b: i64, orientations: &FxHashMap<i64, f64>) -> Option<f64> {
    let oa = orientations.get(&a).copied().filter(|v| v.is_finite())?;
    let ob = orientations.get(&b).copied().filter(|v| v.is_finite())?;
    let mut angle = (oa - ob).abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    Some(angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivers_core::types::Edge;

    use crate::tree::builder::build_child_map;

    fn edge(id: i64, down: i64, area: f64) -> Edge {
        Edge::new(id, down, 1.0, area, 1)
    }

    /// A chain of `n` edges draining into id 0.
    fn chain(n: i64) -> Vec<Edge> {
        (1..=n).map(|i| edge(i, i - 1, i as f64)).collect()
    }

    #[test]
    fn test_leaf_base_case() {
        let edges = vec![edge(1, 0, 1.0)];
        let map = build_child_map(&edges);
        let metrics = postorder_metrics(1, &map, &FxHashMap::default());

        assert_eq!(metrics[&1], NodeMetrics::leaf());
    }

    #[test]
    fn test_balanced_confluence() {
        //   1   2
        //    \ /
        //     3
        let edges = vec![edge(1, 3, 5.0), edge(2, 3, 2.0), edge(3, 0, 7.0)];
        let map = build_child_map(&edges);
        let metrics = postorder_metrics(3, &map, &FxHashMap::default());

        let m = &metrics[&3];
        assert_eq!(m.depth, 1);
        assert_eq!(m.leaves, 2);
        assert_eq!(m.balance_factor, Some(0));
        assert_eq!(m.cum_depth, 2);
        assert_eq!(m.ave_depth, 1.0);
    }

    #[test]
    fn test_unbalanced_depths() {
        // Priority child (larger area) has depth 2, secondary depth 5:
        // balance = 2 - 5 and depth(root) = 6.
        let mut edges = Vec::new();
        // Root edge 100 drains out of the set
        edges.push(edge(100, 0, 100.0));
        // Priority side: chain of 3 edges (10 <- 11 <- 12), area 50
        edges.push(edge(10, 100, 50.0));
        edges.push(edge(11, 10, 2.0));
        edges.push(edge(12, 11, 1.0));
        // Secondary side: chain of 6 edges (20 <- ... <- 25), area 10
        edges.push(edge(20, 100, 10.0));
        for i in 21..=25 {
            edges.push(edge(i, i - 1, 1.0));
        }

        let map = build_child_map(&edges);
        let metrics = postorder_metrics(100, &map, &FxHashMap::default());

        assert_eq!(metrics[&10].depth, 2);
        assert_eq!(metrics[&20].depth, 5);
        let root = &metrics[&100];
        assert_eq!(root.depth, 6);
        assert_eq!(root.balance_factor, Some(2 - 5));
    }

    #[test]
    fn test_leaves_sum_invariant() {
        let edges = vec![
            edge(1, 5, 4.0),
            edge(2, 5, 3.0),
            edge(5, 7, 9.0),
            edge(6, 7, 1.0),
            edge(7, 0, 11.0),
        ];
        let map = build_child_map(&edges);
        let metrics = postorder_metrics(7, &map, &FxHashMap::default());

        assert_eq!(metrics[&5].leaves, 2);
        assert_eq!(metrics[&7].leaves, metrics[&5].leaves + metrics[&6].leaves);
        // cum_depth(7) = cum(5) + cum(6) + leaves(7) = 2 + 0 + 3
        assert_eq!(metrics[&7].cum_depth, 5);
        assert!((metrics[&7].ave_depth - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_junction_angle_reflected() {
        let edges = vec![edge(1, 3, 5.0), edge(2, 3, 2.0), edge(3, 0, 7.0)];
        let map = build_child_map(&edges);

        let mut orientations = FxHashMap::default();
        orientations.insert(1, 10.0);
        orientations.insert(2, -175.0);
        let metrics = postorder_metrics(3, &map, &orientations);

        // |10 - (-175)| = 185 reflects to 175
        let angle = metrics[&3].junction_angle.unwrap();
        assert!((angle - 175.0).abs() < 1e-12);
    }

    #[test]
    fn test_reflex_difference_folds_back() {
        let mut o = FxHashMap::default();
        o.insert(1, 10.0);
        o.insert(2, 200.0);
        // |10 - 200| = 190 reflects to 170
        assert_eq!(junction_angle(1, 2, &o), Some(170.0));
    }

    #[test]
    fn test_missing_orientation_leaves_angle_undefined() {
        let edges = vec![edge(1, 3, 5.0), edge(2, 3, 2.0), edge(3, 0, 7.0)];
        let map = build_child_map(&edges);

        let mut orientations = FxHashMap::default();
        orientations.insert(1, 45.0);
        let metrics = postorder_metrics(3, &map, &orientations);
        assert_eq!(metrics[&3].junction_angle, None);
    }

    #[test]
    fn test_non_binary_node_fields_undefined() {
        let edges = vec![
            edge(1, 9, 1.0),
            edge(2, 9, 2.0),
            edge(3, 9, 3.0),
            edge(9, 0, 6.0),
        ];
        let map = build_child_map(&edges);
        let metrics = postorder_metrics(9, &map, &FxHashMap::default());

        let m = &metrics[&9];
        assert_eq!(m.balance_factor, None);
        assert_eq!(m.junction_angle, None);
        // General fields still computed
        assert_eq!(m.depth, 1);
        assert_eq!(m.leaves, 3);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        // Far beyond safe recursion depth
        let edges = chain(200_000);
        let map = build_child_map(&edges);
        let metrics = postorder_metrics(1, &map, &FxHashMap::default());

        assert_eq!(metrics.len(), 200_000);
        assert_eq!(metrics[&1].depth, 199_999);
        assert_eq!(metrics[&1].leaves, 1);
    }
}
