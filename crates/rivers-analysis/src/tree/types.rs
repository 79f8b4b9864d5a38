//! Per-node metric record.

/// Topological metrics for one confluence, filled in post-order: a node's
/// record is only complete once its entire child subtree has been visited.
///
/// `balance_factor` and `junction_angle` are defined only for nodes with
/// exactly two children; a node left non-binary keeps them `None` rather
/// than a guessed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMetrics {
    /// Longest path to a leaf, in edges.
    pub depth: u32,
    /// Leaves in this subtree.
    pub leaves: u64,
    /// Priority child depth minus secondary child depth.
    pub balance_factor: Option<i64>,
    /// Sum over leaves of their distance to this node.
    pub cum_depth: u64,
    /// Mean leaf distance: `cum_depth / leaves`.
    pub ave_depth: f64,
    /// Absolute orientation difference of the two children, reflected
    /// into [0, 180].
    pub junction_angle: Option<f64>,
}

impl NodeMetrics {
    /// Metrics for a node with no tributaries.
    pub fn leaf() -> Self {
        Self {
            depth: 0,
            leaves: 1,
            balance_factor: Some(0),
            cum_depth: 0,
            ave_depth: 0.0,
            junction_angle: None,
        }
    }
}
