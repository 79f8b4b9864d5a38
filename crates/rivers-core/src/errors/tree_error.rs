//! Tree construction and binarization errors.

/// Errors raised while restructuring a basin or building its tree.
/// These abort processing of the affected basin only.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// More than one edge drains out of the edge set. The candidates are
    /// surfaced so the offending rows can be diagnosed, never picked from.
    #[error("Multiple root candidates in basin {basin_id}: {candidates:?}")]
    MultipleRoots { basin_id: i64, candidates: Vec<i64> },

    /// No edge drains out of the edge set (empty basin or malformed cycle).
    #[error("No root found in basin {basin_id}")]
    RootNotFound { basin_id: i64 },

    /// The binarization fixpoint loop hit its pass cap with bad reaches
    /// remaining. Indicates a synthetic-id or tributary-count bug.
    #[error("Binarization did not converge after {passes} passes: {remaining} bad reaches remain")]
    NonConvergence { passes: u32, remaining: usize },
}
