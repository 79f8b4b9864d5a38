//! Confluence record.

use serde::{Deserialize, Serialize};

/// Basin id of a confluence that has not been assigned to any basin.
pub const UNLABELED: i64 = -1;

/// A confluence: the upstream endpoint of the edge with the same id.
///
/// Node ids and edge ids share one id space; there is exactly one
/// confluence per edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confluence {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub basin_id: i64,
}

impl Confluence {
    /// Create an unlabeled confluence.
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            basin_id: UNLABELED,
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.basin_id != UNLABELED
    }
}
