//! Segment polyline geometry.

use serde::{Deserialize, Serialize};

/// Ordered coordinate sequence for one segment.
///
/// Multi-part source geometries are flattened into a single sequence by
/// concatenation in part order before they reach the core. A well-formed
/// polyline has at least two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(pub Vec<[f64; 2]>);

impl Polyline {
    pub fn new(coords: Vec<[f64; 2]>) -> Self {
        Self(coords)
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.0
    }

    /// True when the polyline has enough vertices to carry geometry.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() >= 2
    }
}
