//! River segment record.

use serde::{Deserialize, Serialize};

/// A river segment: one row of the extracted edge table.
///
/// Every edge flows into exactly one downstream edge (`downstream_id`),
/// forming a functional graph. The basin outlet is the one edge whose
/// `downstream_id` references no edge in the set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: i64,
    pub downstream_id: i64,
    pub length_km: f64,
    pub upstream_area: f64,
    pub strahler_order: i64,
}

impl Edge {
    pub fn new(
        id: i64,
        downstream_id: i64,
        length_km: f64,
        upstream_area: f64,
        strahler_order: i64,
    ) -> Self {
        Self {
            id,
            downstream_id,
            length_km,
            upstream_area,
            strahler_order,
        }
    }
}
