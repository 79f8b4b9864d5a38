//! Network-level aggregates over one basin tree.

use std::collections::BTreeMap;

use rivers_core::types::collections::FxHashMap;
use rivers_core::types::Edge;
use statrs::statistics::{Data, OrderStatistics};

use crate::geometry::SegmentMetrics;
use crate::tree::NodeMetrics;

/// Mean / median / sample standard deviation of a finite sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Summarize a sample, skipping non-finite entries. Degenerate geometry
/// yields NaN per-edge values and those must not poison the aggregate.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    let clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if clean.is_empty() {
        return None;
    }

    let n = clean.len() as f64;
    let mean = clean.iter().sum::<f64>() / n;
    let std = if clean.len() > 1 {
        let variance = clean.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };
    let median = Data::new(clean).median();

    Some(Summary { mean, median, std })
}

fn insert_summary(out: &mut BTreeMap<String, f64>, name: &str, values: &[f64]) {
    if let Some(s) = summarize(values) {
        out.insert(format!("ave_{name}"), s.mean);
        out.insert(format!("med_{name}"), s.median);
        out.insert(format!("std_{name}"), s.std);
    }
}

/// Geometry length when the edge has usable geometry, the stored
/// kilometre length otherwise.
pub fn effective_length(edge: &Edge, segments: &FxHashMap<i64, SegmentMetrics>) -> f64 {
    segments
        .get(&edge.id)
        .map(|s| s.length)
        .filter(|l| l.is_finite())
        .unwrap_or(edge.length_km)
}

/// Compute the flat metric mapping for one basin.
///
/// Keys follow the ave_/med_/std_ convention per variable, plus the
/// root-derived values (`leaves`, `ave_depth`, `height`, `compactness`)
/// and the whole-basin ratios (`density`, `texture`, `bifurcation_*`).
pub fn network_metrics(
    edges: &[Edge],
    segments: &FxHashMap<i64, SegmentMetrics>,
    node_metrics: &FxHashMap<i64, NodeMetrics>,
    root: i64,
) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();

    let lengths: Vec<f64> = edges.iter().map(|e| effective_length(e, segments)).collect();
    let curvatures: Vec<f64> = edges
        .iter()
        .filter_map(|e| segments.get(&e.id).map(|s| s.curvature))
        .collect();
    let meanders: Vec<f64> = edges
        .iter()
        .filter_map(|e| segments.get(&e.id).map(|s| s.meander))
        .collect();
    let orientations: Vec<f64> = edges
        .iter()
        .filter_map(|e| segments.get(&e.id).map(|s| s.orientation))
        .collect();
    let angles: Vec<f64> = node_metrics
        .values()
        .filter_map(|m| m.junction_angle)
        .collect();
    let depths: Vec<f64> = node_metrics.values().map(|m| m.depth as f64).collect();
    let balances: Vec<f64> = node_metrics
        .values()
        .filter_map(|m| m.balance_factor.map(|b| b as f64))
        .collect();

    insert_summary(&mut out, "length", &lengths);
    insert_summary(&mut out, "curvature", &curvatures);
    insert_summary(&mut out, "meander", &meanders);
    insert_summary(&mut out, "orientation", &orientations);
    insert_summary(&mut out, "tja", &angles);
    insert_summary(&mut out, "node_depth", &depths);
    insert_summary(&mut out, "balance", &balances);

    if let Some(root_m) = node_metrics.get(&root) {
        let height = node_metrics.values().map(|m| m.depth).max().unwrap_or(0);
        out.insert("leaves".to_string(), root_m.leaves as f64);
        out.insert("ave_depth".to_string(), root_m.ave_depth);
        out.insert("height".to_string(), height as f64);
        out.insert(
            "compactness".to_string(),
            height as f64 / root_m.leaves as f64,
        );
    }

    let max_area = edges
        .iter()
        .map(|e| e.upstream_area)
        .fold(0.0_f64, f64::max);
    if max_area > 0.0 {
        let total_length: f64 = lengths.iter().copied().filter(|l| l.is_finite()).sum();
        out.insert("density".to_string(), total_length / max_area);
        out.insert("texture".to_string(), edges.len() as f64 / max_area);
    }

    bifurcation_ratios(edges, &mut out);

    out
}

/// Per consecutive order pair: stream count of the lower order over the
/// count of the order above it, plus the first-order geometric-mean ratio.
fn bifurcation_ratios(edges: &[Edge], out: &mut BTreeMap<String, f64>) {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for edge in edges {
        *counts.entry(edge.strahler_order).or_default() += 1;
    }
    let (Some((&min_order, _)), Some((&max_order, _))) =
        (counts.first_key_value(), counts.last_key_value())
    else {
        return;
    };

    for order in (min_order + 1)..=max_order {
        let below = counts.get(&(order - 1)).copied().unwrap_or(0);
        let Some(&at) = counts.get(&order) else {
            continue;
        };
        out.insert(
            format!("bifurcation_{order}"),
            below as f64 / at as f64,
        );
    }

    if max_order > 1 {
        let first_order = counts.get(&1).copied().unwrap_or(0) as f64;
        out.insert(
            "bifurcation_mean".to_string(),
            first_order.powf(1.0 / (max_order - 1) as f64),
        );
    }
}
