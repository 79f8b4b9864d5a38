//! Basin labeling, pruning, binarization, and tree metrics.
//!
//! The pipeline converts a raw directed river-segment network into a
//! strict binary confluence tree, then computes per-edge geometry,
//! per-node topology, and network-wide aggregates over each basin.

pub mod basins;
pub mod binarize;
pub mod geometry;
pub mod network;
pub mod pipeline;
pub mod tree;

pub use pipeline::{run_pipeline, BasinReport};
