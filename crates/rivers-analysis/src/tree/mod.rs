//! Tree construction and post-order metric traversal.

pub mod builder;
pub mod traversal;
pub mod types;

pub use builder::{build_child_map, find_root, ChildMap};
pub use traversal::postorder_metrics;
pub use types::NodeMetrics;
