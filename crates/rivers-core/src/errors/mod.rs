//! Error handling for the river pipeline.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod basin_error;
pub mod config_error;
pub mod pipeline_error;
pub mod storage_error;
pub mod tree_error;

pub use basin_error::BasinError;
pub use config_error::ConfigError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use storage_error::StorageError;
pub use tree_error::TreeError;
