//! Pipeline errors and non-fatal error collection.

use super::{BasinError, ConfigError, StorageError, TreeError};

/// Errors that can occur during pipeline execution.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Basin error: {0}")]
    Basin(#[from] BasinError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result of a pipeline run that accumulates non-fatal errors.
///
/// A basin whose tree is ambiguous or whose binarization fails is dropped
/// from `data` and its error recorded here; the remaining basins still
/// produce results.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Non-fatal errors collected during the pipeline run.
    pub errors: Vec<PipelineError>,
}

impl<T: Default> PipelineResult<T> {
    /// Create a new result with no errors.
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Add a non-fatal error to the result.
    pub fn add_error(&mut self, error: PipelineError) {
        self.errors.push(error);
    }

    /// Returns true if there are no non-fatal errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of non-fatal errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
