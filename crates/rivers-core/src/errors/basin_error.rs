//! Basin labeling errors.

/// Errors raised during basin root selection and labeling.
#[derive(Debug, thiserror::Error)]
pub enum BasinError {
    /// No edge of order `threshold` joins a higher-order edge.
    /// Reported to the caller; other thresholds may still be processed.
    #[error("No basin roots found at order threshold {threshold}")]
    NoRoots { threshold: i64 },
}
