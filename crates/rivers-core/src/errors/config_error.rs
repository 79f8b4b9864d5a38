//! Configuration errors.

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Invalid TOML in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid order threshold {threshold}: must be at least 1")]
    InvalidThreshold { threshold: i64 },

    #[error("Invalid binarization pass cap {passes}: must be at least 1")]
    InvalidPassCap { passes: u32 },
}
