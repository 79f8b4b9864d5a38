//! Pipeline configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Configuration for one pipeline run.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`RIVERS_*`)
/// 2. Project config (`rivers.toml` in the working root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiversConfig {
    /// Strahler order at which basin roots are selected: an edge of this
    /// order joining a higher-order edge starts a basin.
    pub order_threshold: i64,
    /// Hard cap on binarization fixpoint passes.
    pub max_binarize_passes: u32,
    /// Row count per bulk insert batch.
    pub batch_size: usize,
}

impl Default for RiversConfig {
    fn default() -> Self {
        Self {
            order_threshold: 5,
            max_binarize_passes: 64,
            batch_size: 10_000,
        }
    }
}

impl RiversConfig {
    /// Load configuration with layered resolution, then validate.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_path = root.join("rivers.toml");
        if project_path.exists() {
            config = Self::from_toml_file(&project_path)?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file, keeping defaults for absent keys.
    fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `RIVERS_*` environment overrides. Unparseable values are
    /// ignored rather than fatal.
    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<i64>("RIVERS_ORDER_THRESHOLD") {
            self.order_threshold = v;
        }
        if let Some(v) = env_parse::<u32>("RIVERS_MAX_BINARIZE_PASSES") {
            self.max_binarize_passes = v;
        }
        if let Some(v) = env_parse::<usize>("RIVERS_BATCH_SIZE") {
            self.batch_size = v;
        }
    }

    /// Validate resolved values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.order_threshold < 1 {
            return Err(ConfigError::InvalidThreshold {
                threshold: self.order_threshold,
            });
        }
        if self.max_binarize_passes == 0 {
            return Err(ConfigError::InvalidPassCap {
                passes: self.max_binarize_passes,
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
