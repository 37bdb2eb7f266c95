use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clustering::domain::thresholds::Thresholds;
use crate::shared::constants::{
    DEFAULT_MAX_SIGMA_SQ, DEFAULT_MIN_SIGMA_SQ, DEFAULT_MLS_DROP_THRESHOLD,
    DEFAULT_PROBABILITY_SCALE, DEFAULT_TEMPORAL_SCALE, EMBEDDING_DIM, REFERENCE_FACE_AREA,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    ThresholdOrder(String),
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Tunable parameters for PFE construction, scoring and clustering.
///
/// Every field falls back to its default when absent from the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub embedding_dim: usize,
    pub min_sigma_sq: f64,
    pub max_sigma_sq: f64,
    pub reference_area: f64,
    pub mls_drop_threshold: f64,
    pub temporal_scale: f64,
    pub probability_scale: f64,
    pub thresholds: Thresholds,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            embedding_dim: EMBEDDING_DIM,
            min_sigma_sq: DEFAULT_MIN_SIGMA_SQ,
            max_sigma_sq: DEFAULT_MAX_SIGMA_SQ,
            reference_area: REFERENCE_FACE_AREA,
            mls_drop_threshold: DEFAULT_MLS_DROP_THRESHOLD,
            temporal_scale: DEFAULT_TEMPORAL_SCALE,
            probability_scale: DEFAULT_PROBABILITY_SCALE,
            thresholds: Thresholds::DEFAULT,
        }
    }
}

impl ClusterConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidValue(
                "embedding_dim must be positive".into(),
            ));
        }
        if !(self.min_sigma_sq > 0.0 && self.min_sigma_sq < self.max_sigma_sq)
            || !self.max_sigma_sq.is_finite()
        {
            return Err(ConfigError::InvalidValue(format!(
                "need 0 < min_sigma_sq < max_sigma_sq, got {} and {}",
                self.min_sigma_sq, self.max_sigma_sq
            )));
        }
        for (name, value) in [
            ("reference_area", self.reference_area),
            ("mls_drop_threshold", self.mls_drop_threshold),
            ("probability_scale", self.probability_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.temporal_scale.is_finite() && self.temporal_scale >= 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "temporal_scale must be non-negative, got {}",
                self.temporal_scale
            )));
        }
        self.thresholds
            .validate()
            .map_err(ConfigError::ThresholdOrder)
    }
}
