//! Serializable run configuration.

use orblab_core::engine::EngineConfig;
use orblab_core::strategy::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid strategy configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Everything needed to reproduce a backtest: a label, the bar data source,
/// and the full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Human-readable run label (a preset name or a free-form tag).
    pub name: String,

    /// CSV bar file. `None` means the caller supplies the series directly
    /// (presets, synthetic runs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,

    pub engine: EngineConfig,
}

impl RunConfig {
    /// Deterministic hash id for this configuration.
    ///
    /// Two runs with identical configs share a RunId, which is what artifact
    /// names key on.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Load and validate a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig =
            toml::from_str(&text).map_err(|source| ConfigFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.engine.strategy.validate()?;
        Ok(config)
    }
}
