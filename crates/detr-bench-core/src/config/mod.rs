//! Configuration management for detr-bench.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default` with the reference benchmark's
//! values (800 / 1333 / 1344, ImageNet statistics).

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Resize/normalize/pad settings
    pub preprocess: PreprocessConfig,

    /// ONNX Runtime settings
    pub inference: InferenceConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Pipeline settings
    pub pipeline: PipelineConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.detr-bench.detr-bench/config.toml
    /// - Linux: ~/.config/detr-bench/config.toml
    ///
    /// Falls back to ~/.detr-bench/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "detr-bench", "detr-bench")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".detr-bench").join("config.toml")
            })
    }

    /// Get the resolved model path (with ~ expansion).
    pub fn model_path(&self) -> PathBuf {
        expand(&self.general.model_path)
    }

    /// Get the resolved result directory (with ~ expansion).
    pub fn result_dir(&self) -> PathBuf {
        expand(&self.output.result_dir)
    }

    /// Get the resolved latency report directory (with ~ expansion).
    pub fn time_dir(&self) -> PathBuf {
        expand(&self.output.time_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
