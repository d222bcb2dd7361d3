//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, PreprocessConfig};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.preprocess.validate()?;
        if self.inference.intra_threads == 0 {
            return Err(ConfigError::ValidationError(
                "inference.intra_threads must be > 0".into(),
            ));
        }
        if self.inference.optimization_level > 3 {
            return Err(ConfigError::ValidationError(
                "inference.optimization_level must be between 0 and 3".into(),
            ));
        }
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

impl PreprocessConfig {
    /// Validate size bounds, canvas and normalization statistics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size == 0 {
            return Err(ConfigError::ValidationError(
                "preprocess.min_size must be > 0".into(),
            ));
        }
        if self.max_size < self.min_size {
            return Err(ConfigError::ValidationError(
                "preprocess.max_size must be >= preprocess.min_size".into(),
            ));
        }
        if self.canvas_size == 0 {
            return Err(ConfigError::ValidationError(
                "preprocess.canvas_size must be > 0".into(),
            ));
        }
        if self.mean.len() != 3 || self.std.len() != 3 {
            return Err(ConfigError::ValidationError(
                "preprocess.mean and preprocess.std must have 3 entries (RGB)".into(),
            ));
        }
        if self.std.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
            return Err(ConfigError::ValidationError(
                "preprocess.std values must be finite and > 0".into(),
            ));
        }
        if self.canvas_size < self.max_size {
            tracing::warn!(
                "preprocess.canvas_size ({}) is below max_size ({}); \
                 images whose long edge exceeds the canvas will fail to pad",
                self.canvas_size,
                self.max_size
            );
        }
        Ok(())
    }
}
