//! Error types for the detr-bench preprocessing and inference pipeline.
//!
//! Preprocessing errors are organized by stage so a failure names the step
//! that rejected the image. Driver-level errors carry the file path.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for detr-bench operations.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Size bounds violate `0 < min_size <= max_size`
    #[error("Invalid size bounds: min_size={min_size}, max_size={max_size}")]
    InvalidSizeBound { min_size: u32, max_size: u32 },

    /// Canvas edge must be positive
    #[error("Invalid canvas size: {0}")]
    InvalidCanvas(u32),
}

/// Resize stage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResizeError {
    /// Source image has no pixels
    #[error("Cannot resize an empty image ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    /// Requested output has a zero dimension
    #[error("Invalid resize target {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },
}

/// Normalize stage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Mean/std arity does not match the image channel count
    #[error("Channel mismatch: image has {channels} channels, mean has {mean}, std has {std}")]
    ChannelMismatch {
        channels: usize,
        mean: usize,
        std: usize,
    },
}

/// Pad stage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PadError {
    /// A computed pad amount was negative (canvas smaller than the image)
    #[error("Negative padding (left={left}, top={top}, right={right}, bottom={bottom})")]
    NegativePadding {
        left: i64,
        top: i64,
        right: i64,
        bottom: i64,
    },
}

/// Mask stage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    /// Canvas has zero area
    #[error("Mask canvas must be non-empty")]
    EmptyCanvas,

    /// Valid region does not fit inside the canvas
    #[error("Valid region {height}x{width} exceeds canvas {canvas}")]
    RegionOutOfBounds { height: u32, width: u32, canvas: u32 },
}

/// Preprocessing failure, wrapping the first stage that failed.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Config: {0}")]
    Config(#[from] ConfigError),

    #[error("Resize: {0}")]
    Resize(#[from] ResizeError),

    #[error("Normalize: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Pad: {0}")]
    Pad(#[from] PadError),

    #[error("Mask: {0}")]
    Mask(#[from] MaskError),
}

/// Driver errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Resize/normalize/pad/mask failed
    #[error("Preprocessing failed for {path}: {source}")]
    Preprocess {
        path: PathBuf,
        #[source]
        source: PreprocessError,
    },

    /// Model loading or inference failed
    #[error("Inference failed for {path}: {message}")]
    Inference { path: PathBuf, message: String },

    /// Writing result tensors failed
    #[error("Failed to write results for {path}: {message}")]
    Output { path: PathBuf, message: String },

    /// A background task for a stage panicked or was cancelled
    #[error("{stage} task failed for {path}: {message}")]
    Task {
        path: PathBuf,
        stage: String,
        message: String,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Convenience type alias for detr-bench results.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
