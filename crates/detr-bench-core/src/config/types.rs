//! Sub-configuration structs with defaults matching the reference benchmark.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Path to the exported ONNX model
    pub model_path: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("~/.detr-bench/models/detr.onnx"),
        }
    }
}

/// ImageNet channel means in RGB order.
pub const IMAGENET_MEAN: [f32; 3] = [123.675, 116.28, 103.53];

/// ImageNet channel standard deviations in RGB order.
pub const IMAGENET_STD: [f32; 3] = [58.395, 57.12, 57.375];

/// Resize/normalize/pad settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Target length of the shorter edge
    pub min_size: u32,

    /// Cap on the longer edge; wins over `min_size`
    pub max_size: u32,

    /// Edge of the square canvas images are padded into.
    /// The reference network uses `(max_size / 32 + 1) * 32`.
    pub canvas_size: u32,

    /// Per-channel mean (RGB)
    pub mean: Vec<f32>,

    /// Per-channel standard deviation (RGB)
    pub std: Vec<f32>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            min_size: 800,
            max_size: 1333,
            canvas_size: 1344,
            mean: IMAGENET_MEAN.to_vec(),
            std: IMAGENET_STD.to_vec(),
        }
    }
}

impl PreprocessConfig {
    /// Canvas edge the reference network derives from `max_size`.
    pub fn aligned_canvas(max_size: u32) -> u32 {
        (max_size / 32 + 1) * 32
    }
}

/// ONNX Runtime session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Intra-op thread count
    pub intra_threads: usize,

    /// Graph optimization level (0 = disabled .. 3 = all)
    pub optimization_level: u8,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            intra_threads: 4,
            optimization_level: 3,
        }
    }
}

/// What the runner does when one image fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole run on the first failure
    #[default]
    Abort,
    /// Log the failure, count it, and continue with the next image
    Skip,
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Images decoded and preprocessed concurrently. 1 keeps strict
    /// one-image-in-flight ordering.
    pub parallel_workers: usize,

    /// Supported input formats
    pub supported_formats: Vec<String>,

    /// Behavior on a per-image failure
    pub failure_policy: FailurePolicy,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 1,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
                "webp".to_string(),
            ],
            failure_policy: FailurePolicy::Abort,
        }
    }
}

/// Pipeline settings for backpressure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max preprocessed images buffered ahead of inference
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { buffer_size: 8 }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one `.bin` file per output tensor
    pub result_dir: PathBuf,

    /// Directory receiving the latency report
    pub time_dir: PathBuf,

    /// Per-image record format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_dir: PathBuf::from("./result_Files"),
            time_dir: PathBuf::from("./time_Result"),
            format: "jsonl".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
