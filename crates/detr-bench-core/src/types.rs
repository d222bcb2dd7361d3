//! Core data types for the benchmark pipeline.
//!
//! These types represent what inference produces and what the driver
//! records for each image.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One output tensor returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputTensor {
    /// Output name from the model graph
    pub name: String,

    /// Tensor shape
    pub shape: Vec<i64>,

    /// Flattened row-major values
    #[serde(skip)]
    pub data: Vec<f32>,
}

impl OutputTensor {
    /// Size of the raw little-endian payload in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// Per-image record written alongside the raw result tensors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchRecord {
    // === File Identification ===
    /// Path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    // === Geometry ===
    /// Original width in pixels
    pub width: u32,

    /// Original height in pixels
    pub height: u32,

    /// Height after resize, before padding
    pub target_height: u32,

    /// Width after resize, before padding
    pub target_width: u32,

    // === Timing ===
    /// Decode + preprocess + transpose time in milliseconds
    pub preprocess_ms: f64,

    /// Inference call time in milliseconds
    pub inference_ms: f64,

    // === Outputs ===
    /// Model outputs (names and shapes only)
    pub outputs: Vec<OutputTensor>,
}

impl BenchRecord {
    /// Copy of this record with every output's `data` left empty.
    pub fn without_data(&self) -> Self {
        Self {
            file_path: self.file_path.clone(),
            file_name: self.file_name.clone(),
            outputs: self
                .outputs
                .iter()
                .map(|t| OutputTensor {
                    name: t.name.clone(),
                    shape: t.shape.clone(),
                    data: Vec::new(),
                })
                .collect(),
            ..*self
        }
    }
}

/// Summary of a benchmark run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchSummary {
    /// Images that made it through inference
    pub succeeded: usize,

    /// Images that failed at any stage
    pub failed: usize,

    /// Mean inference latency in milliseconds
    pub average_inference_ms: f64,

    /// Number of timed inference calls
    pub infer_count: usize,

    /// Wall-clock duration of the whole run in seconds
    pub total_seconds: f64,
}
