//! ONNX Runtime session management and inference.
//!
//! Loads a detector exported to ONNX with two inputs (image, mask) and
//! returns every graph output as an f32 tensor.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::config::InferenceConfig;
use crate::error::PipelineError;
use crate::preprocess::Mask;
use crate::types::OutputTensor;

use super::{check_input_sizes, InferenceBackend};

/// Input names used when the model metadata lists fewer than two inputs.
const FALLBACK_INPUT_NAMES: [&str; 2] = ["img", "mask"];

/// Wraps an ONNX Runtime session for the detector.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`, which also
/// keeps inference to one call at a time.
pub struct OrtBackend {
    session: Mutex<Session>,
    image_input: String,
    mask_input: String,
    canvas_size: usize,
}

impl OrtBackend {
    /// Load a detector from an ONNX file.
    pub fn load(
        model_path: &Path,
        config: &InferenceConfig,
        canvas_size: u32,
    ) -> Result<Self, PipelineError> {
        if !model_path.exists() {
            return Err(PipelineError::Inference {
                path: model_path.to_path_buf(),
                message: "Model not found. Set general.model_path or pass --model.".to_string(),
            });
        }

        let load_err = |e: &dyn std::fmt::Display, what: &str| PipelineError::Inference {
            path: model_path.to_path_buf(),
            message: format!("{what}: {e}"),
        };

        let session = Session::builder()
            .map_err(|e| load_err(&e, "Failed to create ONNX session builder"))?
            .with_optimization_level(optimization_level(config.optimization_level))
            .map_err(|e| load_err(&e, "Failed to set optimization level"))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| load_err(&e, "Failed to set intra-op threads"))?
            .commit_from_file(model_path)
            .map_err(|e| load_err(&e, "Failed to load ONNX model"))?;

        // Input order follows the export: image first, mask second.
        let names: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        let image_input = names
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_INPUT_NAMES[0].to_string());
        let mask_input = names
            .get(1)
            .cloned()
            .unwrap_or_else(|| FALLBACK_INPUT_NAMES[1].to_string());

        tracing::debug!(
            "Loaded detector from {:?} (inputs: {:?}, {:?}; outputs: {:?})",
            model_path,
            image_input,
            mask_input,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            image_input,
            mask_input,
            canvas_size: canvas_size as usize,
        })
    }

    /// Names of the (image, mask) graph inputs.
    pub fn input_names(&self) -> (&str, &str) {
        (&self.image_input, &self.mask_input)
    }
}

fn optimization_level(level: u8) -> GraphOptimizationLevel {
    match level {
        0 => GraphOptimizationLevel::Disable,
        1 => GraphOptimizationLevel::Level1,
        2 => GraphOptimizationLevel::Level2,
        _ => GraphOptimizationLevel::Level3,
    }
}

impl InferenceBackend for OrtBackend {
    fn name(&self) -> &str {
        "onnxruntime"
    }

    fn infer(
        &self,
        image: &Array4<f32>,
        mask: &Mask,
        path: &Path,
    ) -> Result<Vec<OutputTensor>, PipelineError> {
        check_input_sizes(image, mask, self.canvas_size, path)?;

        let infer_err = |message: String| PipelineError::Inference {
            path: path.to_path_buf(),
            message,
        };

        let image_shape: Vec<i64> = image.shape().iter().map(|&d| d as i64).collect();
        let image_data: Vec<f32> = image.iter().copied().collect();
        let image_value = Tensor::from_array((image_shape, image_data))
            .map_err(|e| infer_err(format!("Failed to create image tensor: {e}")))?;

        let side = self.canvas_size as i64;
        let mask_value = Tensor::from_array((vec![1, side, side], mask.to_vec()))
            .map_err(|e| infer_err(format!("Failed to create mask tensor: {e}")))?;

        let inputs = ort::inputs![
            self.image_input.as_str() => image_value,
            self.mask_input.as_str() => mask_value
        ];

        let mut session = self
            .session
            .lock()
            .map_err(|e| infer_err(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| infer_err(format!("ONNX inference failed: {e}")))?;

        let mut tensors = Vec::new();
        for (name, value) in outputs.iter() {
            let (shape, data) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| infer_err(format!("Failed to extract output {name:?}: {e}")))?;
            tensors.push(OutputTensor {
                name: name.to_string(),
                shape: shape.to_vec(),
                data: data.to_vec(),
            });
        }

        Ok(tensors)
    }
}
