//! Model execution for preprocessed image/mask pairs.
//!
//! The runner only sees the [`InferenceBackend`] trait: two input tensors in,
//! a list of output tensors out. [`OrtBackend`] is the ONNX Runtime
//! implementation used by the CLI.
//!
//! # Usage
//!
//! ```rust,ignore
//! use detr_bench_core::inference::{InferenceBackend, OrtBackend};
//! use detr_bench_core::Config;
//!
//! let config = Config::default();
//! let backend = OrtBackend::load(&config.model_path(), &config.inference, 1344)?;
//! let outputs = backend.infer(&nchw, &mask, path)?;
//! ```

pub(crate) mod ort_backend;

use std::path::Path;

use ndarray::Array4;

use crate::error::PipelineError;
use crate::preprocess::Mask;
use crate::types::OutputTensor;

pub use self::ort_backend::OrtBackend;

/// Anything that can run the detector on one image.
///
/// Implementations may be called from several tasks but must run at most one
/// inference at a time.
pub trait InferenceBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Run the model on an NCHW image tensor `[1, 3, C, C]` and its
    /// `[C, C]` occupancy mask.
    fn infer(
        &self,
        image: &Array4<f32>,
        mask: &Mask,
        path: &Path,
    ) -> Result<Vec<OutputTensor>, PipelineError>;
}

/// Check that both inputs match the canvas the model was exported for.
///
/// The engine accepts raw buffers, so a size mismatch would otherwise be
/// read past or truncated silently.
pub fn check_input_sizes(
    image: &Array4<f32>,
    mask: &Mask,
    canvas_size: usize,
    path: &Path,
) -> Result<(), PipelineError> {
    let expected_image = [1, 3, canvas_size, canvas_size];
    if image.shape() != expected_image.as_slice() {
        return Err(PipelineError::Inference {
            path: path.to_path_buf(),
            message: format!(
                "Image tensor shape {:?} does not match model input {:?}",
                image.shape(),
                expected_image
            ),
        });
    }
    if mask.canvas_size() != canvas_size {
        return Err(PipelineError::Inference {
            path: path.to_path_buf(),
            message: format!(
                "Mask canvas {} does not match model input {}",
                mask.canvas_size(),
                canvas_size
            ),
        });
    }
    Ok(())
}
