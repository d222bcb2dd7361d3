//! detr-bench core - preprocessing and latency benchmarking for DETR-style
//! detectors exported with a fixed square input.
//!
//! Every image is scaled so its short edge hits `min_size` without the long
//! edge passing `max_size`, normalized with ImageNet statistics, padded into
//! a `canvas x canvas` buffer, and paired with a mask marking the padding.
//!
//! ```text
//! Image → Decode → Resolve → Resize → Normalize → Pad + Mask → NCHW → Infer (timed) → .bin
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use detr_bench_core::{BenchRunner, Config, OrtBackend, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> detr_bench_core::Result<()> {
//!     let config = Config::load()?;
//!     let backend = OrtBackend::load(
//!         &config.model_path(),
//!         &config.inference,
//!         config.preprocess.canvas_size,
//!     )?;
//!     let runner = BenchRunner::new(&config, Arc::new(backend), RunOptions::default())?;
//!
//!     let files = runner.discover("./val2017".as_ref());
//!     let summary = runner.run(&files, |_| {}).await?;
//!     println!("{:.2} ms over {} images", summary.average_inference_ms, summary.infer_count);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod timing;
pub mod types;

pub use config::{Config, FailurePolicy};
pub use error::{
    BenchError, ConfigError, MaskError, NormalizeError, PadError, PipelineError, PipelineResult,
    PreprocessError, ResizeError, Result,
};
pub use inference::{InferenceBackend, OrtBackend};
pub use output::{OutputFormat, OutputWriter, ResultWriter};
pub use pipeline::{
    BenchRunner, DiscoveredFile, FileDiscovery, ImageDecoder, ImageOutcome, PreparedImage,
    RunOptions,
};
pub use preprocess::{Mask, PreprocessPipeline, PreprocessResult, SizeBound, TargetSize};
pub use timing::LatencyRecorder;
pub use types::{BenchRecord, BenchSummary, OutputTensor};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_config_matches_reference_network() {
        let config = Config::default();
        assert_eq!(config.preprocess.min_size, 800);
        assert_eq!(config.preprocess.max_size, 1333);
        assert_eq!(config.preprocess.canvas_size, 1344);
        assert_eq!(config.processing.parallel_workers, 1);
        assert_eq!(config.processing.failure_policy, FailurePolicy::Abort);
    }
}
