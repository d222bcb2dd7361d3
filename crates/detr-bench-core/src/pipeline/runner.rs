//! Benchmark orchestration: validate, decode, preprocess, timed inference,
//! result dump, latency report.
//!
//! Only the inference call sits inside the timing window. With one worker
//! every image goes through the whole chain before the next one starts. With
//! more, decode and preprocessing for upcoming images run on a bounded pool
//! while a single consumer feeds the model in input order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use ndarray::Array4;
use tokio::task::{JoinError, JoinHandle};

use crate::config::{Config, FailurePolicy, PipelineConfig};
use crate::error::{ConfigError, PipelineError, PipelineResult, PreprocessError};
use crate::inference::InferenceBackend;
use crate::output::ResultWriter;
use crate::preprocess::{to_channels_first, Mask, PreprocessPipeline, TargetSize};
use crate::timing::{LatencyRecorder, SampleTiming};
use crate::types::{BenchRecord, BenchSummary};

use super::channel::bounded_channel;
use super::decode::ImageDecoder;
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::validate::Validator;

/// Options for controlling what a run writes to disk.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip dumping raw output tensors
    pub skip_results: bool,
    /// Skip writing the latency report
    pub skip_report: bool,
}

/// Model-ready inputs for one image.
#[derive(Debug)]
pub struct PreparedImage {
    pub path: PathBuf,
    /// Source width in pixels
    pub width: u32,
    /// Source height in pixels
    pub height: u32,
    pub target: TargetSize,
    /// NCHW image tensor `[1, 3, C, C]`
    pub image: Array4<f32>,
    pub mask: Mask,
    pub preprocess_ms: f64,
}

/// Per-image outcome, reported to the caller as the run progresses.
#[derive(Debug)]
pub enum ImageOutcome<'a> {
    Completed(&'a BenchRecord),
    Failed {
        path: &'a Path,
        error: &'a PipelineError,
    },
}

/// Everything needed to turn a path into a [`PreparedImage`].
struct Preparer {
    validator: Validator,
    decoder: ImageDecoder,
    preprocess: PreprocessPipeline,
}

impl Preparer {
    async fn prepare(&self, path: &Path) -> Result<PreparedImage, PipelineError> {
        let start = Instant::now();
        tracing::debug!("Preparing: {:?}", path);

        self.validator.validate(path)?;
        let decoded = self.decoder.decode(path).await?;
        tracing::trace!("  Decode: {:?}", start.elapsed());

        let (width, height) = (decoded.width, decoded.height);
        let preprocess = self.preprocess.clone();
        let (result, image) = tokio::task::spawn_blocking(move || {
            let result = preprocess.run(&decoded.image)?;
            let nchw = to_channels_first(&result.image);
            Ok::<_, PreprocessError>((result, nchw))
        })
        .await
        .map_err(|e| task_failed(path, "preprocess", &e))?
        .map_err(|source| PipelineError::Preprocess {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(PreparedImage {
            path: path.to_path_buf(),
            width,
            height,
            target: result.target,
            image,
            mask: result.mask,
            preprocess_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[derive(Default)]
struct RunState {
    recorder: LatencyRecorder,
    succeeded: usize,
    failed: usize,
}

/// Drives a benchmark over a set of images against one inference backend.
pub struct BenchRunner {
    preparer: Arc<Preparer>,
    backend: Arc<dyn InferenceBackend>,
    discovery: FileDiscovery,
    results: ResultWriter,
    time_dir: PathBuf,
    pipeline: PipelineConfig,
    parallel_workers: usize,
    failure_policy: FailurePolicy,
    options: RunOptions,
}

impl BenchRunner {
    /// Build a runner from configuration.
    ///
    /// Fails if the preprocessing section describes an invalid size bound or
    /// canvas.
    pub fn new(
        config: &Config,
        backend: Arc<dyn InferenceBackend>,
        options: RunOptions,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            preparer: Arc::new(Preparer {
                validator: Validator::new(config.limits.clone()),
                decoder: ImageDecoder::new(config.limits.clone()),
                preprocess: PreprocessPipeline::from_config(&config.preprocess)?,
            }),
            backend,
            discovery: FileDiscovery::new(&config.processing),
            results: ResultWriter::new(config.result_dir()),
            time_dir: config.time_dir(),
            pipeline: config.pipeline.clone(),
            parallel_workers: config.processing.parallel_workers.max(1),
            failure_policy: config.processing.failure_policy,
            options,
        })
    }

    /// Discover all image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }

    /// Decode and preprocess a single image without running inference.
    pub async fn prepare(&self, path: &Path) -> PipelineResult<PreparedImage> {
        self.preparer.prepare(path).await
    }

    /// Run the benchmark over `files` in order.
    ///
    /// `on_outcome` sees every image as it settles. Under
    /// [`FailurePolicy::Abort`] the first failure ends the run with that
    /// error and no report is written.
    pub async fn run<F>(
        &self,
        files: &[DiscoveredFile],
        mut on_outcome: F,
    ) -> PipelineResult<BenchSummary>
    where
        F: FnMut(ImageOutcome<'_>),
    {
        let start = Instant::now();
        let mut state = RunState::default();

        tracing::info!(
            "Benchmarking {} image(s) on {} ({} worker(s), canvas {})",
            files.len(),
            self.backend.name(),
            self.parallel_workers,
            self.preparer.preprocess.canvas_size()
        );

        if self.parallel_workers <= 1 {
            self.run_sequential(files, &mut state, &mut on_outcome)
                .await?;
        } else {
            self.run_pipelined(files, &mut state, &mut on_outcome)
                .await?;
        }

        tracing::info!("{}", state.recorder.report());
        if !self.options.skip_report {
            let path = state.recorder.write_report(&self.time_dir).map_err(|e| {
                PipelineError::Output {
                    path: self.time_dir.clone(),
                    message: e.to_string(),
                }
            })?;
            tracing::info!("Latency report written to {:?}", path);
        }

        Ok(BenchSummary {
            succeeded: state.succeeded,
            failed: state.failed,
            average_inference_ms: state.recorder.average_ms(),
            infer_count: state.recorder.count(),
            total_seconds: start.elapsed().as_secs_f64(),
        })
    }

    async fn run_sequential<F>(
        &self,
        files: &[DiscoveredFile],
        state: &mut RunState,
        on_outcome: &mut F,
    ) -> Result<(), PipelineError>
    where
        F: FnMut(ImageOutcome<'_>),
    {
        for file in files {
            let outcome = match self.preparer.prepare(&file.path).await {
                Ok(prepared) => self.infer(prepared, &mut state.recorder).await,
                Err(e) => Err(e),
            };
            self.settle(&file.path, outcome, state, on_outcome)?;
        }
        Ok(())
    }

    async fn run_pipelined<F>(
        &self,
        files: &[DiscoveredFile],
        state: &mut RunState,
        on_outcome: &mut F,
    ) -> Result<(), PipelineError>
    where
        F: FnMut(ImageOutcome<'_>),
    {
        let (tx, mut rx) = bounded_channel(&self.pipeline);
        let preparer = Arc::clone(&self.preparer);
        let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
        let workers = self.parallel_workers;

        let producer = tokio::spawn(async move {
            // `buffered` keeps input order while up to `workers` images prepare.
            let mut prepared = futures_util::stream::iter(paths)
                .map(|path| {
                    let preparer = Arc::clone(&preparer);
                    async move {
                        let result = preparer.prepare(&path).await;
                        (path, result)
                    }
                })
                .buffered(workers);

            while let Some(item) = prepared.next().await {
                if tx.send(item).await.is_err() {
                    // Consumer stopped, stop preparing
                    break;
                }
            }
        });

        let mut received = 0;
        while let Some((path, prepared)) = rx.recv().await {
            received += 1;
            let outcome = match prepared {
                Ok(prepared) => self.infer(prepared, &mut state.recorder).await,
                Err(e) => Err(e),
            };
            if let Err(e) = self.settle(&path, outcome, state, on_outcome) {
                producer.abort();
                return Err(e);
            }
        }

        // The channel only closes early if the producer died.
        let next = files.get(received).map(|f| f.path.as_path());
        await_producer(producer, next).await
    }

    /// Timed inference plus result dump for one prepared image.
    async fn infer(
        &self,
        prepared: PreparedImage,
        recorder: &mut LatencyRecorder,
    ) -> Result<BenchRecord, PipelineError> {
        let PreparedImage {
            path,
            width,
            height,
            target,
            image,
            mask,
            preprocess_ms,
        } = prepared;

        let backend = Arc::clone(&self.backend);
        let infer_path = path.clone();
        let (outputs, timing) = tokio::task::spawn_blocking(move || {
            SampleTiming::measure(|| backend.infer(&image, &mask, &infer_path))
        })
        .await
        .map_err(|e| task_failed(&path, "inference", &e))?;
        let outputs = outputs?;
        recorder.record(timing);
        tracing::debug!(
            "Inferred {:?} in {:.3} ms ({} output(s))",
            path,
            timing.duration_ms(),
            outputs.len()
        );

        if !self.options.skip_results {
            self.results.write(&path, &outputs)?;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(BenchRecord {
            file_path: path,
            file_name,
            width,
            height,
            target_height: target.height(),
            target_width: target.width(),
            preprocess_ms,
            inference_ms: timing.duration_ms(),
            outputs,
        })
    }

    fn settle<F>(
        &self,
        path: &Path,
        outcome: Result<BenchRecord, PipelineError>,
        state: &mut RunState,
        on_outcome: &mut F,
    ) -> Result<(), PipelineError>
    where
        F: FnMut(ImageOutcome<'_>),
    {
        match outcome {
            Ok(record) => {
                state.succeeded += 1;
                on_outcome(ImageOutcome::Completed(&record));
                Ok(())
            }
            Err(error) => {
                state.failed += 1;
                on_outcome(ImageOutcome::Failed {
                    path,
                    error: &error,
                });
                match self.failure_policy {
                    FailurePolicy::Abort => {
                        tracing::error!("Aborting run: {}", error);
                        Err(error)
                    }
                    FailurePolicy::Skip => {
                        tracing::warn!("Skipping {:?}: {}", path, error);
                        Ok(())
                    }
                }
            }
        }
    }
}

fn task_failed(path: &Path, stage: &str, error: &JoinError) -> PipelineError {
    PipelineError::Task {
        path: path.to_path_buf(),
        stage: stage.to_string(),
        message: error.to_string(),
    }
}

/// Wait for the preparation task. A panic surfaces as an error against
/// `next`, the first image it never delivered.
async fn await_producer(producer: JoinHandle<()>, next: Option<&Path>) -> PipelineResult<()> {
    match producer.await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Preparation task failed: {}", e);
            Err(task_failed(next.unwrap_or(Path::new("")), "prepare", &e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreprocessConfig;
    use crate::inference::check_input_sizes;
    use crate::timing::REPORT_FILENAME;
    use crate::types::OutputTensor;
    use image::{ImageFormat, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CANVAS: u32 = 32;

    /// Returns the count of valid mask cells as its only output.
    struct FakeBackend {
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl InferenceBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        fn infer(
            &self,
            image: &Array4<f32>,
            mask: &Mask,
            path: &Path,
        ) -> Result<Vec<OutputTensor>, PipelineError> {
            check_input_sizes(image, mask, CANVAS as usize, path)?;
            self.calls.fetch_add(1, Ordering::SeqCst);
            let valid = (mask.canvas_size().pow(2) - mask.padded_cells()) as f32;
            Ok(vec![OutputTensor {
                name: "valid_cells".to_string(),
                shape: vec![1],
                data: vec![valid],
            }])
        }
    }

    fn test_config(root: &Path, workers: usize, policy: FailurePolicy) -> Config {
        let mut config = Config::default();
        config.preprocess = PreprocessConfig {
            min_size: 16,
            max_size: 24,
            canvas_size: CANVAS,
            ..PreprocessConfig::default()
        };
        config.processing.parallel_workers = workers;
        config.processing.failure_policy = policy;
        config.pipeline.buffer_size = 2;
        config.output.result_dir = root.join("result_Files");
        config.output.time_dir = root.join("time_Result");
        config
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, image::Rgb([120, 60, 200]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    fn setup_inputs(names: &[&str], broken: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("images");
        std::fs::create_dir_all(&input).unwrap();
        for name in names {
            write_png(&input.join(name), 20, 10);
        }
        if let Some(name) = broken {
            // Valid JPEG magic, truncated body
            std::fs::write(input.join(name), [0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_sequential_run_writes_results_and_report() {
        let dir = setup_inputs(&["a.png", "b.png", "c.png"], None);
        let config = test_config(dir.path(), 1, FailurePolicy::Abort);
        let backend = FakeBackend::new();
        let runner = BenchRunner::new(&config, backend.clone(), RunOptions::default()).unwrap();

        let files = runner.discover(&dir.path().join("images"));
        let mut records = Vec::new();
        let summary = runner
            .run(&files, |outcome| {
                if let ImageOutcome::Completed(record) = outcome {
                    records.push(record.clone());
                }
            })
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.infer_count, 3);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

        // 20x10 with bounds (16, 24): min shrinks to 12, target is 12x24
        let record = &records[0];
        assert_eq!((record.width, record.height), (20, 10));
        assert_eq!((record.target_height, record.target_width), (12, 24));
        assert_eq!(record.outputs[0].data, vec![(12 * 24) as f32]);

        let result_dir = dir.path().join("result_Files");
        for stem in ["a", "b", "c"] {
            let bin = result_dir.join(format!("{stem}_0.bin"));
            assert_eq!(std::fs::read(bin).unwrap().len(), 4);
        }

        let report =
            std::fs::read_to_string(dir.path().join("time_Result").join(REPORT_FILENAME)).unwrap();
        assert!(report.starts_with("NN inference cost average time: "));
        assert!(report.trim_end().ends_with("ms of infer_count 3"));
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let dir = setup_inputs(&["a.png", "c.png"], Some("b.jpg"));
        let config = test_config(dir.path(), 1, FailurePolicy::Abort);
        let backend = FakeBackend::new();
        let runner = BenchRunner::new(&config, backend.clone(), RunOptions::default()).unwrap();

        let files = runner.discover(&dir.path().join("images"));
        assert_eq!(files.len(), 3);

        let err = runner.run(&files, |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(!dir.path().join("time_Result").exists());
    }

    #[tokio::test]
    async fn test_skip_policy_continues() {
        let dir = setup_inputs(&["a.png", "c.png"], Some("b.jpg"));
        let config = test_config(dir.path(), 1, FailurePolicy::Skip);
        let runner = BenchRunner::new(&config, FakeBackend::new(), RunOptions::default()).unwrap();

        let files = runner.discover(&dir.path().join("images"));
        let mut failed_paths = Vec::new();
        let summary = runner
            .run(&files, |outcome| {
                if let ImageOutcome::Failed { path, .. } = outcome {
                    failed_paths.push(path.to_path_buf());
                }
            })
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.infer_count, 2);
        assert!(failed_paths[0].ends_with("b.jpg"));
    }

    #[tokio::test]
    async fn test_pipelined_run_keeps_input_order() {
        let names = ["a.png", "b.png", "c.png", "d.png", "e.png"];
        let dir = setup_inputs(&names, None);
        let config = test_config(dir.path(), 3, FailurePolicy::Abort);
        let options = RunOptions {
            skip_results: true,
            skip_report: true,
        };
        let runner = BenchRunner::new(&config, FakeBackend::new(), options).unwrap();

        let files = runner.discover(&dir.path().join("images"));
        let mut order = Vec::new();
        let summary = runner
            .run(&files, |outcome| {
                if let ImageOutcome::Completed(record) = outcome {
                    order.push(record.file_name.clone());
                }
            })
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 5);
        assert_eq!(order, names);
        assert!(!dir.path().join("result_Files").exists());
        assert!(!dir.path().join("time_Result").exists());
    }

    #[tokio::test]
    async fn test_pipelined_abort() {
        let dir = setup_inputs(&["a.png", "c.png", "d.png"], Some("b.jpg"));
        let config = test_config(dir.path(), 2, FailurePolicy::Abort);
        let backend = FakeBackend::new();
        let runner = BenchRunner::new(&config, backend.clone(), RunOptions::default()).unwrap();

        let files = runner.discover(&dir.path().join("images"));
        assert!(runner.run(&files, |_| {}).await.is_err());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prepare_produces_model_inputs() {
        let dir = setup_inputs(&["a.png"], None);
        let config = test_config(dir.path(), 1, FailurePolicy::Abort);
        let runner = BenchRunner::new(&config, FakeBackend::new(), RunOptions::default()).unwrap();

        let prepared = runner
            .prepare(&dir.path().join("images").join("a.png"))
            .await
            .unwrap();
        assert_eq!(prepared.image.shape(), &[1, 3, 32, 32]);
        assert_eq!(prepared.mask.valid_region(), (12, 24));
        // Padding is zero in every channel
        assert_eq!(prepared.image[[0, 1, 20, 30]], 0.0);
    }

    #[tokio::test]
    async fn test_producer_panic_is_an_error() {
        let producer = tokio::spawn(async {
            panic!("decoder blew up");
        });
        let err = await_producer(producer, Some(Path::new("/images/c.png")))
            .await
            .unwrap_err();
        match err {
            PipelineError::Task { path, stage, .. } => {
                assert_eq!(path, PathBuf::from("/images/c.png"));
                assert_eq!(stage, "prepare");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_producer_clean_exit_is_ok() {
        let producer = tokio::spawn(async {});
        assert!(await_producer(producer, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_join_failure_reports_its_stage() {
        let join_err = tokio::task::spawn_blocking(|| {
            panic!("resize panicked");
        })
        .await
        .unwrap_err();
        let err = task_failed(Path::new("a.png"), "preprocess", &join_err);
        assert!(matches!(
            &err,
            PipelineError::Task { stage, .. } if stage == "preprocess"
        ));
        assert!(err.to_string().starts_with("preprocess task failed for a.png"));
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut config = Config::default();
        config.preprocess.max_size = config.preprocess.min_size - 1;
        assert!(BenchRunner::new(&config, FakeBackend::new(), RunOptions::default()).is_err());
    }
}
