//! The `detr-bench run` command.

mod batch;
mod setup;
pub mod types;

pub use types::OutputFormat;

use clap::Args;
use detr_bench_core::{BenchRunner, Config, OutputFormat as CoreOutputFormat};
use std::path::PathBuf;

use super::SizeArgs;
use batch::run_batch;
use setup::setup_runner;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image file or directory to benchmark
    #[arg(required = true)]
    pub input: PathBuf,

    /// ONNX model file (overrides general.model_path)
    #[arg(short, long, env = "DETR_BENCH_MODEL")]
    pub model: Option<PathBuf>,

    /// Config file (defaults to the platform config location)
    #[arg(long, env = "DETR_BENCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub size: SizeArgs,

    /// Number of decode/preprocess workers; 1 keeps the run strictly sequential
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// ONNX Runtime intra-op threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Log failed images and keep going instead of aborting the run
    #[arg(long)]
    pub continue_on_error: bool,

    /// Directory for raw output tensors (overrides output.result_dir)
    #[arg(long)]
    pub result_dir: Option<PathBuf>,

    /// Directory for the latency report (overrides output.time_dir)
    #[arg(long)]
    pub time_dir: Option<PathBuf>,

    /// Don't dump raw output tensors
    #[arg(long)]
    pub no_results: bool,

    /// Write per-image records to this file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Per-image record format (defaults to output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Manual Default impl for constructing RunArgs outside of clap.
impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            model: None,
            config: None,
            size: SizeArgs::default(),
            parallel: None,
            threads: None,
            continue_on_error: false,
            result_dir: None,
            time_dir: None,
            no_results: false,
            output: None,
            format: None,
        }
    }
}

/// Everything assembled by `setup_runner()`.
pub(crate) struct RunContext {
    pub runner: BenchRunner,
    pub output_format: CoreOutputFormat,
    pub config: Config,
}

/// Execute the run command.
pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let ctx = setup_runner(&args)?;

    let files = ctx.runner.discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to benchmark", files.len());

    run_batch(ctx, &args, files).await
}
