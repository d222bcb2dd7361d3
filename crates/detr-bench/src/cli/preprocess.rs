//! The `detr-bench preprocess` command: run the preprocessing chain on one
//! image and print what the model would receive.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use detr_bench_core::pipeline::{ImageDecoder, Validator};
use detr_bench_core::preprocess::{to_channels_first, Padding, PreprocessPipeline};
use detr_bench_core::Config;
use serde::Serialize;

use super::{load_config, SizeArgs};

/// Arguments for the `preprocess` command.
#[derive(Args, Debug)]
pub struct PreprocessArgs {
    /// Image file to preprocess
    #[arg(required = true)]
    pub input: PathBuf,

    /// Config file (defaults to the platform config location)
    #[arg(long, env = "DETR_BENCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub size: SizeArgs,
}

/// Geometry of one preprocessed image.
#[derive(Debug, Serialize)]
pub struct PreprocessReport {
    pub file_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub target_height: u32,
    pub target_width: u32,
    pub canvas_size: u32,
    pub pad_right: i64,
    pub pad_bottom: i64,
    pub padded_cells: usize,
    pub tensor_shape: Vec<usize>,
    pub preprocess_ms: f64,
}

/// Execute the preprocess command.
pub async fn execute(args: PreprocessArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    args.size.apply(&mut config.preprocess);
    config.preprocess.validate()?;

    let report = preprocess_file(&config, &args.input).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn preprocess_file(config: &Config, path: &Path) -> anyhow::Result<PreprocessReport> {
    Validator::new(config.limits.clone()).validate(path)?;
    let decoded = ImageDecoder::new(config.limits.clone())
        .decode(path)
        .await?;
    let pipeline = PreprocessPipeline::from_config(&config.preprocess)?;

    let start = Instant::now();
    let result = pipeline.run(&decoded.image)?;
    let nchw = to_channels_first(&result.image);
    let preprocess_ms = start.elapsed().as_secs_f64() * 1000.0;

    let padding = Padding::to_canvas(result.target, pipeline.canvas_size());
    Ok(PreprocessReport {
        file_path: path.to_path_buf(),
        width: decoded.width,
        height: decoded.height,
        target_height: result.target.height(),
        target_width: result.target.width(),
        canvas_size: pipeline.canvas_size(),
        pad_right: padding.right,
        pad_bottom: padding.bottom,
        padded_cells: result.mask.padded_cells(),
        tensor_shape: nchw.shape().to_vec(),
        preprocess_ms,
    })
}
