//! detr-bench CLI - latency benchmark for fixed-shape DETR inference.
//!
//! Every image is resized, normalized, padded into a square canvas and paired
//! with a padding mask before being fed to an ONNX model. Only the model call
//! is timed; the average lands in `time_Result/test_perform_static.txt` and
//! the raw outputs in `result_Files/`.
//!
//! # Usage
//!
//! ```bash
//! # Benchmark a validation set
//! detr-bench run ./val2017 --model detr.onnx
//!
//! # Inspect how one image is preprocessed
//! detr-bench preprocess ./val2017/000000000139.jpg
//!
//! # View configuration
//! detr-bench config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// detr-bench - Resize/pad/mask preprocessing and inference latency benchmark.
#[derive(Parser, Debug)]
#[command(name = "detr-bench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the latency benchmark over an image or directory
    Run(cli::run::RunArgs),

    /// Preprocess a single image and print the resulting geometry
    Preprocess(cli::preprocess::PreprocessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match detr_bench_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `detr-bench config path`."
            );
            detr_bench_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("detr-bench v{}", detr_bench_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Preprocess(args) => cli::preprocess::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
