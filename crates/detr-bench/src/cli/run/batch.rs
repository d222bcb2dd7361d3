//! Benchmark loop with progress, record output, and the closing summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use detr_bench_core::{
    BenchRecord, BenchSummary, DiscoveredFile, FileDiscovery, ImageOutcome, OutputFormat,
    OutputWriter,
};

use super::{RunArgs, RunContext};

/// Benchmark every discovered file, streaming records as they complete.
pub async fn run_batch(
    ctx: RunContext,
    args: &RunArgs,
    files: Vec<DiscoveredFile>,
) -> anyhow::Result<()> {
    let total_bytes = FileDiscovery::total_size(&files);
    let progress = create_progress_bar(files.len() as u64);

    // JSONL to stdout streams; everything else is written once the run ends.
    let stream_stdout = args.output.is_none() && ctx.output_format == OutputFormat::JsonLines;
    let mut records: Vec<BenchRecord> = Vec::new();

    let result = ctx
        .runner
        .run(&files, |outcome| {
            if let ImageOutcome::Completed(record) = outcome {
                progress.set_message(format!("{:.1} ms", record.inference_ms));
                if stream_stdout {
                    match serde_json::to_string(record) {
                        Ok(line) => progress.suspend(|| println!("{line}")),
                        Err(e) => tracing::warn!("Failed to serialize record: {e}"),
                    }
                } else {
                    records.push(record.without_data());
                }
            }
            progress.inc(1);
        })
        .await;

    progress.finish_and_clear();
    let summary = result?;

    if let Some(output_path) = &args.output {
        write_records(output_path, ctx.output_format, ctx.config.output.pretty, &records)?;
        tracing::info!("Records written to {:?}", output_path);
    } else if !stream_stdout && !records.is_empty() {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    print_summary(&summary, total_bytes);
    Ok(())
}

fn write_records(
    path: &Path,
    format: OutputFormat,
    pretty: bool,
    records: &[BenchRecord],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = OutputWriter::new(BufWriter::new(file), format, pretty);
    writer.write_all(records)?;
    writer.flush()?;
    Ok(())
}

/// Create a progress bar for the benchmark loop.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .map(|s| s.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the run.
fn print_summary(summary: &BenchSummary, total_bytes: u64) {
    let total = summary.succeeded + summary.failed;
    let rate = if summary.total_seconds > 0.0 {
        summary.succeeded as f64 / summary.total_seconds
    } else {
        0.0
    };
    let mb_read = total_bytes as f64 / 1_000_000.0;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Input:        {:>7.1} MB", mb_read);
    eprintln!("    Duration:     {:>7.1}s", summary.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("    Avg infer:    {:>7.2} ms", summary.average_inference_ms);
    eprintln!("    Infer count:  {:>8}", summary.infer_count);
    eprintln!("  ====================================");
}
