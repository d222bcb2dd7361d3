//! Runner setup: config overrides, model loading.

use std::sync::Arc;

use detr_bench_core::config::FailurePolicy;
use detr_bench_core::{BenchRunner, Config, OrtBackend, OutputFormat as CoreOutputFormat, RunOptions};

use super::{RunArgs, RunContext};
use crate::cli::{expand_path, load_config};

/// Validate input, load config and model, and assemble the runner.
pub fn setup_runner(args: &RunArgs) -> anyhow::Result<RunContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate()?;

    let output_format = resolve_output_format(args, &config)?;

    let model_path = config.model_path();
    let backend = OrtBackend::load(&model_path, &config.inference, config.preprocess.canvas_size)
        .map_err(|e| {
            anyhow::anyhow!(
                "{e}\n\n  Hint: Export the detector to ONNX with a fixed {0}x{0} canvas and pass --model.",
                config.preprocess.canvas_size
            )
        })?;
    let (image_input, mask_input) = backend.input_names();
    tracing::info!(
        "Model loaded from {:?} (inputs: {}, {})",
        model_path,
        image_input,
        mask_input
    );

    let options = RunOptions {
        skip_results: args.no_results,
        skip_report: false,
    };
    let runner = BenchRunner::new(&config, Arc::new(backend), options)?;

    Ok(RunContext {
        runner,
        output_format,
        config,
    })
}

/// Fold CLI flags into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(model) = &args.model {
        config.general.model_path = expand_path(model);
    }
    args.size.apply(&mut config.preprocess);
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    if let Some(threads) = args.threads {
        config.inference.intra_threads = threads;
    }
    if args.continue_on_error {
        config.processing.failure_policy = FailurePolicy::Skip;
    }
    if let Some(dir) = &args.result_dir {
        config.output.result_dir = expand_path(dir);
    }
    if let Some(dir) = &args.time_dir {
        config.output.time_dir = expand_path(dir);
    }
}

fn resolve_output_format(args: &RunArgs, config: &Config) -> anyhow::Result<CoreOutputFormat> {
    if let Some(format) = args.format {
        return Ok(format.into());
    }
    CoreOutputFormat::parse(&config.output.format).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown output.format {:?} (expected \"json\" or \"jsonl\")",
            config.output.format
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::run::OutputFormat;
    use crate::cli::SizeArgs;
    use std::path::PathBuf;

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        let args = RunArgs {
            model: Some(PathBuf::from("/models/detr-r50.onnx")),
            size: SizeArgs {
                min_size: Some(640),
                max_size: Some(1066),
                canvas_size: Some(1088),
            },
            parallel: Some(4),
            threads: Some(8),
            continue_on_error: true,
            result_dir: Some(PathBuf::from("/tmp/out")),
            ..RunArgs::default()
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.model_path(), PathBuf::from("/models/detr-r50.onnx"));
        assert_eq!(config.preprocess.min_size, 640);
        assert_eq!(config.preprocess.max_size, 1066);
        assert_eq!(config.preprocess.canvas_size, 1088);
        assert_eq!(config.processing.parallel_workers, 4);
        assert_eq!(config.inference.intra_threads, 8);
        assert_eq!(config.processing.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.output.result_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.output.time_dir, PathBuf::from("./time_Result"));
    }

    #[test]
    fn no_overrides_keep_defaults() {
        let mut config = Config::default();
        apply_overrides(&mut config, &RunArgs::default());
        assert_eq!(config.preprocess.min_size, 800);
        assert_eq!(config.processing.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn output_format_flag_wins_over_config() {
        let config = Config::default();
        let args = RunArgs {
            format: Some(OutputFormat::Json),
            ..RunArgs::default()
        };
        assert_eq!(
            resolve_output_format(&args, &config).unwrap(),
            CoreOutputFormat::Json
        );
        assert_eq!(
            resolve_output_format(&RunArgs::default(), &config).unwrap(),
            CoreOutputFormat::JsonLines
        );
    }

    #[test]
    fn unknown_config_format_is_an_error() {
        let mut config = Config::default();
        config.output.format = "csv".to_string();
        assert!(resolve_output_format(&RunArgs::default(), &config).is_err());
    }

    #[test]
    fn missing_input_is_reported() {
        let args = RunArgs {
            input: PathBuf::from("/nonexistent/val2017"),
            ..RunArgs::default()
        };
        let err = setup_runner(&args).err().unwrap();
        assert!(err.to_string().contains("Input path does not exist"));
    }
}
