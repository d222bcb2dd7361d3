//! Command handlers.

pub mod config;
pub mod preprocess;
pub mod run;

use std::path::{Path, PathBuf};

use clap::Args;
use detr_bench_core::config::PreprocessConfig;
use detr_bench_core::Config;

/// Preprocessing overrides shared by `run` and `preprocess`.
#[derive(Args, Debug, Default, Clone)]
pub struct SizeArgs {
    /// Target short edge in pixels (overrides preprocess.min_size)
    #[arg(long)]
    pub min_size: Option<u32>,

    /// Long edge cap in pixels (overrides preprocess.max_size)
    #[arg(long)]
    pub max_size: Option<u32>,

    /// Square canvas edge the model was exported with (overrides preprocess.canvas_size)
    #[arg(long)]
    pub canvas_size: Option<u32>,
}

impl SizeArgs {
    pub fn apply(&self, preprocess: &mut PreprocessConfig) {
        if let Some(min_size) = self.min_size {
            preprocess.min_size = min_size;
        }
        if let Some(max_size) = self.max_size {
            preprocess.max_size = max_size;
        }
        if let Some(canvas_size) = self.canvas_size {
            preprocess.canvas_size = canvas_size;
        }
    }
}

/// Load the config from `--config` if given, otherwise the default location.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(&expand_path(path))?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_args_override_only_given_fields() {
        let mut preprocess = PreprocessConfig::default();
        let args = SizeArgs {
            min_size: Some(600),
            max_size: None,
            canvas_size: Some(1024),
        };
        args.apply(&mut preprocess);

        assert_eq!(preprocess.min_size, 600);
        assert_eq!(preprocess.max_size, 1333);
        assert_eq!(preprocess.canvas_size, 1024);
    }

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        std::fs::write(&path, "[preprocess]\nmin_size = 512\nmax_size = 1024\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.preprocess.min_size, 512);
        assert_eq!(config.preprocess.max_size, 1024);
    }

    #[test]
    fn load_config_missing_explicit_path_fails() {
        assert!(load_config(Some(Path::new("/nonexistent/bench.toml"))).is_err());
    }

    #[test]
    fn expand_path_leaves_plain_paths() {
        assert_eq!(
            expand_path(Path::new("./val2017")),
            PathBuf::from("./val2017")
        );
    }
}
