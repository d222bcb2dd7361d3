//! Per-sample inference latency bookkeeping and the average-latency report.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// File name of the latency report inside the time directory.
pub const REPORT_FILENAME: &str = "test_perform_static.txt";

/// Start/end instants of one inference call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTiming {
    pub start: Instant,
    pub end: Instant,
}

impl SampleTiming {
    /// Time `f` and pass its result through.
    pub fn measure<T>(f: impl FnOnce() -> T) -> (T, Self) {
        let start = Instant::now();
        let value = f();
        let timing = Self {
            start,
            end: Instant::now(),
        };
        (value, timing)
    }

    pub fn duration(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration().as_nanos() as f64 / 1_000_000.0
    }
}

/// Collects inference timings over a run.
#[derive(Debug, Default)]
pub struct LatencyRecorder {
    samples: Vec<SampleTiming>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timing: SampleTiming) {
        self.samples.push(timing);
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Mean latency in milliseconds, 0 when nothing was recorded.
    pub fn average_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: f64 = self.samples.iter().map(SampleTiming::duration_ms).sum();
        total / self.samples.len() as f64
    }

    /// One-line report with the average at 6 significant digits, e.g.
    /// `NN inference cost average time: 87.3125 ms of infer_count 5000`.
    pub fn report(&self) -> String {
        format!(
            "NN inference cost average time: {} ms of infer_count {}",
            significant(self.average_ms(), 6),
            self.count()
        )
    }

    /// Write the report to `dir/test_perform_static.txt`, truncating any
    /// previous report. Returns the written path.
    pub fn write_report(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILENAME);
        std::fs::write(&path, format!("{}\n", self.report()))?;
        Ok(path)
    }
}

/// Format `value` with at most `digits` significant digits and no trailing
/// zeros.
fn significant(value: f64, digits: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let exponent = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - exponent).max(0) as usize;
    let fixed = format!("{value:.decimals$}");
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}
