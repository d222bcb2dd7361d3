//! Result persistence.
//!
//! - [`ResultWriter`] dumps every output tensor of an image to its own raw
//!   `.bin` file for offline accuracy evaluation.
//! - [`OutputWriter`] serializes per-image [`BenchRecord`](crate::types::BenchRecord)s
//!   as JSON or JSON Lines.

use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::types::OutputTensor;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A writer that serializes items to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                // JSONL is never pretty-printed (one object per line)
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Write multiple items: a JSON array, or one line per item for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Writes raw output tensors, one file per output.
///
/// Output `i` of `dir/img.jpg` lands in `result_dir/img_i.bin` as
/// little-endian f32 values.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    result_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(result_dir: impl Into<PathBuf>) -> Self {
        Self {
            result_dir: result_dir.into(),
        }
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Path of output `index` for `source`.
    pub fn output_path(&self, source: &Path, index: usize) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        self.result_dir.join(format!("{stem}_{index}.bin"))
    }

    /// Write all outputs for `source`, returning the written paths.
    pub fn write(
        &self,
        source: &Path,
        outputs: &[OutputTensor],
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let output_err = |e: io::Error| PipelineError::Output {
            path: source.to_path_buf(),
            message: e.to_string(),
        };

        std::fs::create_dir_all(&self.result_dir).map_err(output_err)?;

        let mut written = Vec::with_capacity(outputs.len());
        for (index, tensor) in outputs.iter().enumerate() {
            let path = self.output_path(source, index);
            let mut bytes = Vec::with_capacity(tensor.byte_len());
            for value in &tensor.data {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            std::fs::write(&path, bytes).map_err(output_err)?;
            written.push(path);
        }
        Ok(written)
    }
}
