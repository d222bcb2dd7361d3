//! Benchmark pipeline components.
//!
//! - **discovery**: Find image files in directories
//! - **validate**: Size and magic-byte checks before decode
//! - **decode**: Load and decode images to RGB
//! - **channel**: Bounded channels for backpressure
//! - **runner**: Orchestrates preprocessing, timed inference, and result output

pub mod channel;
pub mod decode;
pub mod discovery;
pub mod runner;
pub mod validate;

pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use runner::{BenchRunner, ImageOutcome, PreparedImage, RunOptions};
pub use validate::Validator;
