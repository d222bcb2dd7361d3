//! Cheap checks run before a file is decoded.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates files before decoding.
pub struct Validator {
    limits: LimitsConfig,
}

/// Known signatures, matched against the start of the file.
const SIGNATURES: &[&[u8]] = &[
    &[0xFF, 0xD8, 0xFF],       // JPEG
    &[0x89, b'P', b'N', b'G'], // PNG
    b"BM",                     // BMP
    &[b'I', b'I', 0x2A, 0x00], // TIFF little-endian
    &[b'M', b'M', 0x00, 0x2A], // TIFF big-endian
];

impl Validator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that the file exists, fits the size limit, and starts with a
    /// known image signature.
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path)
    }

    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read header: {}", e),
        })?;

        if bytes_read < 4 {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        if !is_valid_image_header(&header[..bytes_read]) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }
}

fn is_valid_image_header(header: &[u8]) -> bool {
    if SIGNATURES.iter().any(|sig| header.starts_with(sig)) {
        return true;
    }
    // WebP: RIFF....WEBP
    header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP"
}
