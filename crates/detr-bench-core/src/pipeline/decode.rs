//! Image decoding to 8-bit RGB with format detection, limits, and timeout.

use image::{ImageFormat, RgbImage};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// Decoded pixels, converted to RGB
    pub image: RgbImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Original file size in bytes
    pub file_size: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read and decode an image file.
    pub async fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })?;
        self.decode_from_bytes(bytes, path).await
    }

    /// Decode an image from an in-memory byte buffer with validation and timeout.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<DecodedImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        path: path.to_path_buf(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, PipelineError> {
        use std::io::Cursor;

        let file_size = bytes.len() as u64;
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?,
        };
        // Grayscale and RGBA sources are widened or flattened to RGB here.
        let image = reader
            .decode()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .to_rgb8();

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            file_size,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};

    fn encode_png(image: &RgbImage) -> Vec<u8> {
        let mut bytes = std::io::Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_format_detected_by_content() {
        let png = encode_png(&RgbImage::from_pixel(4, 3, Rgb([10, 20, 30])));
        let result = ImageDecoder::decode_bytes_sync(png, Path::new("misnamed.jpg")).unwrap();
        assert_eq!(result.format, ImageFormat::Png);
        assert_eq!((result.width, result.height), (4, 3));
        assert_eq!(result.image.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_grayscale_widened_to_rgb() {
        let gray = GrayImage::from_pixel(2, 2, Luma([77]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        gray.write_to(&mut bytes, ImageFormat::Png).unwrap();

        let result =
            ImageDecoder::decode_bytes_sync(bytes.into_inner(), Path::new("gray.png")).unwrap();
        assert_eq!(result.image.get_pixel(1, 1), &Rgb([77, 77, 77]));
    }

    #[tokio::test]
    async fn test_decode_rejects_oversized_image() {
        let limits = LimitsConfig {
            max_image_dimension: 8,
            ..LimitsConfig::default()
        };
        let png = encode_png(&RgbImage::new(9, 4));
        let err = ImageDecoder::new(limits)
            .decode_from_bytes(png, Path::new("wide.png"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::ImageTooLarge { width: 9, .. }));
    }

    #[tokio::test]
    async fn test_decode_garbage_fails() {
        let err = ImageDecoder::new(LimitsConfig::default())
            .decode_from_bytes(vec![0u8; 64], Path::new("noise.png"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_decode_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::write(&path, encode_png(&RgbImage::new(5, 6))).unwrap();

        let decoded = ImageDecoder::new(LimitsConfig::default())
            .decode(&path)
            .await
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (5, 6));
        assert!(decoded.file_size > 0);
    }
}
