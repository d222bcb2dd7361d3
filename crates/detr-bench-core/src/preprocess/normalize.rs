//! Per-channel mean/std normalization.

use image::RgbImage;
use ndarray::Array3;

use crate::config::{PreprocessConfig, IMAGENET_MEAN, IMAGENET_STD};
use crate::error::NormalizeError;

/// Number of color channels (RGB).
pub const CHANNELS: usize = 3;

/// Per-channel statistics the network was trained with.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::imagenet()
    }
}

impl Normalization {
    /// ImageNet statistics in RGB order.
    pub fn imagenet() -> Self {
        Self {
            mean: IMAGENET_MEAN.to_vec(),
            std: IMAGENET_STD.to_vec(),
        }
    }

    pub fn from_config(config: &PreprocessConfig) -> Self {
        Self {
            mean: config.mean.clone(),
            std: config.std.clone(),
        }
    }

    pub fn apply(&self, image: &RgbImage) -> Result<Array3<f32>, NormalizeError> {
        normalize(image, &self.mean, &self.std)
    }
}

/// Normalize an RGB image into an HWC float tensor:
/// `out[y, x, c] = (in[y, x, c] - mean[c]) / std[c]`.
pub fn normalize(image: &RgbImage, mean: &[f32], std: &[f32]) -> Result<Array3<f32>, NormalizeError> {
    if mean.len() != CHANNELS || std.len() != CHANNELS {
        return Err(NormalizeError::ChannelMismatch {
            channels: CHANNELS,
            mean: mean.len(),
            std: std.len(),
        });
    }

    let (width, height) = image.dimensions();
    let mut tensor = Array3::<f32>::zeros((height as usize, width as usize, CHANNELS));

    // Standard-layout iteration order is y, x, c, the same as the raw buffer.
    for (i, (dst, &src)) in tensor.iter_mut().zip(image.as_raw().iter()).enumerate() {
        let c = i % CHANNELS;
        *dst = (src as f32 - mean[c]) / std[c];
    }

    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_normalize_shape() {
        let img = RgbImage::new(7, 5);
        let out = normalize(&img, &IMAGENET_MEAN, &IMAGENET_STD).unwrap();
        assert_eq!(out.shape(), &[5, 7, 3]);
    }

    #[test]
    fn test_normalize_per_channel() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, Rgb([255, 0, 128]));
        let out = normalize(&img, &IMAGENET_MEAN, &IMAGENET_STD).unwrap();

        let expected: [f32; 3] = [
            (255.0 - 123.675) / 58.395,
            (0.0 - 116.28) / 57.12,
            (128.0 - 103.53) / 57.375,
        ];
        for (c, want) in expected.iter().enumerate() {
            assert!((out[[0, 1, c]] - want).abs() < 1e-5);
        }
        // Black pixel at (0, 0)
        assert!((out[[0, 0, 0]] + 123.675 / 58.395).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_mean_pixel_maps_to_zero() {
        let img = RgbImage::from_pixel(3, 3, Rgb([100, 100, 100]));
        let out = normalize(&img, &[100.0; 3], &[2.0; 3]).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_normalize_rejects_arity_mismatch() {
        let img = RgbImage::new(2, 2);
        let err = normalize(&img, &[0.0, 0.0], &[1.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::ChannelMismatch {
                channels: 3,
                mean: 2,
                std: 3
            }
        );
    }

    #[test]
    fn test_normalization_default_is_imagenet() {
        let norm = Normalization::default();
        assert_eq!(norm.mean, IMAGENET_MEAN.to_vec());
        assert_eq!(norm.std, IMAGENET_STD.to_vec());
    }
}
