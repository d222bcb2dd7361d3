//! Resolve → resize → normalize → pad → mask, as one operation.

use std::time::Instant;

use image::RgbImage;
use ndarray::Array3;

use crate::config::PreprocessConfig;
use crate::error::{ConfigError, PreprocessError};

use super::mask::{build_mask, Mask};
use super::normalize::Normalization;
use super::pad::{pad, Padding};
use super::resize::resize;
use super::size::{SizeBound, TargetSize};

/// Output of preprocessing one image.
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Normalized image on the canvas, HWC `[canvas, canvas, 3]`
    pub image: Array3<f32>,
    /// Occupancy mask aligned with `image`
    pub mask: Mask,
    /// Size the image was resized to before padding
    pub target: TargetSize,
}

/// Reusable preprocessing configuration.
///
/// Stateless between calls: identical inputs give identical outputs.
#[derive(Debug, Clone)]
pub struct PreprocessPipeline {
    bound: SizeBound,
    canvas_size: u32,
    normalization: Normalization,
}

impl PreprocessPipeline {
    pub fn new(
        bound: SizeBound,
        canvas_size: u32,
        normalization: Normalization,
    ) -> Result<Self, ConfigError> {
        if canvas_size == 0 {
            return Err(ConfigError::InvalidCanvas(canvas_size));
        }
        Ok(Self {
            bound,
            canvas_size,
            normalization,
        })
    }

    pub fn from_config(config: &PreprocessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bound = SizeBound::new(config.min_size, config.max_size)?;
        Self::new(bound, config.canvas_size, Normalization::from_config(config))
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    pub fn bound(&self) -> SizeBound {
        self.bound
    }

    /// Run every stage on `image`. The first failing stage aborts the run
    /// and nothing partial is returned.
    pub fn run(&self, image: &RgbImage) -> Result<PreprocessResult, PreprocessError> {
        let (width, height) = image.dimensions();

        let target = self.bound.resolve(height, width)?;
        tracing::trace!(
            "  Resolve: {}x{} -> {}x{}",
            width,
            height,
            target.width(),
            target.height()
        );

        let start = Instant::now();
        let resized = resize(image, target.height(), target.width())?;
        tracing::trace!("  Resize: {:?}", start.elapsed());

        let start = Instant::now();
        let normalized = self.normalization.apply(&resized)?;
        tracing::trace!("  Normalize: {:?}", start.elapsed());

        let start = Instant::now();
        let padded = pad(&normalized, Padding::to_canvas(target, self.canvas_size))?;
        tracing::trace!("  Pad: {:?}", start.elapsed());

        let mask = build_mask(target.height(), target.width(), self.canvas_size)?;

        Ok(PreprocessResult {
            image: padded,
            mask,
            target,
        })
    }
}

/// One-shot preprocessing with ImageNet statistics.
pub fn run(
    image: &RgbImage,
    min_size: u32,
    max_size: u32,
    canvas_size: u32,
) -> Result<PreprocessResult, PreprocessError> {
    let bound = SizeBound::new(min_size, max_size)?;
    PreprocessPipeline::new(bound, canvas_size, Normalization::imagenet())?.run(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResizeError;
    use image::Rgb;

    #[test]
    fn test_run_vga_default_bounds() {
        let img = RgbImage::from_pixel(640, 480, Rgb([123, 116, 103]));
        let result = run(&img, 800, 1333, 1344).unwrap();

        assert_eq!(result.target.height(), 800);
        assert_eq!(result.target.width(), 1066);
        assert_eq!(result.image.shape(), &[1344, 1344, 3]);
        assert_eq!(result.mask.canvas_size(), 1344);
        assert_eq!(result.mask.valid_region(), (800, 1066));
    }

    #[test]
    fn test_padding_and_mask_agree() {
        // Bright image: every real pixel normalizes to a positive value,
        // padding stays exactly zero.
        let img = RgbImage::from_pixel(30, 20, Rgb([255, 255, 255]));
        let result = run(&img, 16, 40, 48).unwrap();
        let (h, w) = result.mask.valid_region();
        assert_eq!((h, w), (16, 24));

        for ((y, x, _), &v) in result.image.indexed_iter() {
            if result.mask.is_padded(y, x) {
                assert_eq!(v, 0.0, "padding at ({y}, {x})");
            } else {
                assert!(v > 0.0, "real pixel at ({y}, {x})");
            }
        }
    }

    #[test]
    fn test_output_shape_independent_of_input() {
        let pipeline = PreprocessPipeline::from_config(&PreprocessConfig {
            min_size: 32,
            max_size: 50,
            canvas_size: 64,
            ..PreprocessConfig::default()
        })
        .unwrap();
        for (w, h) in [(10, 10), (100, 30), (30, 100), (64, 48), (7, 200)] {
            let img = RgbImage::new(w, h);
            let result = pipeline.run(&img).unwrap();
            assert_eq!(result.image.shape(), &[64, 64, 3]);
            assert_eq!(result.mask.as_array().shape(), &[64, 64]);
        }
    }

    #[test]
    fn test_deterministic() {
        let img = RgbImage::from_fn(37, 23, |x, y| Rgb([(x * 7) as u8, (y * 11) as u8, 42]));
        let a = run(&img, 20, 40, 48).unwrap();
        let b = run(&img, 20, 40, 48).unwrap();
        assert_eq!(a.image, b.image);
        assert_eq!(a.mask, b.mask);
    }

    #[test]
    fn test_canvas_too_small_is_pad_error() {
        let img = RgbImage::new(640, 480);
        let err = run(&img, 800, 1333, 1024).unwrap_err();
        assert!(matches!(err, PreprocessError::Pad(_)), "{err}");
    }

    #[test]
    fn test_invalid_bounds_is_config_error() {
        let img = RgbImage::new(10, 10);
        let err = run(&img, 900, 800, 1344).unwrap_err();
        assert!(matches!(err, PreprocessError::Config(_)));

        let err = run(&img, 800, 1333, 0).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::Config(ConfigError::InvalidCanvas(0))
        ));
    }

    #[test]
    fn test_empty_image_is_resize_error() {
        let img = RgbImage::new(0, 0);
        let err = run(&img, 800, 1333, 1344).unwrap_err();
        assert!(matches!(err, PreprocessError::Resize(_)));
    }

    #[test]
    fn test_extreme_aspect_ratio_is_invalid_target() {
        // round(1333 * 1 / 5000) shrinks min_size to 0
        let img = RgbImage::new(5000, 1);
        let err = run(&img, 800, 1333, 1344).unwrap_err();
        assert!(
            matches!(
                err,
                PreprocessError::Resize(ResizeError::InvalidTarget {
                    width: 0,
                    height: 0
                })
            ),
            "{err}"
        );
    }

    #[test]
    fn test_from_config_rejects_bad_std() {
        let config = PreprocessConfig {
            std: vec![1.0, 1.0],
            ..PreprocessConfig::default()
        };
        assert!(PreprocessPipeline::from_config(&config).is_err());
    }
}
