//! Bilinear resize to the resolved target size.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::error::ResizeError;

/// Interpolation used for every resize.
const FILTER: FilterType = FilterType::Triangle;

/// Resize `image` to exactly `height x width` with bilinear interpolation.
pub fn resize(image: &RgbImage, height: u32, width: u32) -> Result<RgbImage, ResizeError> {
    let (src_width, src_height) = image.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(ResizeError::EmptySource {
            width: src_width,
            height: src_height,
        });
    }
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidTarget { width, height });
    }

    if (src_width, src_height) == (width, height) {
        return Ok(image.clone());
    }
    Ok(imageops::resize(image, width, height, FILTER))
}
