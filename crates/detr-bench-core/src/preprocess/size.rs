//! Target size resolution under short-edge / long-edge bounds.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ResizeError};

/// Bounds on the resized image: `min_size` for the shorter edge, `max_size`
/// for the longer one. The long-edge cap wins when both cannot hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBound {
    min_size: u32,
    max_size: u32,
}

impl SizeBound {
    /// Create a bound, rejecting `min_size == 0` and `max_size < min_size`.
    pub fn new(min_size: u32, max_size: u32) -> Result<Self, ConfigError> {
        if min_size == 0 || max_size < min_size {
            return Err(ConfigError::InvalidSizeBound { min_size, max_size });
        }
        Ok(Self { min_size, max_size })
    }

    pub fn min_size(&self) -> u32 {
        self.min_size
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Resolve the target size for an image of `height x width`.
    ///
    /// Zero-area images are rejected here so [`resolve`] never sees them.
    pub fn resolve(&self, height: u32, width: u32) -> Result<TargetSize, ResizeError> {
        if height == 0 || width == 0 {
            return Err(ResizeError::EmptySource { width, height });
        }
        let (height, width) = resolve(height, width, self.min_size, self.max_size);
        Ok(TargetSize { height, width })
    }
}

/// Resolved `(height, width)` of the resized image.
///
/// Only produced by [`SizeBound::resolve`], so the same value drives both
/// padding and mask construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    height: u32,
    width: u32,
}

impl TargetSize {
    #[cfg(test)]
    pub(crate) fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Longer of the two edges.
    pub fn long_edge(&self) -> u32 {
        self.height.max(self.width)
    }
}

/// Compute the target `(height, width)` for an image.
///
/// If scaling the short edge to `min_size` would push the long edge past
/// `max_size`, `min_size` is first shrunk to `round(max_size * short / long)`.
/// An image whose short edge already equals the effective `min_size` keeps
/// its size. Otherwise the short edge becomes `min_size` and the long edge is
/// scaled with truncating integer division. Square images take the
/// height-is-short branch.
///
/// Inputs must be non-zero.
pub fn resolve(img_height: u32, img_width: u32, min_size: u32, max_size: u32) -> (u32, u32) {
    let min_ori = img_width.min(img_height) as f32;
    let max_ori = img_width.max(img_height) as f32;

    let mut min_size = min_size;
    if max_ori / min_ori * min_size as f32 > max_size as f32 {
        min_size = (max_size as f32 * min_ori / max_ori).round() as u32;
    }

    let short_edge_matches = (img_width <= img_height && img_width == min_size)
        || (img_height <= img_width && img_height == min_size);
    if short_edge_matches {
        return (img_height, img_width);
    }

    // Widen before multiplying: min_size * edge can exceed u32 for huge inputs.
    let scale = |edge: u32, short: u32| (min_size as u64 * edge as u64 / short as u64) as u32;
    if img_width < img_height {
        (scale(img_height, img_width), min_size)
    } else {
        (min_size, scale(img_width, img_height))
    }
}
