//! Zero padding onto the square canvas.

use ndarray::{s, Array3};

use crate::error::PadError;

use super::size::TargetSize;

/// Pad amounts per side. Signed so that a too-small canvas is reported
/// instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Padding {
    /// Anchor `target` at the top-left of a `canvas x canvas` square.
    pub fn to_canvas(target: TargetSize, canvas: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: canvas as i64 - target.width() as i64,
            bottom: canvas as i64 - target.height() as i64,
        }
    }

    fn is_negative(&self) -> bool {
        self.left < 0 || self.top < 0 || self.right < 0 || self.bottom < 0
    }
}

/// Place `image` (HWC) inside a zero-filled canvas of shape
/// `[h + top + bottom, w + left + right, c]` at offset `(top, left)`.
pub fn pad(image: &Array3<f32>, padding: Padding) -> Result<Array3<f32>, PadError> {
    if padding.is_negative() {
        return Err(PadError::NegativePadding {
            left: padding.left,
            top: padding.top,
            right: padding.right,
            bottom: padding.bottom,
        });
    }

    let (height, width, channels) = image.dim();
    let (top, left) = (padding.top as usize, padding.left as usize);
    let out_height = height + top + padding.bottom as usize;
    let out_width = width + left + padding.right as usize;

    let mut canvas = Array3::<f32>::zeros((out_height, out_width, channels));
    canvas
        .slice_mut(s![top..top + height, left..left + width, ..])
        .assign(image);
    Ok(canvas)
}
