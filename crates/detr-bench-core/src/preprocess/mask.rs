//! Occupancy mask marking padded canvas cells.

use ndarray::Array2;

use crate::error::MaskError;

/// Square boolean grid: `true` for padding, `false` for real pixels.
///
/// Heap-owned and sized at runtime from the canvas edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    cells: Array2<bool>,
    valid_height: u32,
    valid_width: u32,
}

impl Mask {
    /// Edge length of the canvas.
    pub fn canvas_size(&self) -> usize {
        self.cells.nrows()
    }

    /// Size of the real-pixel region at the top-left corner.
    pub fn valid_region(&self) -> (u32, u32) {
        (self.valid_height, self.valid_width)
    }

    pub fn is_padded(&self, row: usize, col: usize) -> bool {
        self.cells[[row, col]]
    }

    pub fn as_array(&self) -> &Array2<bool> {
        &self.cells
    }

    /// Number of padded cells.
    pub fn padded_cells(&self) -> usize {
        self.cells.len() - self.valid_height as usize * self.valid_width as usize
    }

    /// Row-major copy of the cells, ready for a bool input tensor.
    pub fn to_vec(&self) -> Vec<bool> {
        self.cells.iter().copied().collect()
    }
}

/// Build a `canvas x canvas` mask where cell `(i, j)` is `false` iff
/// `i < height && j < width`.
pub fn build_mask(height: u32, width: u32, canvas: u32) -> Result<Mask, MaskError> {
    if canvas == 0 {
        return Err(MaskError::EmptyCanvas);
    }
    if height > canvas || width > canvas {
        return Err(MaskError::RegionOutOfBounds {
            height,
            width,
            canvas,
        });
    }

    let (h, w) = (height as usize, width as usize);
    let side = canvas as usize;
    let cells = Array2::from_shape_fn((side, side), |(i, j)| !(i < h && j < w));
    Ok(Mask {
        cells,
        valid_height: height,
        valid_width: width,
    })
}
