//! Tensor layout conversion for the network input.

use ndarray::{Array3, Array4, Axis};

/// Convert an HWC image into a contiguous NCHW tensor with a batch of one.
pub fn to_channels_first(image: &Array3<f32>) -> Array4<f32> {
    image
        .view()
        .permuted_axes([2, 0, 1])
        .insert_axis(Axis(0))
        .as_standard_layout()
        .into_owned()
}
