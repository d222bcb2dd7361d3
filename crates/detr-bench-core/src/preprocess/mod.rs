//! Aspect-preserving resize, normalization, padding and masking for a
//! fixed-input-shape detector.
//!
//! The network expects:
//! - Input: `[1, 3, canvas, canvas]` float tensor, ImageNet-normalized RGB
//! - Mask: `[1, canvas, canvas]` bool tensor, `true` on padding
//!
//! ```text
//! RgbImage → resolve size → resize → normalize → pad ─→ image (HWC)
//!                 └───────────────────────────→ mask ─→ mask
//! ```
//!
//! The same resolved [`TargetSize`] drives both padding and mask construction,
//! which keeps the mask's valid region aligned with the real pixels.

pub mod layout;
pub mod mask;
pub mod normalize;
pub mod pad;
pub mod pipeline;
pub mod resize;
pub mod size;

pub use layout::to_channels_first;
pub use mask::{build_mask, Mask};
pub use normalize::{normalize, Normalization};
pub use pad::{pad, Padding};
pub use pipeline::{PreprocessPipeline, PreprocessResult};
pub use resize::resize;
pub use size::{resolve, SizeBound, TargetSize};
