//! Subsampling for the binary attention mask carried alongside the feature map.

use ndarray::{Array3, ArrayView3, s};

/// Downsample a (batch, height, width) mask by keeping every other row and
/// column, starting at index zero.
///
/// The output spatial size is ceil(n / 2) per dimension, which matches the
/// stride-2 convolutions and pools the mask mirrors, so mask and feature map
/// stay aligned for any input size.
pub fn downsample(mask: ArrayView3<f32>) -> Array3<f32> {
    mask.slice(s![.., ..;2, ..;2]).to_owned()
}
