//! Pooling layers for downsampling spatial data
//!
//! Pooling windows under `Padding::Same` are truncated at the borders rather
//! than padded with values: max pooling takes the max over the in-bounds
//! cells, and average pooling divides by the in-bounds cell count.

use ndarray::{Array4, ArrayView4};
use serde::{Serialize, Deserialize};
use crate::layers::Padding;

/// 2D Max Pooling Layer
///
/// Applies max pooling over the spatial dimensions of
/// (batch, height, width, channels) feature maps.
#[derive(Serialize, Deserialize, Clone)]
pub struct MaxPool2DLayer {
    /// Pooling window size
    pub pool_size: (usize, usize),

    /// Stride for pooling
    pub stride: (usize, usize),

    /// Padding mode
    pub padding: Padding,
}

impl MaxPool2DLayer {
    /// Create a new 2D max pooling layer. Stride defaults to the pool size.
    pub fn new(pool_size: (usize, usize), stride: Option<(usize, usize)>, padding: Padding) -> Self {
        let stride = stride.unwrap_or(pool_size);

        MaxPool2DLayer {
            pool_size,
            stride,
            padding,
        }
    }

    /// Forward pass for a batch of feature maps [batch, height, width, channels].
    pub fn forward(&self, input: ArrayView4<f32>) -> Array4<f32> {
        let (batch_size, in_height, in_width, channels) = input.dim();

        let (out_height, pad_top, _) =
            self.padding.resolve(in_height, self.pool_size.0, self.stride.0);
        let (out_width, pad_left, _) =
            self.padding.resolve(in_width, self.pool_size.1, self.stride.1);

        let mut output = Array4::zeros((batch_size, out_height, out_width, channels));

        // Perform max pooling over border-clipped windows
        for b in 0..batch_size {
            for oh in 0..out_height {
                for ow in 0..out_width {
                    let (h_start, h_end) =
                        clip_window(oh, self.stride.0, pad_top, self.pool_size.0, in_height);
                    let (w_start, w_end) =
                        clip_window(ow, self.stride.1, pad_left, self.pool_size.1, in_width);

                    for c in 0..channels {
                        let mut max_val = f32::NEG_INFINITY;

                        for h in h_start..h_end {
                            for w in w_start..w_end {
                                let val = input[[b, h, w, c]];
                                if val > max_val {
                                    max_val = val;
                                }
                            }
                        }

                        output[[b, oh, ow, c]] = max_val;
                    }
                }
            }
        }

        output
    }
}

/// 2D Average Pooling Layer
///
/// Applies average pooling over the spatial dimensions of
/// (batch, height, width, channels) feature maps.
#[derive(Serialize, Deserialize, Clone)]
pub struct AvgPool2DLayer {
    /// Pooling window size
    pub pool_size: (usize, usize),

    /// Stride for pooling
    pub stride: (usize, usize),

    /// Padding mode
    pub padding: Padding,
}

impl AvgPool2DLayer {
    /// Create a new 2D average pooling layer. Stride defaults to the pool size.
    pub fn new(pool_size: (usize, usize), stride: Option<(usize, usize)>, padding: Padding) -> Self {
        let stride = stride.unwrap_or(pool_size);

        AvgPool2DLayer {
            pool_size,
            stride,
            padding,
        }
    }

    /// Forward pass for a batch of feature maps [batch, height, width, channels].
    pub fn forward(&self, input: ArrayView4<f32>) -> Array4<f32> {
        let (batch_size, in_height, in_width, channels) = input.dim();

        let (out_height, pad_top, _) =
            self.padding.resolve(in_height, self.pool_size.0, self.stride.0);
        let (out_width, pad_left, _) =
            self.padding.resolve(in_width, self.pool_size.1, self.stride.1);

        let mut output = Array4::zeros((batch_size, out_height, out_width, channels));

        // Perform average pooling over border-clipped windows
        for b in 0..batch_size {
            for oh in 0..out_height {
                for ow in 0..out_width {
                    let (h_start, h_end) =
                        clip_window(oh, self.stride.0, pad_top, self.pool_size.0, in_height);
                    let (w_start, w_end) =
                        clip_window(ow, self.stride.1, pad_left, self.pool_size.1, in_width);

                    let count = ((h_end - h_start) * (w_end - w_start)) as f32;

                    for c in 0..channels {
                        let mut sum = 0.0;

                        for h in h_start..h_end {
                            for w in w_start..w_end {
                                sum += input[[b, h, w, c]];
                            }
                        }

                        output[[b, oh, ow, c]] = sum / count;
                    }
                }
            }
        }

        output
    }
}

/// Clip one pooling window to the input bounds.
fn clip_window(
    out_idx: usize,
    stride: usize,
    pad_before: usize,
    pool: usize,
    input_size: usize,
) -> (usize, usize) {
    let base = (out_idx * stride) as isize - pad_before as isize;
    let start = base.max(0) as usize;
    let end = ((base + pool as isize).min(input_size as isize)) as usize;
    (start, end)
}
