//! Bias-free 2D convolution over channels-last feature maps.
//!
//! Every convolution in the encoder is immediately followed by batch
//! normalization, which supplies the shift term, so the layer carries no
//! bias vector.

use ndarray::{Array4, ArrayView4, s};
use serde::{Serialize, Deserialize};
use rand::Rng;
use crate::activations::Activation;
use crate::layers::initialization::WeightInit;
use crate::layers::Padding;

/// 2D Convolutional Layer
///
/// Applies 2D convolution over a batch of feature maps shaped
/// (batch, height, width, channels).
#[derive(Serialize, Deserialize, Clone)]
pub struct Conv2DLayer {
    /// Convolution kernels [kernel_h, kernel_w, in_channels, out_channels]
    pub kernels: Array4<f32>,

    /// Activation applied after the convolution
    pub activation: Activation,

    /// Stride for convolution
    pub stride: (usize, usize),

    /// Padding mode
    pub padding: Padding,

    /// Number of input channels
    pub in_channels: usize,

    /// Number of output channels (filters)
    pub out_channels: usize,

    /// Kernel size
    pub kernel_size: (usize, usize),
}

impl Conv2DLayer {
    /// Create a new 2D convolutional layer with Glorot-uniform weights drawn
    /// from `rng`.
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: Padding,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        Self::new_with_init(
            in_channels,
            out_channels,
            kernel_size,
            stride,
            padding,
            activation,
            WeightInit::XavierUniform,
            rng,
        )
    }

    /// Create a new 2D convolutional layer with an explicit weight
    /// initialization strategy.
    pub fn new_with_init<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: Padding,
        activation: Activation,
        weight_init: WeightInit,
        rng: &mut R,
    ) -> Self {
        let kernels = weight_init.initialize_conv_weights(
            (kernel_size.0, kernel_size.1, in_channels, out_channels),
            rng,
        );

        Conv2DLayer {
            kernels,
            activation,
            stride,
            padding,
            in_channels,
            out_channels,
            kernel_size,
        }
    }

    /// Forward pass for a batch of feature maps [batch, height, width, channels].
    pub fn forward(&self, input: ArrayView4<f32>) -> Array4<f32> {
        let mut output = self.convolve2d(&input);
        self.activation.apply_spatial(&mut output);
        output
    }

    /// Perform 2D convolution
    fn convolve2d(&self, input: &ArrayView4<f32>) -> Array4<f32> {
        let (batch_size, in_height, in_width, _) = input.dim();

        // Resolve output dimensions and padding amounts
        let (out_height, pad_top, pad_bottom) =
            self.padding.resolve(in_height, self.kernel_size.0, self.stride.0);
        let (out_width, pad_left, pad_right) =
            self.padding.resolve(in_width, self.kernel_size.1, self.stride.1);

        // Apply padding if needed
        let padded_input = if pad_top + pad_bottom + pad_left + pad_right > 0 {
            self.pad_input(input, (pad_top, pad_bottom), (pad_left, pad_right))
        } else {
            input.to_owned()
        };

        let mut output = Array4::zeros((batch_size, out_height, out_width, self.out_channels));

        // Perform convolution
        for b in 0..batch_size {
            for oh in 0..out_height {
                for ow in 0..out_width {
                    let h_start = oh * self.stride.0;
                    let w_start = ow * self.stride.1;

                    for oc in 0..self.out_channels {
                        let mut sum = 0.0;

                        for kh in 0..self.kernel_size.0 {
                            for kw in 0..self.kernel_size.1 {
                                for ic in 0..self.in_channels {
                                    sum += padded_input[[b, h_start + kh, w_start + kw, ic]]
                                         * self.kernels[[kh, kw, ic, oc]];
                                }
                            }
                        }

                        output[[b, oh, ow, oc]] = sum;
                    }
                }
            }
        }

        output
    }

    /// Pad input with zeros
    fn pad_input(
        &self,
        input: &ArrayView4<f32>,
        pad_h: (usize, usize),
        pad_w: (usize, usize),
    ) -> Array4<f32> {
        let (batch_size, height, width, channels) = input.dim();
        let padded_height = height + pad_h.0 + pad_h.1;
        let padded_width = width + pad_w.0 + pad_w.1;

        let mut padded = Array4::zeros((batch_size, padded_height, padded_width, channels));

        // Copy input into the unpadded region
        padded
            .slice_mut(s![.., pad_h.0..pad_h.0 + height, pad_w.0..pad_w.0 + width, ..])
            .assign(input);

        padded
    }
}
