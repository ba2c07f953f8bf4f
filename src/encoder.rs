//! DenseNet-style convolutional encoder for handwriting and formula images.
//!
//! The encoder runs a strided stem convolution, then a fixed number of dense
//! blocks. Inside a block every level contributes `growth_rate` channels and
//! sees the concatenation of all previous outputs; between blocks a
//! transition layer compresses the channel depth and halves the spatial
//! resolution. A binary mask is subsampled at exactly the points the feature
//! map shrinks, so the caller always receives a mask aligned with the
//! features.

use ndarray::{concatenate, Array3, Array4, ArrayView3, ArrayView4, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::layers::initialization::{glorot_limit, WeightInit};
use crate::layers::{
    AvgPool2DLayer, BatchNorm2DLayer, Conv2DLayer, DropoutLayer, MaxPool2DLayer, Padding,
};
use crate::mask;

/// Batch-norm decay used throughout the encoder.
const BN_MOMENTUM: f32 = 0.9;

/// Batch-norm epsilon used throughout the encoder.
const BN_EPSILON: f32 = 1e-4;

/// Hyperparameters of the dense encoder.
///
/// The configuration is fixed for the lifetime of an encoder instance; every
/// layer width is derived from it at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Number of dense blocks
    pub blocks: usize,

    /// Number of levels in each block
    pub levels: usize,

    /// Channels contributed by each dense level (k in the DenseNet paper)
    pub growth_rate: usize,

    /// Dropout rate applied after every batch norm and ReLU pair
    pub dropout_rate: f32,

    /// Fraction of channels retained across a transition layer
    pub compression: f32,

    /// Channels of the input images
    pub in_channels: usize,

    /// Filters of the stem convolution placed before the dense blocks
    pub stem_filters: usize,

    /// Stride of the stem convolution
    pub stem_stride: usize,

    /// Kernel size of the stem convolution
    pub stem_kernel: (usize, usize),
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            blocks: 3,
            levels: 16,
            growth_rate: 24,
            dropout_rate: 0.2,
            compression: 0.5,
            in_channels: 1,
            stem_filters: 48,
            stem_stride: 2,
            stem_kernel: (7, 7),
        }
    }
}

/// One dense level: a 1x1 bottleneck followed by a 3x3 convolution, each with
/// its own batch norm.
#[derive(Serialize, Deserialize, Clone)]
pub struct DenseLevel {
    pub bottleneck: Conv2DLayer,
    pub bottleneck_bn: BatchNorm2DLayer,
    pub conv: Conv2DLayer,
    pub bn: BatchNorm2DLayer,
    pub dropout: DropoutLayer,
}

impl DenseLevel {
    fn new<R: Rng + ?Sized>(
        in_channels: usize,
        growth_rate: usize,
        dropout_rate: f32,
        rng: &mut R,
    ) -> Self {
        // The bottleneck compresses the accumulated input to a fixed 4k width
        // before the spatial convolution
        let width = 4 * growth_rate;

        DenseLevel {
            bottleneck: Conv2DLayer::new(
                in_channels,
                width,
                (1, 1),
                (1, 1),
                Padding::Valid,
                Activation::Linear,
                rng,
            ),
            bottleneck_bn: BatchNorm2DLayer::new(width, BN_MOMENTUM, BN_EPSILON, rng),
            conv: Conv2DLayer::new(
                width,
                growth_rate,
                (3, 3),
                (1, 1),
                Padding::Same,
                Activation::Linear,
                rng,
            ),
            bn: BatchNorm2DLayer::new(growth_rate, BN_MOMENTUM, BN_EPSILON, rng),
            dropout: DropoutLayer::new(dropout_rate),
        }
    }

    fn forward<R: Rng + ?Sized>(
        &mut self,
        input: ArrayView4<f32>,
        training: bool,
        rng: &mut R,
    ) -> Array4<f32> {
        let mut x = self.bottleneck.forward(input);
        x = self.bottleneck_bn.forward(x.view(), training);
        Activation::Relu.apply_spatial(&mut x);
        x = self.dropout.forward(x.view(), training, rng);

        x = self.conv.forward(x.view());
        x = self.bn.forward(x.view(), training);
        Activation::Relu.apply_spatial(&mut x);
        self.dropout.forward(x.view(), training, rng)
    }
}

/// A sequence of dense levels sharing one concatenation accumulator.
#[derive(Serialize, Deserialize, Clone)]
pub struct DenseBlock {
    pub levels: Vec<DenseLevel>,
}

impl DenseBlock {
    fn forward<R: Rng + ?Sized>(
        &mut self,
        mut dense_out: Array4<f32>,
        training: bool,
        rng: &mut R,
    ) -> Array4<f32> {
        for level in &mut self.levels {
            let x = level.forward(dense_out.view(), training, rng);
            // Every level sees the concatenation of all previous outputs
            dense_out = concatenate(Axis(3), &[dense_out.view(), x.view()])
                .expect("level output matches accumulator shape");
        }
        dense_out
    }
}

/// Channel compression and spatial downsampling applied between dense blocks.
#[derive(Serialize, Deserialize, Clone)]
pub struct TransitionLayer {
    pub conv: Conv2DLayer,
    pub bn: BatchNorm2DLayer,
    pub pool: AvgPool2DLayer,
    pub dropout: DropoutLayer,

    /// Channel depth entering the transition
    pub in_channels: usize,

    /// Channel depth after compression
    pub out_channels: usize,
}

impl TransitionLayer {
    fn new<R: Rng + ?Sized>(
        in_channels: usize,
        compression: f32,
        dropout_rate: f32,
        rng: &mut R,
    ) -> Self {
        // Truncation toward zero; every later layer width depends on it
        let compressed = (in_channels as f32 * compression) as usize;

        // The init bound is taken at the compressed width for both fans
        let limit = glorot_limit(compressed, compressed, (1, 1));

        TransitionLayer {
            conv: Conv2DLayer::new_with_init(
                in_channels,
                compressed,
                (1, 1),
                (1, 1),
                Padding::Valid,
                Activation::Linear,
                WeightInit::Uniform { min: -limit, max: limit },
                rng,
            ),
            bn: BatchNorm2DLayer::new(compressed, BN_MOMENTUM, BN_EPSILON, rng),
            pool: AvgPool2DLayer::new((2, 2), None, Padding::Same),
            dropout: DropoutLayer::new(dropout_rate),
            in_channels,
            out_channels: compressed,
        }
    }

    fn forward<R: Rng + ?Sized>(
        &mut self,
        input: ArrayView4<f32>,
        mask_x: ArrayView3<f32>,
        training: bool,
        rng: &mut R,
    ) -> (Array4<f32>, Array3<f32>) {
        let mut x = self.conv.forward(input);
        x = self.bn.forward(x.view(), training);
        Activation::Relu.apply_spatial(&mut x);
        x = self.dropout.forward(x.view(), training, rng);
        x = self.pool.forward(x.view());

        (x, mask::downsample(mask_x))
    }
}

/// DenseNet-style encoder mapping (images, mask) to (reduced mask, features).
///
/// Construct once with [`DenseEncoder::new`] or via
/// [`crate::builders::DenseEncoderBuilder`], then call [`DenseEncoder::forward`]
/// any number of times. Batch-norm running statistics are the only state a
/// forward pass mutates, and only when `training` is true.
#[derive(Serialize, Deserialize, Clone)]
pub struct DenseEncoder {
    pub config: EncoderConfig,
    pub stem_conv: Conv2DLayer,
    pub stem_bn: BatchNorm2DLayer,
    pub stem_pool: MaxPool2DLayer,
    pub blocks: Vec<DenseBlock>,
    pub transitions: Vec<TransitionLayer>,
    out_channels: usize,
}

impl DenseEncoder {
    /// Construct the encoder, drawing every weight from `rng`.
    ///
    /// The channel count is folded through construction: it starts at the
    /// stem filter count, grows by `growth_rate` per dense level, and is
    /// compressed to `floor(channels * compression)` by each transition.
    /// Every layer width derives from this fold, so the constructed encoder
    /// carries no construction state and can run any number of independent
    /// forward passes.
    pub fn new<R: Rng + ?Sized>(config: EncoderConfig, rng: &mut R) -> Self {
        let stem_conv = Conv2DLayer::new(
            config.in_channels,
            config.stem_filters,
            config.stem_kernel,
            (config.stem_stride, config.stem_stride),
            Padding::Same,
            Activation::Linear,
            rng,
        );
        let stem_bn = BatchNorm2DLayer::new(config.stem_filters, BN_MOMENTUM, BN_EPSILON, rng);
        let stem_pool = MaxPool2DLayer::new((2, 2), None, Padding::Same);

        let mut channels = config.stem_filters;
        let mut blocks = Vec::with_capacity(config.blocks);
        let mut transitions = Vec::new();

        for i in 0..config.blocks {
            let mut levels = Vec::with_capacity(config.levels);
            for _ in 0..config.levels {
                levels.push(DenseLevel::new(
                    channels,
                    config.growth_rate,
                    config.dropout_rate,
                    rng,
                ));
                channels += config.growth_rate;
            }
            blocks.push(DenseBlock { levels });

            // No transition after the last block; its accumulated width is
            // the encoder's output width
            if i + 1 < config.blocks {
                let transition =
                    TransitionLayer::new(channels, config.compression, config.dropout_rate, rng);
                channels = transition.out_channels;
                transitions.push(transition);
            }
        }

        DenseEncoder {
            config,
            stem_conv,
            stem_bn,
            stem_pool,
            blocks,
            transitions,
            out_channels: channels,
        }
    }

    /// Channel depth of the feature tensor produced by [`DenseEncoder::forward`].
    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// Net spatial reduction factor from input to output: 4 from the stem,
    /// then 2 per transition.
    pub fn spatial_reduction(&self) -> usize {
        4 << self.transitions.len()
    }

    /// Run the encoder over a batch of images and their mask.
    ///
    /// `images` is shaped (batch, height, width, channels) and `mask_x`
    /// (batch, height, width). Returns the reduced mask and the final
    /// dense-concatenated feature tensor; the two always agree spatially.
    ///
    /// `training` selects batch statistics plus running-estimate updates in
    /// the batch norms and activates dropout; with `training` false the pass
    /// is pure and repeatable. `rng` feeds the dropout draws.
    pub fn forward<R: Rng + ?Sized>(
        &mut self,
        images: ArrayView4<f32>,
        mask_x: ArrayView3<f32>,
        training: bool,
        rng: &mut R,
    ) -> (Array3<f32>, Array4<f32>) {
        // Stem: strided convolution, batch norm, ReLU, 2x2 max pool. The mask
        // is subsampled once for the convolution stride and once for the pool.
        let mut x = self.stem_conv.forward(images);
        let mut mask_x = mask::downsample(mask_x);
        x = self.stem_bn.forward(x.view(), training);
        Activation::Relu.apply_spatial(&mut x);
        x = self.stem_pool.forward(x.view());
        mask_x = mask::downsample(mask_x.view());

        let mut dense_out = x;
        for i in 0..self.blocks.len() {
            dense_out = self.blocks[i].forward(dense_out, training, rng);

            if i < self.transitions.len() {
                let (compressed, reduced) =
                    self.transitions[i].forward(dense_out.view(), mask_x.view(), training, rng);
                dense_out = compressed;
                mask_x = reduced;
            }
        }

        (mask_x, dense_out)
    }
}
