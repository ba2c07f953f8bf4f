use rand::Rng;

use crate::encoder::{DenseEncoder, EncoderConfig};
use crate::error::{Result, TheiaError};

/// Builder for DenseEncoder
///
/// Block count, levels per block and growth rate must be supplied; the
/// remaining hyperparameters default to the values used for handwriting
/// recognition (dropout 0.2, compression 0.5, grayscale input, 48 stem
/// filters with a 7x7 stride-2 kernel).
pub struct DenseEncoderBuilder {
    blocks: Option<usize>,
    levels: Option<usize>,
    growth_rate: Option<usize>,
    dropout_rate: f32,
    compression: f32,
    in_channels: usize,
    stem_filters: usize,
    stem_stride: usize,
    stem_kernel: (usize, usize),
}

impl DenseEncoderBuilder {
    /// Create a new dense encoder builder
    pub fn new() -> Self {
        DenseEncoderBuilder {
            blocks: None,
            levels: None,
            growth_rate: None,
            dropout_rate: 0.2,
            compression: 0.5,
            in_channels: 1,
            stem_filters: 48,
            stem_stride: 2,
            stem_kernel: (7, 7),
        }
    }

    /// Set the number of dense blocks
    pub fn blocks(mut self, blocks: usize) -> Self {
        self.blocks = Some(blocks);
        self
    }

    /// Set the number of levels in each block
    pub fn levels(mut self, levels: usize) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Set the growth rate (channels contributed per level)
    pub fn growth_rate(mut self, growth_rate: usize) -> Self {
        self.growth_rate = Some(growth_rate);
        self
    }

    /// Set the dropout rate
    pub fn dropout_rate(mut self, dropout_rate: f32) -> Self {
        self.dropout_rate = dropout_rate;
        self
    }

    /// Set the transition compression ratio
    pub fn compression(mut self, compression: f32) -> Self {
        self.compression = compression;
        self
    }

    /// Set the number of input image channels
    pub fn in_channels(mut self, in_channels: usize) -> Self {
        self.in_channels = in_channels;
        self
    }

    /// Set the number of stem convolution filters
    pub fn stem_filters(mut self, stem_filters: usize) -> Self {
        self.stem_filters = stem_filters;
        self
    }

    /// Set the stem convolution stride
    pub fn stem_stride(mut self, stem_stride: usize) -> Self {
        self.stem_stride = stem_stride;
        self
    }

    /// Set the stem convolution kernel size
    pub fn stem_kernel(mut self, stem_kernel: (usize, usize)) -> Self {
        self.stem_kernel = stem_kernel;
        self
    }

    /// Build the encoder, drawing its weights from `rng`
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<DenseEncoder> {
        let blocks = self.blocks.ok_or_else(|| TheiaError::InvalidParameter {
            name: "blocks".to_string(),
            reason: "Number of dense blocks not specified".to_string(),
        })?;

        let levels = self.levels.ok_or_else(|| TheiaError::InvalidParameter {
            name: "levels".to_string(),
            reason: "Number of levels per block not specified".to_string(),
        })?;

        let growth_rate = self.growth_rate.ok_or_else(|| TheiaError::InvalidParameter {
            name: "growth_rate".to_string(),
            reason: "Growth rate not specified".to_string(),
        })?;

        if blocks == 0 || levels == 0 || growth_rate == 0 || self.stem_filters == 0 {
            return Err(TheiaError::InvalidParameter {
                name: "size".to_string(),
                reason: "Block, level, growth-rate and stem-filter counts must be greater than 0"
                    .to_string(),
            });
        }

        Ok(DenseEncoder::new(
            EncoderConfig {
                blocks,
                levels,
                growth_rate,
                dropout_rate: self.dropout_rate,
                compression: self.compression,
                in_channels: self.in_channels,
                stem_filters: self.stem_filters,
                stem_stride: self.stem_stride,
                stem_kernel: self.stem_kernel,
            },
            rng,
        ))
    }
}

impl Default for DenseEncoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
