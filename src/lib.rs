//! # Theia - DenseNet Feature Encoder for Handwriting Recognition
//!
//! Theia implements the convolutional feature-extraction backbone of a
//! handwriting/formula recognition pipeline: a DenseNet-style encoder that
//! maps an input image batch and a parallel binary mask to a downsampled
//! feature tensor and a mask reduced in lockstep. The surrounding system
//! (training loop, attention decoder, serving) consumes the pair.
//!
//! ## Key Features
//!
//! - **Dense blocks**: every level's output is concatenated onto the outputs
//!   of all previous levels in the block, growing the channel depth by a
//!   fixed rate per level
//! - **Transition layers**: 1x1 channel compression plus average pooling
//!   between blocks
//! - **Mask tracking**: the mask is subsampled at exactly the points the
//!   feature map's spatial resolution halves, so both always agree
//! - **Deterministic initialization**: every weight is drawn from a
//!   caller-owned random source, so runs are reproducible by seeding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use theia::builders::DenseEncoderBuilder;
//! use ndarray::{Array3, Array4};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut encoder = DenseEncoderBuilder::new()
//!     .blocks(3)
//!     .levels(16)
//!     .growth_rate(24)
//!     .build(&mut rng)
//!     .unwrap();
//!
//! let images = Array4::<f32>::zeros((1, 128, 128, 1));
//! let mask = Array3::<f32>::ones((1, 128, 128));
//! let (reduced_mask, features) = encoder.forward(images.view(), mask.view(), false, &mut rng);
//! assert_eq!(features.shape()[3], encoder.out_channels());
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Elementwise activation functions
//! - [`builders`] - Builder patterns for convenient object construction
//! - [`encoder`] - The dense encoder and its configuration
//! - [`error`] - Error types and result handling
//! - [`layers`] - Spatial layer primitives (convolution, batch norm, pooling, dropout)
//! - [`mask`] - Mask subsampling utilities

pub mod activations;
pub mod builders;
pub mod encoder;
pub mod error;
pub mod layers;
pub mod mask;
