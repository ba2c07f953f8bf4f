//! Forward-only spatial layers used to assemble the encoder.

use serde::{Serialize, Deserialize};

pub mod batch_norm;
pub mod conv;
pub mod dropout;
pub mod initialization;
pub mod pooling;

pub use batch_norm::BatchNorm2DLayer;
pub use conv::Conv2DLayer;
pub use dropout::DropoutLayer;
pub use initialization::{glorot_limit, WeightInit};
pub use pooling::{AvgPool2DLayer, MaxPool2DLayer};

/// Padding mode for convolution and pooling layers.
///
/// `Same` follows TensorFlow arithmetic: the output spatial size is
/// ceil(input / stride), and any padding needed to reach it is split evenly
/// with the odd cell going to the bottom/right. `Valid` applies no padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Padding {
    Same,
    Valid,
}

impl Padding {
    /// Resolve one spatial dimension to (output size, padding before, padding after).
    pub fn resolve(&self, input: usize, kernel: usize, stride: usize) -> (usize, usize, usize) {
        match self {
            Padding::Same => {
                let output = (input + stride - 1) / stride;
                let needed = ((output - 1) * stride + kernel).saturating_sub(input);
                let before = needed / 2;
                (output, before, needed - before)
            }
            Padding::Valid => ((input - kernel) / stride + 1, 0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Padding;

    #[test]
    fn same_padding_ceils_output_size() {
        // 7x7 kernel, stride 2: 64 -> 32, 65 -> 33
        assert_eq!(Padding::Same.resolve(64, 7, 2).0, 32);
        assert_eq!(Padding::Same.resolve(65, 7, 2).0, 33);
    }

    #[test]
    fn same_padding_puts_odd_cell_after() {
        let (output, before, after) = Padding::Same.resolve(64, 7, 2);
        assert_eq!(output, 32);
        assert_eq!((before, after), (2, 3));
    }

    #[test]
    fn valid_padding_floors_output_size() {
        let (output, before, after) = Padding::Valid.resolve(64, 7, 2);
        assert_eq!(output, 29);
        assert_eq!((before, after), (0, 0));
    }
}
