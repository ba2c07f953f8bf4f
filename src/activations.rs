use ndarray::Array4;
use serde::{Serialize, Deserialize};

/// An enumeration of the activation functions used in the encoder.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
}

impl Activation {
    /// Apply the activation function in place to a batch of feature maps
    /// shaped (batch, height, width, channels).
    pub fn apply_spatial(&self, input: &mut Array4<f32>) {
        match self {
            Activation::Relu => {
                input.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_zeroes_negative_values() {
        let mut input = Array4::from_shape_vec(
            (1, 1, 2, 2),
            vec![-1.0, 2.0, -0.5, 0.0],
        ).unwrap();

        Activation::Relu.apply_spatial(&mut input);

        assert_eq!(input[[0, 0, 0, 0]], 0.0);
        assert_eq!(input[[0, 0, 0, 1]], 2.0);
        assert_eq!(input[[0, 0, 1, 0]], 0.0);
        assert_eq!(input[[0, 0, 1, 1]], 0.0);
    }

    #[test]
    fn linear_is_identity() {
        let mut input = Array4::from_shape_vec(
            (1, 1, 2, 2),
            vec![-1.0, 2.0, -0.5, 0.0],
        ).unwrap();
        let expected = input.clone();

        Activation::Linear.apply_spatial(&mut input);

        assert_eq!(input, expected);
    }
}
