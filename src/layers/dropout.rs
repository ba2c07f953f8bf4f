use ndarray::{Array4, ArrayView4};
use rand::Rng;
use serde::{Serialize, Deserialize};

/// Dropout Layer
///
/// Randomly zeroes elements with probability `rate` during training and
/// scales the survivors by 1/(1 - rate), so activations keep their expected
/// magnitude. Inference passes the input through unchanged.
#[derive(Serialize, Deserialize, Clone)]
pub struct DropoutLayer {
    /// Dropout probability (probability of dropping a unit)
    pub rate: f32,
}

impl DropoutLayer {
    /// Create a new dropout layer
    pub fn new(rate: f32) -> Self {
        assert!((0.0..1.0).contains(&rate), "Dropout rate must be in [0, 1)");

        DropoutLayer { rate }
    }

    /// Apply dropout to a batch of feature maps, drawing the drop decisions
    /// from `rng`.
    pub fn forward<R: Rng + ?Sized>(
        &self,
        input: ArrayView4<f32>,
        training: bool,
        rng: &mut R,
    ) -> Array4<f32> {
        if !training || self.rate == 0.0 {
            // No dropout during inference or if rate is 0
            return input.to_owned();
        }

        let scale = 1.0 / (1.0 - self.rate);
        let mut output = input.to_owned();

        output.mapv_inplace(|v| {
            if rng.gen::<f32>() < self.rate {
                0.0
            } else {
                v * scale
            }
        });

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn inference_is_identity() {
        let mut rng = StdRng::seed_from_u64(11);
        let layer = DropoutLayer::new(0.5);
        let input = Array4::from_elem((1, 4, 4, 2), 3.0);

        let output = layer.forward(input.view(), false, &mut rng);

        assert_eq!(output, input);
    }

    #[test]
    fn zero_rate_is_identity_in_training() {
        let mut rng = StdRng::seed_from_u64(11);
        let layer = DropoutLayer::new(0.0);
        let input = Array4::from_elem((1, 4, 4, 2), 3.0);

        let output = layer.forward(input.view(), true, &mut rng);

        assert_eq!(output, input);
    }

    #[test]
    fn training_drops_and_rescales() {
        let mut rng = StdRng::seed_from_u64(11);
        let layer = DropoutLayer::new(0.5);
        let input = Array4::from_elem((1, 16, 16, 4), 1.0);

        let output = layer.forward(input.view(), true, &mut rng);

        let zeros = output.iter().filter(|&&v| v == 0.0).count();
        let total = output.len();

        // Roughly half the 1024 elements should be dropped
        assert!(zeros > total / 3 && zeros < 2 * total / 3);
        // Survivors carry the inverted-dropout scale
        assert!(output.iter().all(|&v| v == 0.0 || (v - 2.0).abs() < 1e-6));
    }
}
