use ndarray::{Array1, Array4, ArrayView4, s};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Uniform;
use serde::{Serialize, Deserialize};

/// Batch Normalization over the channel axis of (batch, height, width, channels)
/// feature maps.
///
/// Statistics are computed per channel across the batch and both spatial
/// dimensions. The learnable scale (gamma) is initialized uniformly in
/// [-1/sqrt(channels), 1/sqrt(channels)]; the shift (beta) starts at zero.
#[derive(Serialize, Deserialize, Clone)]
pub struct BatchNorm2DLayer {
    /// Scale parameter (gamma)
    pub gamma: Array1<f32>,

    /// Shift parameter (beta)
    pub beta: Array1<f32>,

    /// Running mean for inference
    pub running_mean: Array1<f32>,

    /// Running variance for inference
    pub running_var: Array1<f32>,

    /// Decay of the running statistics: running = running * momentum + batch * (1 - momentum)
    pub momentum: f32,

    /// Small constant for numerical stability
    pub epsilon: f32,
}

impl BatchNorm2DLayer {
    /// Create a new batch normalization layer, drawing the scale parameters
    /// from `rng`.
    pub fn new<R: Rng + ?Sized>(
        num_features: usize,
        momentum: f32,
        epsilon: f32,
        rng: &mut R,
    ) -> Self {
        let limit = 1.0 / (num_features as f32).sqrt();

        BatchNorm2DLayer {
            gamma: Array1::random_using(num_features, Uniform::new(-limit, limit), rng),
            beta: Array1::zeros(num_features),
            running_mean: Array1::zeros(num_features),
            running_var: Array1::ones(num_features),
            momentum,
            epsilon,
        }
    }

    /// Normalize a batch of feature maps.
    ///
    /// Training mode normalizes with batch statistics and updates the running
    /// estimates. Inference mode normalizes with the frozen running estimates
    /// and leaves all state untouched.
    pub fn forward(&mut self, input: ArrayView4<f32>, training: bool) -> Array4<f32> {
        let (batch_size, height, width, channels) = input.dim();
        let n = (batch_size * height * width) as f32;

        let mut output = input.to_owned();

        for c in 0..channels {
            let lane = input.slice(s![.., .., .., c]);

            let (mean, var) = if training {
                // Biased variance, matching the statistics the running
                // estimates accumulate
                let mean = lane.sum() / n;
                let var = lane.fold(0.0, |acc, &v| acc + (v - mean) * (v - mean)) / n;

                self.running_mean[c] = self.running_mean[c] * self.momentum + mean * (1.0 - self.momentum);
                self.running_var[c] = self.running_var[c] * self.momentum + var * (1.0 - self.momentum);

                (mean, var)
            } else {
                (self.running_mean[c], self.running_var[c])
            };

            let std = (var + self.epsilon).sqrt();
            let gamma = self.gamma[c];
            let beta = self.beta[c];

            output
                .slice_mut(s![.., .., .., c])
                .mapv_inplace(|v| gamma * (v - mean) / std + beta);
        }

        output
    }
}
