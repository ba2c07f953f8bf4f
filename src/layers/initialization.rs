use ndarray::Array4;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Uniform;

/// Glorot/Xavier uniform bound for a convolution kernel.
///
/// For a kernel of spatial size (kh, kw) mapping `in_channels` to
/// `out_channels`, the fans are kh*kw*in_channels and kh*kw*out_channels and
/// the bound is sqrt(6 / (fan_in + fan_out)). Weights drawn uniformly from
/// [-bound, bound] keep activation variance stable across layers.
pub fn glorot_limit(in_channels: usize, out_channels: usize, kernel: (usize, usize)) -> f32 {
    let mul = (kernel.0 * kernel.1) as f32;
    let fan_in = in_channels as f32 * mul;
    let fan_out = out_channels as f32 * mul;
    (6.0 / (fan_in + fan_out)).sqrt()
}

/// Weight initialization strategies
#[derive(Debug, Clone)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization from the kernel's own fans
    XavierUniform,

    /// Uniform distribution with an explicit range
    Uniform { min: f32, max: f32 },
}

impl WeightInit {
    /// Initialize a convolution kernel shaped [kernel_h, kernel_w, in_channels, out_channels].
    pub fn initialize_conv_weights<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize, usize, usize),
        rng: &mut R,
    ) -> Array4<f32> {
        match self {
            WeightInit::XavierUniform => {
                let (kh, kw, in_channels, out_channels) = shape;
                let limit = glorot_limit(in_channels, out_channels, (kh, kw));
                Array4::random_using(shape, Uniform::new(-limit, limit), rng)
            }

            WeightInit::Uniform { min, max } => {
                Array4::random_using(shape, Uniform::new(*min, *max), rng)
            }
        }
    }
}
