pub mod encoder;

pub use encoder::DenseEncoderBuilder;
