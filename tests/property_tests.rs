#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use theia::activations::Activation;
    use theia::encoder::{DenseEncoder, EncoderConfig};
    use theia::layers::{glorot_limit, Conv2DLayer, Padding};

    proptest! {
        #[test]
        fn conv_weights_respect_glorot_bound(
            in_channels in 1usize..=8,
            out_channels in 1usize..=8,
            kernel_h in 1usize..=4,
            kernel_w in 1usize..=4,
            seed in any::<u64>()
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let layer = Conv2DLayer::new(
                in_channels,
                out_channels,
                (kernel_h, kernel_w),
                (1, 1),
                Padding::Valid,
                Activation::Linear,
                &mut rng,
            );
            let limit = glorot_limit(in_channels, out_channels, (kernel_h, kernel_w));

            for &w in layer.kernels.iter() {
                prop_assert!(w.abs() <= limit, "weight {} outside bound {}", w, limit);
            }
        }

        #[test]
        fn channel_fold_matches_layer_widths(
            blocks in 1usize..=4,
            levels in 1usize..=4,
            growth_rate in 1usize..=8,
            stem_filters in 4usize..=16,
            compression in 0.5f32..=1.0,
            seed in any::<u64>()
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = EncoderConfig {
                blocks,
                levels,
                growth_rate,
                dropout_rate: 0.2,
                compression,
                in_channels: 1,
                stem_filters,
                stem_stride: 2,
                stem_kernel: (7, 7),
            };
            let encoder = DenseEncoder::new(config, &mut rng);

            // Replay the channel arithmetic independently
            let mut channels = stem_filters;
            for i in 0..blocks {
                for j in 0..levels {
                    prop_assert_eq!(encoder.blocks[i].levels[j].bottleneck.in_channels, channels);
                    prop_assert_eq!(encoder.blocks[i].levels[j].bottleneck.out_channels, 4 * growth_rate);
                    prop_assert_eq!(encoder.blocks[i].levels[j].conv.out_channels, growth_rate);
                    channels += growth_rate;
                }
                if i + 1 < blocks {
                    let compressed = (channels as f32 * compression) as usize;
                    prop_assert_eq!(encoder.transitions[i].in_channels, channels);
                    prop_assert_eq!(encoder.transitions[i].out_channels, compressed);
                    channels = compressed;
                }
            }
            prop_assert_eq!(encoder.out_channels(), channels);
        }

        #[test]
        fn same_padding_output_is_ceil_of_input_over_stride(
            input in 1usize..=128,
            kernel in 1usize..=7,
            stride in 1usize..=4
        ) {
            let (output, before, after) = Padding::Same.resolve(input, kernel, stride);

            prop_assert_eq!(output, (input + stride - 1) / stride);
            // Padded input covers every window exactly
            prop_assert!(before + input + after >= (output - 1) * stride + kernel);
        }
    }
}
