use ndarray::{Array3, Array4};
use rand::rngs::StdRng;
use rand::SeedableRng;

use theia::builders::DenseEncoderBuilder;

#[test]
fn encoder_end_to_end_shapes() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut encoder = DenseEncoderBuilder::new()
        .blocks(3)
        .levels(2)
        .growth_rate(12)
        .stem_filters(24)
        .compression(0.5)
        .build(&mut rng)
        .unwrap();

    // Channel plan: stem 24; block 0 -> 48, compressed to 24; block 1 -> 48,
    // compressed to 24; block 2 -> 48 with no trailing transition
    assert_eq!(encoder.out_channels(), 48);
    assert_eq!(encoder.spatial_reduction(), 16);

    let images = Array4::from_elem((1, 64, 64, 1), 0.5);
    let mask = Array3::ones((1, 64, 64));

    let (reduced_mask, features) = encoder.forward(images.view(), mask.view(), false, &mut rng);

    // 64 -> 16 through the stem, then one halving per transition
    assert_eq!(features.dim(), (1, 4, 4, 48));
    assert_eq!(reduced_mask.dim(), (1, 4, 4));
}

#[test]
fn inference_forwards_are_repeatable() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut encoder = DenseEncoderBuilder::new()
        .blocks(2)
        .levels(1)
        .growth_rate(4)
        .stem_filters(8)
        .build(&mut rng)
        .unwrap();

    let images = Array4::from_elem((1, 32, 32, 1), 0.25);
    let mask = Array3::ones((1, 32, 32));

    let stats_before = encoder.stem_bn.running_mean.clone();

    let (first_mask, first) = encoder.forward(images.view(), mask.view(), false, &mut rng);
    let (second_mask, second) = encoder.forward(images.view(), mask.view(), false, &mut rng);

    // Inference must not drift: same outputs, untouched running statistics
    assert_eq!(first, second);
    assert_eq!(first_mask, second_mask);
    assert_eq!(encoder.stem_bn.running_mean, stats_before);
}

#[test]
fn training_forwards_update_batch_statistics() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut encoder = DenseEncoderBuilder::new()
        .blocks(2)
        .levels(1)
        .growth_rate(4)
        .stem_filters(8)
        .build(&mut rng)
        .unwrap();

    let images = Array4::from_elem((2, 32, 32, 1), 0.75);
    let mask = Array3::ones((2, 32, 32));

    let stats_before = encoder.stem_bn.running_mean.clone();

    let (reduced_mask, features) = encoder.forward(images.view(), mask.view(), true, &mut rng);

    assert_eq!(features.dim(), (2, 4, 4, encoder.out_channels()));
    assert_eq!(reduced_mask.dim(), (2, 4, 4));
    assert_ne!(encoder.stem_bn.running_mean, stats_before);
}
