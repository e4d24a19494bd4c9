use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use regate::gating::{partition, threshold_mask, GatingParams};
use regate::regate_errors::RegateError;

fn params(gating_thresh: f64) -> GatingParams {
    GatingParams {
        gating_thresh,
        ..GatingParams::default()
    }
}

#[test]
fn test_ramp_trace_gating_indices() {
    // Trace 1..=100 with a 50th-percentile threshold and 5% margins:
    // the bottom/top 5% extremes are excluded, the retained band is
    // values 6..=95, its median standardized value is 0, and the samples
    // below it (values 51..=95) are gated in. As 0-based indices that is
    // exactly 50..=94.
    let trace: Array1<f64> = Array1::from_iter((1..=100).map(|v| v as f64));
    let mask = threshold_mask(trace.view(), &params(50.0)).unwrap();

    assert_eq!(mask.len(), 100);
    let included: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, &m)| (m == 1).then_some(i))
        .collect();
    let expected: Vec<usize> = (50..=94).collect();
    assert_eq!(included, expected);
}

#[test]
fn mask_length_and_values_for_arbitrary_traces() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in [1usize, 2, 17, 256, 1000] {
        let trace: Array1<f64> = Array1::from_shape_fn(n, |_| rng.random_range(-3.0..3.0));
        match threshold_mask(trace.view(), &params(50.0)) {
            Ok(mask) => {
                assert_eq!(mask.len(), n);
                assert!(mask.iter().all(|&m| m == 0 || m == 1));
            }
            // Tiny traces can legitimately collapse to zero robust scale.
            Err(RegateError::DegenerateSignal(_)) => assert!(n < 3),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}

#[test]
fn threshold_mask_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(7);
    let trace: Array1<f64> = Array1::from_shape_fn(512, |_| rng.random_range(0.0..1.0));
    let p = params(37.5);

    let first = threshold_mask(trace.view(), &p).unwrap();
    let second = threshold_mask(trace.view(), &p).unwrap();
    assert_eq!(first, second);
}

#[test]
fn boundary_thresholds_are_handled_explicitly() {
    let trace: Array1<f64> = Array1::from_iter((1..=100).map(|v| v as f64));

    // Percentile 0: nothing is below the minimum of the retained band.
    let mask = threshold_mask(trace.view(), &params(0.0)).unwrap();
    assert!(mask.iter().all(|&m| m == 0));

    // Percentile 100: the whole non-extreme band is included, extremes
    // stay excluded. For the ramp the band is values 6..=95.
    let mask = threshold_mask(trace.view(), &params(100.0)).unwrap();
    let count = mask.iter().filter(|&&m| m == 1).count();
    assert_eq!(count, 90);
    assert_eq!(mask[4], 0);
    assert_eq!(mask[5], 1);
    assert_eq!(mask[94], 1);
    assert_eq!(mask[95], 0);
}

#[test]
fn out_of_range_threshold_is_a_configuration_error() {
    let trace: Array1<f64> = Array1::from_iter((1..=10).map(|v| v as f64));
    for thresh in [-1.0, 100.1] {
        let res = threshold_mask(trace.view(), &params(thresh));
        assert!(matches!(res, Err(RegateError::Configuration(_))));
    }
}

#[test]
fn partition_shapes_match_mask_population() {
    // 8 coils, 1000 readouts, mask retaining 400 readouts.
    let ksp = Array2::from_shape_fn((8, 1000), |(c, j)| {
        Complex64::new(c as f64, j as f64)
    });
    let coord = Array2::from_shape_fn((1000, 3), |(j, d)| (j + d) as f64);
    let dcf = Array1::from_shape_fn(1000, |j| 1.0 + j as f64);
    let mask = Array1::from_shape_fn(1000, |j| u8::from(j % 5 < 2));
    assert_eq!(mask.iter().filter(|&&m| m == 1).count(), 400);

    let (gksp, gcoord, gdcf) = partition(&mask, ksp.view(), coord.view(), dcf.view()).unwrap();
    assert_eq!(gksp.dim(), (8, 400));
    assert_eq!(gcoord.dim(), (400, 3));
    assert_eq!(gdcf.len(), 400);
}

#[test]
fn partition_preserves_relative_order() {
    let n = 64;
    let ksp = Array2::from_shape_fn((2, n), |(_, j)| Complex64::new(j as f64, 0.0));
    let coord = Array2::from_shape_fn((n, 3), |(j, _)| j as f64);
    let dcf = Array1::from_shape_fn(n, |j| j as f64);
    let mask = Array1::from_shape_fn(n, |j| u8::from(j % 3 == 0));

    let (gksp, gcoord, gdcf) = partition(&mask, ksp.view(), coord.view(), dcf.view()).unwrap();

    let expected: Vec<f64> = (0..n).filter(|j| j % 3 == 0).map(|j| j as f64).collect();
    assert_eq!(gdcf.to_vec(), expected);
    for (row, &e) in gcoord.rows().into_iter().zip(&expected) {
        assert_eq!(row[0], e);
    }
    for (v, &e) in gksp.row(0).iter().zip(&expected) {
        assert_eq!(v.re, e);
    }
}

#[test]
fn all_ones_mask_is_the_identity_partition() {
    let n = 32;
    let ksp = Array2::from_shape_fn((3, n), |(c, j)| Complex64::new(c as f64, j as f64));
    let coord = Array2::from_shape_fn((n, 3), |(j, d)| (j * 7 + d) as f64);
    let dcf = Array1::from_shape_fn(n, |j| 0.5 + j as f64);
    let mask = Array1::from_elem(n, 1u8);

    let (gksp, gcoord, gdcf) = partition(&mask, ksp.view(), coord.view(), dcf.view()).unwrap();
    assert_eq!(gksp, ksp);
    assert_eq!(gcoord, coord);
    assert_eq!(gdcf, dcf);
}

#[test]
fn partition_rejects_inconsistent_lengths() {
    let ksp = Array2::from_elem((2, 10), Complex64::new(0.0, 0.0));
    let coord = Array2::<f64>::zeros((9, 3));
    let dcf = Array1::<f64>::ones(10);
    let mask = Array1::from_elem(10, 1u8);

    let res = partition(&mask, ksp.view(), coord.view(), dcf.view());
    match res {
        Err(RegateError::ShapeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 10);
            assert_eq!(actual, 9);
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
}
