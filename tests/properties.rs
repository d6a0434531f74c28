//! Invariant tests across the public API
//!
//! These complement the unit tests of each module by checking properties that
//! must hold for any input: prefix equivalence, axis independence, flag
//! decoding and the interplay of masking with the developing statistics.

use assert_approx_eq::assert_approx_eq;
use ndarray::{Array1, Array3, ArrayView1, Axis, array, s};
use piv_statistics::{
    DataField, DevelopingMoments, Error, FlagField, Summary, VarianceEstimator, developing_mean,
    developing_relative_standard_deviation, developing_std, developing_std_with,
    flags::{FlagMeaning, apply_mask, flag_label, flag_names, select_flagged},
    is_gaussian, nan_mean,
    velocity::InPlaneVector,
};

/// Deterministic pseudo-random series, xorshift64
fn noisy(len: usize, seed: u64) -> Array1<f64> {
    let mut state = seed;
    Array1::from_shape_fn(len, |_| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 10_000) as f64 / 1_000.0 - 5.0
    })
}

fn batch_std(lane: ArrayView1<f64>, ddof: usize) -> f64 {
    let n = lane.len() as f64;
    let mean = lane.sum() / n;
    let ss: f64 = lane.iter().map(|x| (x - mean) * (x - mean)).sum();
    (ss / (n - ddof as f64)).sqrt()
}

// ============================================================================
// Developing statistics
// ============================================================================

mod developing {
    use super::*;

    #[test]
    fn mean_of_increasing_series() {
        assert_eq!(
            developing_mean(&array![2.0f64, 4.0, 6.0], 0),
            Ok(array![2.0f64, 3.0, 4.0])
        );
    }

    #[test]
    fn std_of_constant_series() {
        let std = developing_std(&array![1.0f64, 1.0, 1.0, 1.0], 0, 1).unwrap();
        assert!(std[0].is_nan());
        assert_eq!(std.slice(s![1..]), array![0.0f64, 0.0, 0.0]);
    }

    #[test]
    fn every_prefix_matches_the_batch_statistic() {
        let x = noisy(200, 7);
        let mean = developing_mean(&x, 0).unwrap();
        let std = developing_std(&x, 0, 1).unwrap();

        for i in 0..x.len() {
            let prefix = x.slice(s![..=i]);
            assert_approx_eq!(mean[i], prefix.sum() / (i + 1) as f64, 1e-10);
            if i >= 1 {
                assert_approx_eq!(std[i], batch_std(prefix, 1), 1e-10);
            } else {
                assert!(std[i].is_nan(), "warm-up position {i} must be NaN");
            }
        }
    }

    #[test]
    fn estimators_agree_on_well_conditioned_data() {
        let x = noisy(500, 11);
        let welford = developing_std_with(&x, 0, 0, VarianceEstimator::Welford).unwrap();
        let sums = developing_std_with(&x, 0, 0, VarianceEstimator::SumOfSquares).unwrap();
        for (a, b) in welford.iter().zip(sums.iter()) {
            assert_approx_eq!(a, b, 1e-9);
        }
    }

    #[test]
    fn result_does_not_depend_on_axis_layout() {
        // time on axis 0 versus the same data with time on the last axis
        let cube = Array3::from_shape_fn((30, 4, 3), |(t, j, i)| {
            ((t * 7 + j * 3 + i) % 11) as f64 * 0.5
        });
        let moved = cube.view().permuted_axes([1, 2, 0]);

        let a = developing_std(&cube, 0, 1).unwrap();
        let b = developing_std(&moved, -1, 1).unwrap();
        let b = b.permuted_axes([2, 0, 1]);

        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!(x.is_nan() && y.is_nan() || (x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn lanes_are_independent() {
        let x = noisy(40, 3);
        let y = noisy(40, 5);
        let mut both = ndarray::Array2::<f64>::zeros((40, 2));
        both.column_mut(0).assign(&x);
        both.column_mut(1).assign(&y);

        let rstd = developing_relative_standard_deviation(&both, 0, 1).unwrap();
        let rx = developing_relative_standard_deviation(&x, 0, 1).unwrap();
        let ry = developing_relative_standard_deviation(&y, 0, 1).unwrap();
        for i in 1..40 {
            assert_eq!(rstd[[i, 0]].to_bits(), rx[i].to_bits());
            assert_eq!(rstd[[i, 1]].to_bits(), ry[i].to_bits());
        }
    }

    #[test]
    fn relative_std_with_zero_mean_is_not_finite() {
        let rstd = developing_relative_standard_deviation(&array![-1.0f64, 1.0], 0, 0).unwrap();
        assert!(!rstd[1].is_finite());
    }

    #[test]
    fn streaming_accumulator_matches_array_functions() {
        let x = noisy(64, 13);
        let std = developing_std(&x, 0, 2).unwrap();
        let mut moments = DevelopingMoments::new(2);
        for (i, &v) in x.iter().enumerate() {
            let value = moments.next(v).stddev().unwrap_or(f64::NAN);
            assert!(value.is_nan() && std[i].is_nan() || value == std[i]);
        }
    }

    #[test]
    fn invalid_arguments_fail_before_computing() {
        let x = array![[1.0f64, 2.0], [3.0, 4.0]];
        assert_eq!(
            developing_mean(&x, 2),
            Err(Error::InvalidAxis { axis: 2, ndim: 2 })
        );
        assert_eq!(
            developing_std(&x, 0, -1),
            Err(Error::InvalidDegreesOfFreedom(-1))
        );
        assert_eq!(
            developing_mean(&ndarray::Array2::<f64>::zeros((0, 2)), 0),
            Err(Error::EmptyInput)
        );
    }
}

// ============================================================================
// Flags
// ============================================================================

mod flags {
    use super::*;

    #[test]
    fn names_of_set_bits() {
        let meaning: FlagMeaning = [(1, "ACTIVE"), (4, "REPLACED")].into_iter().collect();
        assert_eq!(flag_names(5, &meaning), ["ACTIVE", "REPLACED"]);
    }

    #[test]
    fn zero_is_inactive_whatever_the_meaning() {
        assert_eq!(flag_names(0, &FlagMeaning::piv()), ["INACTIVE"]);
        assert_eq!(flag_names(0, &FlagMeaning::new()), ["INACTIVE"]);
    }

    #[test]
    fn every_decoded_name_is_a_set_bit() {
        let meaning = FlagMeaning::piv();
        for value in 0..=u8::MAX as u32 {
            let names = flag_names(value, &meaning);
            if value == 0 {
                continue;
            }
            let bits: u32 = names.iter().filter_map(|n| meaning.bit(n)).sum();
            assert_eq!(bits, value, "decoded {names:?} for {value}");
        }
        assert_eq!(flag_label(33, &meaning), "ACTIVE_INTERPOLATED");
    }

    #[test]
    fn masked_samples_do_not_survive_developing_statistics() {
        let data = array![1.0f64, 2.0, 3.0, 4.0];
        let flags = array![1, 1, 33, 1];
        let masked = apply_mask(&data, &flags, 32).unwrap();
        let mean = developing_mean(&masked, 0).unwrap();
        assert_eq!(mean.slice(s![..2]), array![1.0f64, 1.5]);
        assert!(mean.slice(s![2..]).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn selecting_and_masking_partition_the_samples() {
        let data = Array3::from_shape_fn((6, 2, 3), |(t, j, i)| (t + j * 10 + i * 100) as f64);
        let flags = Array3::from_shape_fn((6, 2, 3), |(t, j, i)| {
            if (t + j + i) % 3 == 0 { 33 } else { 1 }
        });
        let kept = select_flagged(&data, &flags, 32).unwrap();
        let dropped = apply_mask(&data, &flags, 32).unwrap();
        for ((k, d), x) in kept.iter().zip(dropped.iter()).zip(data.iter()) {
            assert!(k.is_nan() != d.is_nan());
            let value = if k.is_nan() { d } else { k };
            assert_eq!(value, x);
        }
    }

    #[test]
    fn active_time_average_ignores_inactive_vectors() {
        // time x points, point 1 drops out at t = 2
        let u = array![[1.0f64, 2.0], [3.0, 4.0], [5.0, 1.0e6]];
        let v = array![[0.0f64, 0.0], [0.0, 0.0], [0.0, 1.0e6]];
        let flags = array![[1u32, 1], [1, 1], [1, 0]];

        let mean = InPlaneVector::new(&u, &v)
            .unwrap()
            .time_average(&flags, 0, 1)
            .unwrap();
        assert_eq!(mean.u, array![3.0, 3.0]);
        assert_eq!(mean.mag, array![3.0, 3.0]);
        assert_eq!(mean.u, nan_mean(&select_flagged(&u, &flags, 1).unwrap(), 0).unwrap());
    }
}

// ============================================================================
// Normality
// ============================================================================

mod normality {
    use super::*;

    #[test]
    fn shapiro_wilk_separates_bell_shaped_from_uniform_lanes() {
        // lane 0: sums of twelve uniform draws, lane 1: evenly spaced on [0, 1)
        let draws = noisy(1200, 11);
        let n = 100;
        let mut x = ndarray::Array2::<f64>::zeros((n, 2));
        for (i, chunk) in draws.exact_chunks(12).into_iter().enumerate() {
            x[[i, 0]] = chunk.sum() / 10.0;
            x[[i, 1]] = (i as f64 + 0.5) / n as f64;
        }

        let gaussian = is_gaussian(&x, 0, "shapiro", 0.05).unwrap();
        assert_eq!(gaussian, array![true, false]);
    }
}
