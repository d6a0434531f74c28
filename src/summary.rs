use ndarray::{Array, ArrayBase, Data, Dimension, RemoveAxis};
use num_traits::Float;
use ordered_float::PrimitiveFloat;

use crate::{
    DevelopingMoments, Result,
    helper::{median_from_sorted_slice, sorted_finite},
    utils::{lane_len, resolve_axis},
};

/// Scalar statistics of a whole array.
///
/// Only finite values take part, masked (NaN) samples are skipped. The
/// standard deviation uses `ddof = 0`. Every statistic is NaN when the array
/// holds no finite value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary<T> {
    /// Number of finite values
    pub count: usize,
    /// Smallest finite value
    pub min: T,
    /// Largest finite value
    pub max: T,
    /// Arithmetic mean
    pub mean: T,
    /// Population standard deviation
    pub std: T,
    /// Median
    pub median: T,
}

impl<T: Float + Default> Summary<T> {
    /// Summarizes all finite values of an array
    ///
    /// # Examples
    ///
    /// ```
    /// # use ndarray::array;
    /// # use piv_statistics::Summary;
    /// let s = Summary::of(&array![[1.0, f64::NAN], [3.0, 2.0]]);
    /// assert_eq!(s.count, 3);
    /// assert_eq!((s.min, s.max, s.mean, s.median), (1.0, 3.0, 2.0, 2.0));
    /// ```
    pub fn of<S, D>(array: &ArrayBase<S, D>) -> Self
    where
        T: PrimitiveFloat,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let sorted = sorted_finite(array.iter());
        let mut moments = DevelopingMoments::new(0);
        for &x in &sorted {
            moments.next(x);
        }

        Self {
            count: sorted.len(),
            min: sorted.first().copied().unwrap_or_else(Float::nan),
            max: sorted.last().copied().unwrap_or_else(Float::nan),
            mean: moments.mean().unwrap_or_else(Float::nan),
            std: moments.stddev().unwrap_or_else(Float::nan),
            median: median_from_sorted_slice(&sorted).unwrap_or_else(Float::nan),
        }
    }
}

/// Arithmetic mean along an axis, skipping NaN samples
///
/// The axis is removed. A lane without any non-NaN sample yields NaN.
///
/// # Examples
///
/// ```
/// # use ndarray::array;
/// # use piv_statistics::nan_mean;
/// let x = array![[1.0f64, f64::NAN], [3.0, f64::NAN]];
/// let mean = nan_mean(&x, 0).unwrap();
/// assert_eq!(mean[0], 2.0);
/// assert!(mean[1].is_nan());
/// ```
pub fn nan_mean<T, S, D>(series: &ArrayBase<S, D>, axis: isize) -> Result<Array<T, D::Smaller>>
where
    T: Float + Default,
    S: Data<Elem = T>,
    D: RemoveAxis,
{
    let axis = resolve_axis(axis, series.ndim())?;
    lane_len(series, axis)?;
    Ok(series.map_axis(axis, |lane| {
        let mut moments = DevelopingMoments::new(0);
        for &x in lane.iter().filter(|x| !x.is_nan()) {
            moments.next(x);
        }
        moments.mean().unwrap_or_else(T::nan)
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use ndarray::{Array1, array};

    use super::*;

    #[test]
    fn summary_works() {
        let s = Summary::of(&array![25.4f64, 26.2, 26.0, 26.1, 25.8]);
        assert_eq!(s.count, 5);
        assert_eq!(s.min, 25.4);
        assert_eq!(s.max, 26.2);
        assert_approx_eq!(s.mean, 25.9, 1e-12);
        assert_approx_eq!(s.std, 0.2828, 0.0001);
        assert_eq!(s.median, 26.0);
    }

    #[test]
    fn summary_skips_masked_samples() {
        let s = Summary::of(&array![[f64::NAN, 4.0], [2.0, f64::INFINITY]]);
        assert_eq!(s.count, 2);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.std, 1.0);
        assert_eq!(s.median, 3.0);
    }

    #[test]
    fn nan_mean_skips_masked_samples() {
        let x = array![[1.0f64, 2.0, f64::NAN], [3.0, f64::NAN, f64::NAN]];
        let mean = nan_mean(&x, 0).unwrap();
        assert_eq!(mean.slice(ndarray::s![..2]), array![2.0, 2.0]);
        assert!(mean[2].is_nan());

        let mean = nan_mean(&x, -1).unwrap();
        assert_eq!(mean, array![1.5, 3.0]);
    }

    #[test]
    fn nan_mean_rejects_invalid_axis_and_empty_lanes() {
        let x = Array1::<f64>::zeros(0);
        assert_eq!(nan_mean(&x, 0), Err(crate::Error::EmptyInput));
        assert_eq!(
            nan_mean(&array![1.0f64], 1),
            Err(crate::Error::InvalidAxis { axis: 1, ndim: 1 })
        );
    }

    #[test]
    fn summary_of_empty_array_is_nan() {
        let s = Summary::of(&Array1::<f32>::from_elem(3, f32::NAN));
        assert_eq!(s.count, 0);
        assert!(s.min.is_nan());
        assert!(s.max.is_nan());
        assert!(s.mean.is_nan());
        assert!(s.std.is_nan());
        assert!(s.median.is_nan());
    }
}
