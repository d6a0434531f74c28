//! Developing statistics of n-dimensional series.
//!
//! A developing statistic is evaluated at every prefix of the accumulation
//! axis: position `i` holds the statistic of samples `0..=i`. The functions
//! here apply a [`DevelopingMoments`] accumulator to every lane (fiber) of the
//! array along the chosen axis, so the whole array is processed in a single
//! pass with `O(len)` work, never re-summing a prefix.
//!
//! All outputs have the shape of the input. Positions without a defined value
//! (the warm-up region of the standard deviation) are NaN.

use ndarray::{Array, ArrayBase, Axis, Data, Dimension, Zip};
use num_traits::Float;
use tracing::debug;

use crate::{
    DevelopingMoments, Result, VarianceEstimator,
    utils::{lane_len, resolve_axis, validate_ddof},
};

/// Runs one accumulator per lane along `axis` and records `stat` after every sample
fn develop<T, S, D, F>(
    series: &ArrayBase<S, D>,
    axis: Axis,
    ddof: usize,
    estimator: VarianceEstimator,
    stat: F,
) -> Array<T, D>
where
    T: Float + Default,
    S: Data<Elem = T>,
    D: Dimension,
    F: Fn(&DevelopingMoments<T>) -> Option<T>,
{
    let mut out = Array::from_elem(series.raw_dim(), T::nan());
    let mut moments = DevelopingMoments::new(ddof);
    moments.set_estimator(estimator);

    Zip::from(out.lanes_mut(axis))
        .and(series.lanes(axis))
        .for_each(|mut out_lane, lane| {
            moments.reset();
            for (o, &x) in out_lane.iter_mut().zip(lane.iter()) {
                let current: &DevelopingMoments<T> = moments.next(x);
                if let Some(v) = stat(current) {
                    *o = v;
                }
            }
        });
    out
}

/// Validates axis and lane length, returning the resolved axis
fn checked_axis<S, D>(series: &ArrayBase<S, D>, axis: isize) -> Result<Axis>
where
    S: Data,
    D: Dimension,
{
    let resolved = resolve_axis(axis, series.ndim())?;
    lane_len(series, resolved)?;
    Ok(resolved)
}

/// Computes the developing (running) mean along an axis
///
/// # Arguments
///
/// * `series` - The series, at least one-dimensional
/// * `axis` - The accumulation axis, negative values count from the end
///
/// # Returns
///
/// * `Result<Array<T, D>>` - Element `i` along `axis` is the mean of samples `0..=i`
///
/// # Examples
///
/// ```
/// # use ndarray::array;
/// # use piv_statistics::developing_mean;
/// let x = array![2.0f64, 4.0, 6.0];
/// assert_eq!(developing_mean(&x, 0).unwrap(), array![2.0, 3.0, 4.0]);
/// ```
pub fn developing_mean<T, S, D>(series: &ArrayBase<S, D>, axis: isize) -> Result<Array<T, D>>
where
    T: Float + Default,
    S: Data<Elem = T>,
    D: Dimension,
{
    let axis = checked_axis(series, axis)?;
    debug!(shape = ?series.shape(), axis = axis.index(), "developing mean");
    Ok(develop(
        series,
        axis,
        0,
        VarianceEstimator::default(),
        DevelopingMoments::mean,
    ))
}

/// Computes the developing standard deviation along an axis
///
/// The first `ddof` positions along `axis` are NaN. If `ddof` is not smaller
/// than the axis length, every position is NaN.
///
/// # Arguments
///
/// * `series` - The series, at least one-dimensional
/// * `axis` - The accumulation axis, negative values count from the end
/// * `ddof` - The Delta Degrees of Freedom, must not be negative
///
/// # Examples
///
/// ```
/// # use ndarray::array;
/// # use piv_statistics::developing_std;
/// let std = developing_std(&array![1.0f64, 1.0, 1.0, 1.0], 0, 1).unwrap();
/// assert!(std[0].is_nan());
/// assert_eq!(std.slice(ndarray::s![1..]), array![0.0, 0.0, 0.0]);
/// ```
pub fn developing_std<T, S, D>(
    series: &ArrayBase<S, D>,
    axis: isize,
    ddof: isize,
) -> Result<Array<T, D>>
where
    T: Float + Default,
    S: Data<Elem = T>,
    D: Dimension,
{
    developing_std_with(series, axis, ddof, VarianceEstimator::default())
}

/// Computes the developing standard deviation with an explicit variance recurrence
///
/// See [`developing_std`] for the warm-up semantics.
pub fn developing_std_with<T, S, D>(
    series: &ArrayBase<S, D>,
    axis: isize,
    ddof: isize,
    estimator: VarianceEstimator,
) -> Result<Array<T, D>>
where
    T: Float + Default,
    S: Data<Elem = T>,
    D: Dimension,
{
    let ddof = validate_ddof(ddof)?;
    let axis = checked_axis(series, axis)?;
    debug!(
        shape = ?series.shape(),
        axis = axis.index(),
        ddof,
        ?estimator,
        "developing standard deviation"
    );
    Ok(develop(series, axis, ddof, estimator, DevelopingMoments::stddev))
}

/// Computes the developing relative standard deviation along an axis
///
/// Element-wise ratio of [`developing_std`] and [`developing_mean`]. Used to
/// judge the convergence of a measurement. A developing mean of zero is not
/// guarded against and yields `inf` or `NaN`.
pub fn developing_relative_standard_deviation<T, S, D>(
    series: &ArrayBase<S, D>,
    axis: isize,
    ddof: isize,
) -> Result<Array<T, D>>
where
    T: Float + Default,
    S: Data<Elem = T>,
    D: Dimension,
{
    let ddof = validate_ddof(ddof)?;
    let axis = checked_axis(series, axis)?;
    debug!(
        shape = ?series.shape(),
        axis = axis.index(),
        ddof,
        "developing relative standard deviation"
    );
    Ok(develop(
        series,
        axis,
        ddof,
        VarianceEstimator::default(),
        DevelopingMoments::relative_stddev,
    ))
}
