use num_traits::Float;

use crate::{Kbn, helper::count_as};

/// Recurrence used to update the second central moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarianceEstimator {
    /// Welford's one-pass update of the sum of squared deviations
    #[default]
    Welford,
    /// Running sum and sum of squares, `(Q - S²/n) / (n - ddof)`
    ///
    /// Both sums are compensated, the numerator is clamped at zero. Large
    /// means with small spread still lose precision to cancellation.
    SumOfSquares,
}

/// Developing (expanding window) moments of a series.
///
/// Every pushed value extends the window by one sample, nothing is ever evicted.
/// After `n` calls to [`next`](Self::next) the statistics describe samples `0..n`.
/// A statistic becomes available once more than `ddof` samples have been seen,
/// which makes the first `ddof` positions of a developing series undefined.
///
/// The running sums use the Kahan-Babuska-Neumaier algorithm so that long
/// accumulations (many recordings of a PIV campaign) do not drift.
#[derive(Debug, Clone)]
pub struct DevelopingMoments<T> {
    /// Number of accumulated samples
    count: usize,
    /// Delta Degrees of Freedom
    ddof: usize,
    /// Variance recurrence
    estimator: VarianceEstimator,
    /// Most recent value pushed
    value: Option<T>,
    /// Sum of inputs
    sum: Kbn<T>,
    /// Sum of squares
    sum_sq: Kbn<T>,
    /// Welford mean
    mean: T,
    /// Welford sum of squared deviations from the mean
    m2: T,
}

impl<T: Float + Default> DevelopingMoments<T> {
    /// Creates a new `DevelopingMoments` instance
    ///
    /// # Arguments
    ///
    /// * `ddof` - The Delta Degrees of Freedom
    ///
    /// # Returns
    ///
    /// * `Self` - The moments object
    pub fn new(ddof: usize) -> Self {
        Self {
            count: 0,
            ddof,
            estimator: VarianceEstimator::default(),
            value: None,
            sum: Kbn::default(),
            sum_sq: Kbn::default(),
            mean: T::zero(),
            m2: T::zero(),
        }
    }

    /// Returns the Delta Degrees of Freedom
    #[inline]
    pub const fn ddof(&self) -> usize {
        self.ddof
    }

    /// Sets the Delta Degrees of Freedom
    ///
    /// # Arguments
    ///
    /// * `ddof` - The Delta Degrees of Freedom
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The moments object
    #[inline]
    pub const fn set_ddof(&mut self, ddof: usize) -> &mut Self {
        self.ddof = ddof;
        self
    }

    /// Returns the variance recurrence in use
    #[inline]
    pub const fn estimator(&self) -> VarianceEstimator {
        self.estimator
    }

    /// Sets the variance recurrence
    ///
    /// Both estimators are maintained on every update, switching never
    /// requires a replay of the series.
    #[inline]
    pub const fn set_estimator(&mut self, estimator: VarianceEstimator) -> &mut Self {
        self.estimator = estimator;
        self
    }

    /// Resets the moments
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The moments object
    #[inline]
    pub fn reset(&mut self) -> &mut Self {
        self.count = 0;
        self.value = None;
        self.sum = Kbn::default();
        self.sum_sq = Kbn::default();
        self.mean = T::zero();
        self.m2 = T::zero();
        self
    }

    /// Extends the window with a new value
    ///
    /// # Arguments
    ///
    /// * `value` - The next sample of the series
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The moments object
    #[inline]
    pub fn next(&mut self, value: T) -> &mut Self {
        self.value = Some(value);
        self.count += 1;

        self.sum += value;
        self.sum_sq += value * value;

        let n = count_as::<T>(self.count);
        let delta = value - self.mean;
        self.mean = self.mean + delta / n;
        self.m2 = self.m2 + delta * (value - self.mean);
        self
    }

    /// Returns the most recent value
    #[inline]
    pub const fn value(&self) -> Option<T> {
        self.value
    }

    /// Returns the number of accumulated samples
    #[inline]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Returns true once more than `ddof` samples were accumulated
    #[inline]
    pub const fn is_ready(&self) -> bool {
        self.count > self.ddof
    }

    /// Returns the sum of all accumulated values
    #[inline]
    pub fn sum(&self) -> Option<T> {
        (self.count > 0).then(|| self.sum.total())
    }

    /// Returns the sum of squares of all accumulated values
    #[inline]
    pub fn sum_sq(&self) -> Option<T> {
        (self.count > 0).then(|| self.sum_sq.total())
    }

    /// Returns the arithmetic mean of all accumulated values
    ///
    /// Equivalent to the recurrence `mean_i = (mean_{i-1} * i + x_i) / (i + 1)`,
    /// evaluated from the compensated sum.
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The mean, or `None` before the first sample
    #[inline]
    pub fn mean(&self) -> Option<T> {
        self.sum().map(|s| s / count_as(self.count))
    }

    /// Returns the variance of all accumulated values
    ///
    /// The denominator is `n - ddof`.
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The variance, or `None` while at most `ddof` samples were seen
    #[inline]
    pub fn variance(&self) -> Option<T> {
        if !self.is_ready() {
            return None;
        }
        let n = count_as::<T>(self.count);
        let denom = count_as::<T>(self.count - self.ddof);
        let m2 = match self.estimator {
            VarianceEstimator::Welford => self.m2,
            VarianceEstimator::SumOfSquares => {
                let s = self.sum.total();
                (self.sum_sq.total() - s * s / n).max(T::zero())
            }
        };
        Some(m2 / denom)
    }

    /// Returns the standard deviation of all accumulated values
    #[inline]
    pub fn stddev(&self) -> Option<T> {
        self.variance().map(Float::sqrt)
    }

    /// Returns the standard deviation normalized by the mean
    ///
    /// Used to judge convergence of a measurement: the ratio settles once
    /// enough samples were recorded. A zero mean is not guarded against and
    /// yields `inf` or `NaN`.
    #[inline]
    pub fn relative_stddev(&self) -> Option<T> {
        self.stddev().zip(self.mean()).map(|(std, mean)| std / mean)
    }
}
