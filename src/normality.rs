//! Normality tests applied lane by lane.
//!
//! Each lane along the chosen axis is treated as one sample (for example the
//! time series of a single PIV vector) and tested for a Gaussian distribution.
//! The tests are computed in `f64` whatever the element type of the series.

use alloc::{string::String, vec::Vec};

use core::{
    f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2},
    str::FromStr,
};

use ndarray::{Array, ArrayBase, Data, RemoveAxis};
use num_traits::Float;
use tracing::debug;

use crate::{
    Error, Result,
    helper::{count_as, sorted_finite},
    utils::{lane_len, resolve_axis},
};

/// Supported normality tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalityMethod {
    /// Shapiro-Wilk W test, Royston's approximation of the coefficients and p-value
    ShapiroWilk,
    /// Jarque-Bera test on sample skewness and kurtosis
    JarqueBera,
    /// D'Agostino and Pearson omnibus K² test
    DagostinoPearson,
    /// Anderson-Darling test with estimated mean and variance
    AndersonDarling,
}

impl FromStr for NormalityMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shapiro" | "shapiro_wilk" => Ok(Self::ShapiroWilk),
            "jarque_bera" => Ok(Self::JarqueBera),
            "dagostino_pearson" => Ok(Self::DagostinoPearson),
            "anderson_darling" => Ok(Self::AndersonDarling),
            _ => Err(Error::UnknownNormalityMethod(String::from(s))),
        }
    }
}

impl NormalityMethod {
    /// Smallest sample the test is defined for
    pub const fn min_samples(self) -> usize {
        match self {
            Self::ShapiroWilk => 3,
            Self::JarqueBera => 4,
            Self::DagostinoPearson => 8,
            Self::AndersonDarling => 3,
        }
    }

    /// Computes the p-value of the null hypothesis "the sample is Gaussian"
    ///
    /// Returns NaN for samples that are too small, constant, or contain
    /// non-finite values.
    pub fn p_value(self, sample: &[f64]) -> f64 {
        if sample.len() < self.min_samples() || sample.iter().any(|v| !v.is_finite()) {
            return f64::NAN;
        }
        let Some(m) = Moments::of(sample) else {
            return f64::NAN;
        };
        match self {
            Self::ShapiroWilk => shapiro_wilk(sample, &m),
            Self::JarqueBera => jarque_bera(&m),
            Self::DagostinoPearson => dagostino_pearson(&m),
            Self::AndersonDarling => anderson_darling(sample, &m),
        }
    }
}

/// Population central moments of a sample
struct Moments {
    n: f64,
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl Moments {
    /// `None` for a sample without spread
    fn of(sample: &[f64]) -> Option<Self> {
        let n = count_as::<f64>(sample.len());
        let mean = sample.iter().sum::<f64>() / n;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &x in sample {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        let m = Self {
            n,
            mean,
            m2: m2 / n,
            m3: m3 / n,
            m4: m4 / n,
        };
        (m.m2 > 0.0).then_some(m)
    }

    fn skew(&self) -> f64 {
        self.m3 / self.m2.powf(1.5)
    }

    /// Kurtosis, 3 for a normal distribution
    fn kurtosis(&self) -> f64 {
        self.m4 / (self.m2 * self.m2)
    }
}

/// Survival function of the chi-squared distribution with two degrees of freedom
fn chi2_2_sf(x: f64) -> f64 {
    (-x / 2.0).exp()
}

fn jarque_bera(m: &Moments) -> f64 {
    let s = m.skew();
    let k = m.kurtosis() - 3.0;
    chi2_2_sf(m.n / 6.0 * (s * s + k * k / 4.0))
}

/// Z-score of the skewness test
fn skew_z(m: &Moments) -> f64 {
    let n = m.n;
    let y = m.skew() * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    delta * (y / alpha).asinh()
}

/// Z-score of the kurtosis test
fn kurtosis_z(m: &Moments) -> f64 {
    let n = m.n;
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0)
        / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (m.kurtosis() - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

fn dagostino_pearson(m: &Moments) -> f64 {
    let zs = skew_z(m);
    let zk = kurtosis_z(m);
    chi2_2_sf(zs * zs + zk * zk)
}

/// Standard normal CDF
fn normal_cdf(z: f64) -> f64 {
    0.5 * libm::erfc(-z / SQRT_2)
}

/// Standard normal survival function, `1 - Φ(z)` without cancellation
fn normal_sf(z: f64) -> f64 {
    0.5 * libm::erfc(z / SQRT_2)
}

/// Natural log of the standard normal CDF and of its complement
fn ln_normal_cdf(z: f64) -> (f64, f64) {
    (normal_cdf(z).ln(), normal_sf(z).ln())
}

/// Horner evaluation, coefficients from the highest power down
fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, &c| acc * x + c)
}

const ACKLAM_A: [f64; 6] = [
    -3.969683028665376e+01,
    2.209460984245205e+02,
    -2.759285104469687e+02,
    1.383577518672690e+02,
    -3.066479806614716e+01,
    2.506628277459239e+00,
];
const ACKLAM_B: [f64; 5] = [
    -5.447609879822406e+01,
    1.615858368580409e+02,
    -1.556989798598866e+02,
    6.680131188771972e+01,
    -1.328068155288572e+01,
];
const ACKLAM_C: [f64; 6] = [
    -7.784894002430293e-03,
    -3.223964580411365e-01,
    -2.400758277161838e+00,
    -2.549732539343734e+00,
    4.374664141464968e+00,
    2.938163982698783e+00,
];
const ACKLAM_D: [f64; 4] = [
    7.784695709041462e-03,
    3.224671290700398e-01,
    2.445134137142996e+00,
    3.754408661907416e+00,
];

/// Quantile function of the standard normal distribution, `0 < p < 1`
///
/// Acklam's rational approximation refined by one Halley step.
fn normal_quantile(p: f64) -> f64 {
    const P_LOW: f64 = 0.02425;
    let x = if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        polynomial(&ACKLAM_C, q) / (polynomial(&ACKLAM_D, q) * q + 1.0)
    } else if p > 1.0 - P_LOW {
        let q = (-2.0 * (-p).ln_1p()).sqrt();
        -polynomial(&ACKLAM_C, q) / (polynomial(&ACKLAM_D, q) * q + 1.0)
    } else {
        let q = p - 0.5;
        let r = q * q;
        polynomial(&ACKLAM_A, r) * q / (polynomial(&ACKLAM_B, r) * r + 1.0)
    };
    let u = (normal_cdf(x) - p) * (2.0 * PI).sqrt() * (x * x / 2.0).exp();
    x - u / (1.0 + x * u / 2.0)
}

/// Polynomial corrections in `1/sqrt(n)` of the largest coefficient
const SW_LAST: [f64; 6] = [-2.706056, 4.434685, -2.071190, -0.147981, 0.221157, 0.0];
/// Polynomial corrections in `1/sqrt(n)` of the second largest coefficient
const SW_SECOND_LAST: [f64; 6] = [-3.582633, 5.682633, -1.752461, -0.293762, 0.042981, 0.0];

/// Shapiro-Wilk coefficients `a_i` for a sample of size `n >= 3`
fn shapiro_wilk_coefficients(n: usize) -> Vec<f64> {
    if n == 3 {
        return vec![-FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2];
    }
    let nf = count_as::<f64>(n);
    let m: Vec<f64> = (1..=n)
        .map(|i| normal_quantile((count_as::<f64>(i) - 0.375) / (nf + 0.25)))
        .collect();
    let mm: f64 = m.iter().map(|v| v * v).sum();
    let u = 1.0 / nf.sqrt();

    let mut a = vec![0.0; n];
    let an = m[n - 1] / mm.sqrt() + polynomial(&SW_LAST, u);
    a[0] = -an;
    a[n - 1] = an;

    let (tail, phi) = if n > 5 {
        let an1 = m[n - 2] / mm.sqrt() + polynomial(&SW_SECOND_LAST, u);
        a[1] = -an1;
        a[n - 2] = an1;
        let phi = (mm - 2.0 * m[n - 1] * m[n - 1] - 2.0 * m[n - 2] * m[n - 2])
            / (1.0 - 2.0 * an * an - 2.0 * an1 * an1);
        (2, phi)
    } else {
        (1, (mm - 2.0 * m[n - 1] * m[n - 1]) / (1.0 - 2.0 * an * an))
    };

    let scale = phi.sqrt();
    a[tail..n - tail]
        .iter_mut()
        .zip(&m[tail..n - tail])
        .for_each(|(a, m)| *a = m / scale);
    a
}

fn shapiro_wilk(sample: &[f64], m: &Moments) -> f64 {
    let sorted = sorted_finite(sample);
    let n = sorted.len();
    let a = shapiro_wilk_coefficients(n);
    let b: f64 = a.iter().zip(&sorted).map(|(a, x)| a * x).sum();
    let w = (b * b / (m.m2 * m.n)).min(1.0);

    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        return p.clamp(0.0, 1.0);
    }

    let nf = m.n;
    let z = if n <= 11 {
        let gamma = 0.459 * nf - 2.273;
        let mu = polynomial(&[-0.0006714, 0.025054, -0.39978, 0.5440], nf);
        let sigma = polynomial(&[-0.0020322, 0.062767, -0.77857, 1.3822], nf).exp();
        let arg = gamma - (-w).ln_1p();
        if arg <= 0.0 {
            return 0.0;
        }
        (-arg.ln() - mu) / sigma
    } else {
        let ln_n = nf.ln();
        let mu = polynomial(&[0.0038915, -0.083751, -0.31082, -1.5861], ln_n);
        let sigma = polynomial(&[0.0030302, -0.082676, -0.4803], ln_n).exp();
        ((-w).ln_1p() - mu) / sigma
    };
    normal_sf(z)
}

fn anderson_darling(sample: &[f64], m: &Moments) -> f64 {
    let sorted = sorted_finite(sample);
    let n = m.n;
    let std = (m.m2 * n / (n - 1.0)).sqrt();

    let ln_cdf: Vec<(f64, f64)> = sorted
        .iter()
        .map(|x| ln_normal_cdf((x - m.mean) / std))
        .collect();
    let s: f64 = ln_cdf
        .iter()
        .zip(ln_cdf.iter().rev())
        .enumerate()
        .map(|(i, ((lower, _), (_, upper)))| (2.0 * count_as::<f64>(i) + 1.0) * (lower + upper))
        .sum();
    let a2 = -n - s / n;
    let a = a2 * (1.0 + 0.75 / n + 2.25 / (n * n));

    let p = if a >= 0.6 {
        (1.2937 - 5.709 * a + 0.0186 * a * a).exp()
    } else if a >= 0.34 {
        (0.9177 - 4.279 * a - 1.38 * a * a).exp()
    } else if a >= 0.2 {
        1.0 - (-8.318 + 42.796 * a - 59.938 * a * a).exp()
    } else {
        1.0 - (-13.436 + 101.14 * a - 223.73 * a * a).exp()
    };
    p.clamp(0.0, 1.0)
}

/// Computes a normality p-value for every lane along an axis
///
/// # Arguments
///
/// * `series` - The series
/// * `axis` - The sample axis, negative values count from the end
/// * `method` - `"shapiro"`, `"jarque_bera"`, `"dagostino_pearson"` or
///   `"anderson_darling"`
///
/// # Returns
///
/// * `Result<Array<f64, D::Smaller>>` - One p-value per lane, the axis removed
pub fn normality_p_values<T, S, D>(
    series: &ArrayBase<S, D>,
    axis: isize,
    method: &str,
) -> Result<Array<f64, D::Smaller>>
where
    T: Float,
    S: Data<Elem = T>,
    D: RemoveAxis,
{
    let method: NormalityMethod = method.parse()?;
    let axis = resolve_axis(axis, series.ndim())?;
    lane_len(series, axis)?;
    debug!(shape = ?series.shape(), axis = axis.index(), ?method, "normality test");

    Ok(series.map_axis(axis, |lane| {
        let sample: Vec<f64> = lane
            .iter()
            .map(|v| v.to_f64().unwrap_or(f64::NAN))
            .collect();
        method.p_value(&sample)
    }))
}

/// Tests every lane along an axis for a Gaussian distribution
///
/// A lane is reported Gaussian when its p-value exceeds `alpha`. Lanes without
/// a defined p-value are reported as not Gaussian.
///
/// # Examples
///
/// ```
/// # use ndarray::Array2;
/// # use piv_statistics::{Error, is_gaussian};
/// let x = Array2::<f64>::zeros((10, 3));
/// assert_eq!(
///     is_gaussian(&x, 0, "kolmogorov_smirnov", 0.05),
///     Err(Error::UnknownNormalityMethod("kolmogorov_smirnov".into()))
/// );
/// ```
pub fn is_gaussian<T, S, D>(
    series: &ArrayBase<S, D>,
    axis: isize,
    method: &str,
    alpha: f64,
) -> Result<Array<bool, D::Smaller>>
where
    T: Float,
    S: Data<Elem = T>,
    D: RemoveAxis,
{
    Ok(normality_p_values(series, axis, method)?.mapv(|p| p > alpha))
}
