//! Missing-aware sample statistics.
//!
//! Return series carry `NaN` wherever a quote was missing. Every function in
//! this module skips non-finite values, the way a spreadsheet or a dataframe
//! library skips blanks, and uses the `n - 1` denominator for dispersion.

use ndarray::ArrayView1;

/// Minimum variance treated as non-zero.
/// Series whose variance falls below this threshold are considered flat.
pub const MIN_VARIANCE_THRESHOLD: f64 = 1e-12;

/// Count, mean and sample variance of the finite values in a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMoments {
    /// Number of finite observations.
    pub count: usize,
    /// Mean of the finite observations (`NaN` when there are none).
    pub mean: f64,
    /// Sample variance with `n - 1` denominator (`NaN` when `count < 2`).
    pub variance: f64,
}

impl SampleMoments {
    /// Sample standard deviation.
    pub fn std(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Computes the moments of the finite values in `values`.
///
/// # Examples
///
/// ```
/// use portfel_traits::stats::moments;
///
/// let m = moments(&[1.0, 2.0, f64::NAN, 3.0]);
/// assert_eq!(m.count, 3);
/// assert!((m.mean - 2.0).abs() < 1e-12);
/// assert!((m.variance - 1.0).abs() < 1e-12);
/// ```
pub fn moments(values: &[f64]) -> SampleMoments {
    let finite: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();
    let count = finite.len();

    if count == 0 {
        return SampleMoments {
            count,
            mean: f64::NAN,
            variance: f64::NAN,
        };
    }

    let mean = finite.iter().sum::<f64>() / count as f64;
    let variance = if count > 1 {
        finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64
    } else {
        f64::NAN
    };

    SampleMoments {
        count,
        mean,
        variance,
    }
}

/// Same as [`moments`] for an ndarray view.
pub fn moments_view(values: ArrayView1<'_, f64>) -> SampleMoments {
    match values.as_slice() {
        Some(slice) => moments(slice),
        None => moments(&values.to_vec()),
    }
}

/// Sample covariance over the observations where both series are finite.
///
/// Returns `NaN` when fewer than two complete pairs exist.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use portfel_traits::stats::pairwise_covariance;
///
/// let x = array![1.0, 2.0, 3.0, f64::NAN];
/// let y = array![2.0, 4.0, 6.0, 8.0];
/// let cov = pairwise_covariance(x.view(), y.view());
/// assert!((cov - 2.0).abs() < 1e-12);
/// ```
pub fn pairwise_covariance(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n as f64;

    pairs
        .iter()
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum::<f64>()
        / (n - 1) as f64
}

/// Whether a variance is large enough to divide by.
pub fn is_informative_variance(variance: f64) -> bool {
    variance.is_finite() && variance > MIN_VARIANCE_THRESHOLD
}
