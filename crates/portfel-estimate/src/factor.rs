//! Single-factor (market beta) decomposition and covariance reconstruction.
//!
//! Each asset's daily return is regressed on the benchmark's:
//!
//! ```text
//! r_i = alpha_i + beta_i * r_m + e_i
//! ```
//!
//! and the covariance matrix is rebuilt from the betas, the benchmark
//! variance, each asset's raw covariance with the benchmark and the residual
//! dispersion instead of being estimated entry by entry. With few
//! observations this is far better conditioned than the sample covariance.

use ndarray::{Array2, ArrayView1, ArrayView2};
use portfel_traits::stats::{moments, moments_view, pairwise_covariance};
use serde::{Deserialize, Serialize};

/// How the factor model is turned into a covariance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceConstruction {
    /// `var(m)·ββᵀ + diag(β²·cov(asset, m)) + diag(residual variance)`
    #[default]
    BetaAdjusted,
    /// `ββᵀ + diag(β²·cov(asset, m)) + diag(residual volatility)`
    ///
    /// The off-diagonal terms are not scaled by the benchmark variance and the
    /// diagonal adds the residual volatility rather than its square.
    Legacy,
}

/// Regression statistics of one asset against the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorExposure {
    /// `cov(asset, m) / var(m)`
    pub beta: f64,
    /// `mean(asset) - beta * mean(m)`
    pub alpha: f64,
    /// Sample standard deviation of `asset - alpha - beta * m`
    pub residual_volatility: f64,
    /// Raw sample covariance with the benchmark
    pub benchmark_covariance: f64,
}

impl FactorExposure {
    /// Whether every statistic is a finite number.
    pub const fn is_finite(&self) -> bool {
        self.beta.is_finite()
            && self.alpha.is_finite()
            && self.residual_volatility.is_finite()
            && self.benchmark_covariance.is_finite()
    }
}

/// Mean and variance of the benchmark's daily returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMoments {
    /// Mean daily return
    pub mean: f64,
    /// Sample variance of daily returns
    pub variance: f64,
}

impl BenchmarkMoments {
    /// Moments of a benchmark return series, skipping missing days.
    pub fn from_returns(benchmark: ArrayView1<'_, f64>) -> Self {
        let m = moments_view(benchmark);
        Self {
            mean: m.mean,
            variance: m.variance,
        }
    }
}

/// Regresses one asset's returns on the benchmark.
///
/// Statistics are `NaN` when fewer than two days have both returns.
pub fn fit_exposure(
    asset: ArrayView1<'_, f64>,
    benchmark: ArrayView1<'_, f64>,
    benchmark_moments: &BenchmarkMoments,
) -> FactorExposure {
    let benchmark_covariance = pairwise_covariance(asset, benchmark);
    let beta = benchmark_covariance / benchmark_moments.variance;
    let alpha = moments_view(asset).mean - beta * benchmark_moments.mean;

    let residuals: Vec<f64> = asset
        .iter()
        .zip(benchmark.iter())
        .map(|(&r, &m)| r - alpha - beta * m)
        .collect();
    let residual_volatility = moments(&residuals).std();

    FactorExposure {
        beta,
        alpha,
        residual_volatility,
        benchmark_covariance,
    }
}

/// Regresses every column of `returns` on column `benchmark_idx`.
pub fn fit_exposures(
    returns: ArrayView2<'_, f64>,
    benchmark_idx: usize,
) -> (BenchmarkMoments, Vec<FactorExposure>) {
    let benchmark = returns.column(benchmark_idx);
    let benchmark_moments = BenchmarkMoments::from_returns(benchmark);

    let exposures = returns
        .columns()
        .into_iter()
        .map(|asset| fit_exposure(asset, benchmark, &benchmark_moments))
        .collect();

    (benchmark_moments, exposures)
}

/// Builds the factor-model covariance matrix for the given exposures.
///
/// The result is symmetric by construction.
pub fn factor_covariance(
    exposures: &[FactorExposure],
    benchmark_variance: f64,
    construction: CovarianceConstruction,
) -> Array2<f64> {
    let n = exposures.len();
    let scale = match construction {
        CovarianceConstruction::BetaAdjusted => benchmark_variance,
        CovarianceConstruction::Legacy => 1.0,
    };

    let mut cov = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let value = scale * exposures[i].beta * exposures[j].beta;
            cov[[i, j]] = value;
            cov[[j, i]] = value;
        }
    }

    for (i, e) in exposures.iter().enumerate() {
        let residual = match construction {
            CovarianceConstruction::BetaAdjusted => e.residual_volatility.powi(2),
            CovarianceConstruction::Legacy => e.residual_volatility,
        };
        cov[[i, i]] += e.beta.powi(2).mul_add(e.benchmark_covariance, residual);
    }

    cov
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    fn benchmark_returns() -> Array1<f64> {
        array![0.01, -0.02, 0.015, 0.005, -0.01, 0.02, -0.005, 0.0, 0.012]
    }

    #[test]
    fn test_exact_multiple_recovers_beta() {
        let m = benchmark_returns();
        let asset = &m * 1.5;
        let moments = BenchmarkMoments::from_returns(m.view());

        let e = fit_exposure(asset.view(), m.view(), &moments);
        assert_relative_eq!(e.beta, 1.5, epsilon = 1e-12);
        assert_relative_eq!(e.alpha, 0.0, epsilon = 1e-15);
        assert!(e.residual_volatility < 1e-12);
    }

    #[test]
    fn test_alpha_from_constant_offset() {
        let m = benchmark_returns();
        let asset = &m * 0.5 + 0.001;
        let moments = BenchmarkMoments::from_returns(m.view());

        let e = fit_exposure(asset.view(), m.view(), &moments);
        assert_relative_eq!(e.beta, 0.5, epsilon = 1e-12);
        assert_relative_eq!(e.alpha, 0.001, epsilon = 1e-12);
        assert!(e.residual_volatility < 1e-12);
    }

    #[test]
    fn test_benchmark_against_itself() {
        let m = benchmark_returns();
        let moments = BenchmarkMoments::from_returns(m.view());

        let e = fit_exposure(m.view(), m.view(), &moments);
        assert_relative_eq!(e.beta, 1.0, epsilon = 1e-12);
        assert_relative_eq!(e.benchmark_covariance, moments.variance, epsilon = 1e-15);
    }

    #[test]
    fn test_missing_days_are_skipped() {
        let m = benchmark_returns();
        let mut asset = &m * 2.0;
        asset[3] = f64::NAN;
        let moments = BenchmarkMoments::from_returns(m.view());

        let e = fit_exposure(asset.view(), m.view(), &moments);
        assert!(e.is_finite());
        assert!(e.beta > 1.5);
    }

    #[test]
    fn test_too_few_pairs_is_not_finite() {
        let m = benchmark_returns();
        let mut asset = Array1::from_elem(m.len(), f64::NAN);
        asset[0] = 0.01;
        let moments = BenchmarkMoments::from_returns(m.view());

        let e = fit_exposure(asset.view(), m.view(), &moments);
        assert!(!e.is_finite());
    }

    #[test]
    fn test_fit_exposures_all_columns() {
        let m = benchmark_returns();
        let mut returns = Array2::zeros((m.len(), 3));
        returns.column_mut(0).assign(&m);
        returns.column_mut(1).assign(&(&m * 0.8));
        returns.column_mut(2).assign(&(&m * 1.2));

        let (moments, exposures) = fit_exposures(returns.view(), 0);
        assert_eq!(exposures.len(), 3);
        assert_relative_eq!(exposures[1].beta, 0.8, epsilon = 1e-12);
        assert_relative_eq!(exposures[2].beta, 1.2, epsilon = 1e-12);
        assert!(moments.variance > 0.0);
    }

    fn exposure(beta: f64, residual_volatility: f64, benchmark_covariance: f64) -> FactorExposure {
        FactorExposure {
            beta,
            alpha: 0.0,
            residual_volatility,
            benchmark_covariance,
        }
    }

    #[test]
    fn test_beta_adjusted_covariance() {
        let exposures = [exposure(1.0, 0.1, 0.04), exposure(0.5, 0.2, 0.02)];
        let cov = factor_covariance(&exposures, 0.04, CovarianceConstruction::BetaAdjusted);

        assert_relative_eq!(cov[[0, 0]], 0.04 + 0.04 + 0.01, epsilon = 1e-15);
        assert_relative_eq!(cov[[1, 1]], 0.25 * 0.04 + 0.25 * 0.02 + 0.04, epsilon = 1e-15);
        assert_relative_eq!(cov[[0, 1]], 0.5 * 0.04, epsilon = 1e-15);
        assert_eq!(cov[[0, 1]], cov[[1, 0]]);
    }

    #[test]
    fn test_default_adds_benchmark_covariance_to_diagonal() {
        // Unit beta, no residual: var(m) from the factor plus β²·cov(asset, m)
        let exposures = [exposure(1.0, 0.0, 0.04)];
        let cov = factor_covariance(&exposures, 0.04, CovarianceConstruction::default());
        assert_relative_eq!(cov[[0, 0]], 0.08, epsilon = 1e-15);
    }

    #[test]
    fn test_legacy_covariance() {
        let exposures = [exposure(2.0, 0.1, 0.03), exposure(0.5, 0.2, 0.01)];
        let cov = factor_covariance(&exposures, 0.04, CovarianceConstruction::Legacy);

        assert_relative_eq!(cov[[0, 0]], 4.0 + 4.0 * 0.03 + 0.1, epsilon = 1e-12);
        assert_relative_eq!(cov[[1, 1]], 0.25 + 0.25 * 0.01 + 0.2, epsilon = 1e-12);
        assert_relative_eq!(cov[[0, 1]], 1.0, epsilon = 1e-15);
        assert_eq!(cov[[0, 1]], cov[[1, 0]]);
    }

    #[test]
    fn test_default_construction() {
        assert_eq!(
            CovarianceConstruction::default(),
            CovarianceConstruction::BetaAdjusted
        );
    }
}
