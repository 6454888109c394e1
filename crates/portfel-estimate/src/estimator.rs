//! Return/covariance estimator.
//!
//! Turns a full price table into the expected-return vector and factor-model
//! covariance matrix a portfolio solver consumes:
//!
//! 1. slice the table to the analysis window
//! 2. drop empty and sparse rows, forward-fill gaps
//! 3. daily returns
//! 4. regress every asset on the benchmark
//! 5. rebuild the covariance from the factor model, without the benchmark
//! 6. annualize historical returns over the window's observation count

use ndarray::{Array1, Array2};
use portfel_traits::stats::is_informative_variance;
use portfel_traits::{
    AnalysisWindow, OptimizationProblem, PortfelError, PriceTable, Result, Ticker, WeightBounds,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clean::clean_window;
use crate::factor::{
    BenchmarkMoments, CovarianceConstruction, FactorExposure, factor_covariance, fit_exposures,
};
use crate::returns::{ExpectedReturnMethod, annualized_return, daily_returns};

/// Default market index used as the single factor.
pub const DEFAULT_BENCHMARK: &str = "MOEX.ME";

/// Configuration for the return/covariance estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Ticker of the market index column (default: `MOEX.ME`)
    pub benchmark: Ticker,

    /// Covariance construction from the factor model
    pub construction: CovarianceConstruction,

    /// Expected return annualization
    pub expected_returns: ExpectedReturnMethod,

    /// Rows with fewer non-missing prices than this are dropped (default: 2)
    pub min_prices_per_row: usize,

    /// Minimum number of daily return rows after cleaning (default: 2)
    pub min_observations: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            benchmark: DEFAULT_BENCHMARK.to_string(),
            construction: CovarianceConstruction::default(),
            expected_returns: ExpectedReturnMethod::default(),
            min_prices_per_row: 2,
            min_observations: 2,
        }
    }
}

/// Regression statistics of one ticker in an [`Estimate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerExposure {
    /// Asset identifier
    pub ticker: Ticker,
    /// Beta, alpha and residual volatility against the benchmark
    pub exposure: FactorExposure,
}

/// Expected returns and covariance for the tickers that survived estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Window the estimate was computed over
    pub window: AnalysisWindow,
    /// Tickers, in the order of every vector and matrix axis
    pub tickers: Vec<Ticker>,
    /// Annualized expected returns
    pub expected_returns: Array1<f64>,
    /// Factor-model covariance of daily returns
    pub covariance: Array2<f64>,
    /// Per-ticker regression statistics
    pub exposures: Vec<TickerExposure>,
    /// Benchmark return moments
    pub benchmark: BenchmarkMoments,
    /// Price rows in the cleaned window (the annualization frequency)
    pub observations: usize,
    /// Tickers present in the table but dropped for lack of data
    pub dropped: Vec<Ticker>,
}

impl Estimate {
    /// Number of tickers in the estimate.
    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Packages the estimate as a solver input.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds cannot be met by the surviving tickers.
    pub fn to_problem(&self, bounds: WeightBounds) -> Result<OptimizationProblem> {
        OptimizationProblem::new(
            self.tickers.clone(),
            self.expected_returns.clone(),
            self.covariance.clone(),
            bounds,
        )
    }
}

/// Single-factor return/covariance estimator.
///
/// Stateless apart from its configuration: [`estimate`](Self::estimate) is a
/// pure function of the price table and the window, so repeated calls on the
/// same inputs give bit-identical results.
///
/// # Example
///
/// ```ignore
/// use portfel_estimate::{EstimatorConfig, ReturnCovarianceEstimator};
/// use portfel_traits::AnalysisWindow;
///
/// let estimator = ReturnCovarianceEstimator::new(EstimatorConfig::default());
/// let window = AnalysisWindow::new(date, 360)?;
/// let estimate = estimator.estimate(&prices, &window)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReturnCovarianceEstimator {
    config: EstimatorConfig,
}

impl ReturnCovarianceEstimator {
    /// Create a new estimator with the given configuration.
    #[must_use]
    pub const fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// The estimator's configuration.
    #[must_use]
    pub const fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimates expected returns and covariance over `window`.
    ///
    /// # Errors
    ///
    /// - [`PortfelError::MissingColumn`] if the benchmark is not in the table
    /// - [`PortfelError::InsufficientData`] if the window holds too few
    ///   observations or no ticker besides the benchmark has usable data
    /// - [`PortfelError::DegenerateData`] if the benchmark's variance is zero
    pub fn estimate(&self, prices: &PriceTable, window: &AnalysisWindow) -> Result<Estimate> {
        let benchmark_idx = prices
            .column_index(&self.config.benchmark)
            .ok_or_else(|| PortfelError::MissingColumn(self.config.benchmark.clone()))?;

        let sliced = prices.slice(window);
        if sliced.is_empty() {
            return Err(PortfelError::InsufficientData(format!(
                "no prices between {} and {} (data covers {:?} to {:?})",
                window.start(),
                window.end(),
                prices.first_date(),
                prices.last_date()
            )));
        }

        let cleaned = clean_window(&sliced, self.config.min_prices_per_row);
        let observations = cleaned.len();
        debug!(
            sliced = sliced.len(),
            cleaned = observations,
            "windowed price rows"
        );

        let returns = daily_returns(cleaned.prices().view());
        if returns.nrows() < self.config.min_observations {
            return Err(PortfelError::InsufficientData(format!(
                "{} return observations between {} and {}, need at least {}",
                returns.nrows(),
                window.start(),
                window.end(),
                self.config.min_observations
            )));
        }

        let (benchmark, exposures) = fit_exposures(returns.view(), benchmark_idx);
        if !is_informative_variance(benchmark.variance) {
            return Err(PortfelError::DegenerateData(format!(
                "benchmark {} has variance {} over the window",
                self.config.benchmark, benchmark.variance
            )));
        }

        let frequency = observations as f64;
        let mut tickers = Vec::new();
        let mut kept_exposures = Vec::new();
        let mut mu = Vec::new();
        let mut dropped = Vec::new();

        for (j, ticker) in prices.tickers().iter().enumerate() {
            if j == benchmark_idx {
                continue;
            }

            let expected =
                annualized_return(returns.column(j), frequency, self.config.expected_returns);
            let exposure = exposures[j];

            if exposure.is_finite() && expected.is_finite() {
                tickers.push(ticker.clone());
                kept_exposures.push(exposure);
                mu.push(expected);
            } else {
                dropped.push(ticker.clone());
            }
        }

        if !dropped.is_empty() {
            warn!(
                count = dropped.len(),
                tickers = %dropped.join(","),
                "dropped tickers without enough data in window"
            );
        }

        if tickers.is_empty() {
            return Err(PortfelError::InsufficientData(format!(
                "no ticker besides {} has enough data between {} and {}",
                self.config.benchmark,
                window.start(),
                window.end()
            )));
        }

        let covariance =
            factor_covariance(&kept_exposures, benchmark.variance, self.config.construction);

        info!(
            assets = tickers.len(),
            observations,
            start = %window.start(),
            end = %window.end(),
            "estimated returns and covariance"
        );

        let exposures = tickers
            .iter()
            .zip(kept_exposures)
            .map(|(ticker, exposure)| TickerExposure {
                ticker: ticker.clone(),
                exposure,
            })
            .collect();

        Ok(Estimate {
            window: *window,
            tickers,
            expected_returns: Array1::from(mu),
            covariance,
            exposures,
            benchmark,
            observations,
            dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use portfel_traits::Date;

    const NAN: f64 = f64::NAN;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn benchmark_returns() -> Vec<f64> {
        vec![0.01, -0.02, 0.015, 0.005, -0.01, 0.02, -0.005, 0.008, 0.012]
    }

    /// Ten trading days; each asset's daily return is an exact multiple of the benchmark's.
    fn synthetic_table(multiples: &[f64]) -> PriceTable {
        let m = benchmark_returns();
        let n_days = m.len() + 1;
        let mut prices = Array2::zeros((n_days, multiples.len() + 1));

        prices[[0, 0]] = 100.0;
        for (j, _) in multiples.iter().enumerate() {
            prices[[0, j + 1]] = 50.0 + 10.0 * j as f64;
        }
        for t in 1..n_days {
            prices[[t, 0]] = prices[[t - 1, 0]] * (1.0 + m[t - 1]);
            for (j, k) in multiples.iter().enumerate() {
                prices[[t, j + 1]] = prices[[t - 1, j + 1]] * (1.0 + k * m[t - 1]);
            }
        }

        let dates = (0..n_days).map(|i| d(2024, 1, 10 + i as u32)).collect();
        let mut tickers = vec![DEFAULT_BENCHMARK.to_string()];
        tickers.extend((0..multiples.len()).map(|j| format!("A{j}")));
        PriceTable::new(dates, tickers, prices).unwrap()
    }

    fn window() -> AnalysisWindow {
        AnalysisWindow::new(d(2024, 1, 31), 30).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = EstimatorConfig::default();
        assert_eq!(config.benchmark, "MOEX.ME");
        assert_eq!(config.min_prices_per_row, 2);
        assert_eq!(config.min_observations, 2);
        assert_eq!(config.construction, CovarianceConstruction::BetaAdjusted);
        assert_eq!(config.expected_returns, ExpectedReturnMethod::Compounded);
    }

    #[test]
    fn test_synthetic_betas_and_zero_residuals() {
        let table = synthetic_table(&[0.5, 1.0, 1.5]);
        let estimate = ReturnCovarianceEstimator::default()
            .estimate(&table, &window())
            .unwrap();

        assert_eq!(estimate.tickers, vec!["A0", "A1", "A2"]);
        assert_eq!(estimate.observations, 10);
        for (te, k) in estimate.exposures.iter().zip([0.5, 1.0, 1.5]) {
            assert_relative_eq!(te.exposure.beta, k, epsilon = 1e-9);
            assert!(te.exposure.residual_volatility < 1e-9);
        }
    }

    #[test]
    fn test_covariance_square_and_symmetric() {
        let table = synthetic_table(&[0.5, 1.0, 1.5]).map_prices(|mut prices| {
            prices[[4, 2]] *= 1.01;
            prices[[7, 3]] *= 0.98;
        });

        let estimate = ReturnCovarianceEstimator::default()
            .estimate(&table, &window())
            .unwrap();

        let cov = &estimate.covariance;
        assert_eq!(cov.nrows(), cov.ncols());
        assert_eq!(cov.nrows(), estimate.tickers.len());
        assert_eq!(estimate.expected_returns.len(), estimate.tickers.len());
        for i in 0..cov.nrows() {
            assert!(cov[[i, i]] > 0.0);
            for j in 0..cov.ncols() {
                assert_relative_eq!(cov[[i, j]], cov[[j, i]], epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_default_covariance_without_noise() {
        let table = synthetic_table(&[0.5, 2.0]);
        let estimate = ReturnCovarianceEstimator::default()
            .estimate(&table, &window())
            .unwrap();

        // cov(asset, m) = β·var(m), so the diagonal is (β² + β³)·var(m)
        let var_m = estimate.benchmark.variance;
        assert_relative_eq!(estimate.covariance[[0, 1]], 1.0 * var_m, epsilon = 1e-12);
        assert_relative_eq!(estimate.covariance[[0, 0]], 0.375 * var_m, epsilon = 1e-12);
        assert_relative_eq!(estimate.covariance[[1, 1]], 12.0 * var_m, epsilon = 1e-12);
    }

    #[test]
    fn test_benchmark_excluded() {
        let table = synthetic_table(&[0.5, 1.0]);
        let estimate = ReturnCovarianceEstimator::default()
            .estimate(&table, &window())
            .unwrap();

        assert!(!estimate.tickers.iter().any(|t| t == DEFAULT_BENCHMARK));
        assert!(!estimate.exposures.iter().any(|e| e.ticker == DEFAULT_BENCHMARK));
        assert_eq!(estimate.covariance.dim(), (2, 2));
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let table = synthetic_table(&[0.7, 1.3, 0.9]);
        let estimator = ReturnCovarianceEstimator::default();

        let first = estimator.estimate(&table, &window()).unwrap();
        let second = estimator.estimate(&table, &window()).unwrap();

        let bits = |a: &Array1<f64>| a.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first.expected_returns), bits(&second.expected_returns));
        let cov_bits = |a: &Array2<f64>| a.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(cov_bits(&first.covariance), cov_bits(&second.covariance));
    }

    #[test]
    fn test_expected_returns_compounded_over_window() {
        let table = synthetic_table(&[1.0]);
        let estimate = ReturnCovarianceEstimator::default()
            .estimate(&table, &window())
            .unwrap();

        // Ten price rows, nine returns: growth^(10/9) - 1
        let prices = table.column("A0").unwrap();
        let growth = prices[9] / prices[0];
        assert_relative_eq!(
            estimate.expected_returns[0],
            growth.powf(10.0 / 9.0) - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_ticker_without_data_is_dropped() {
        let table = synthetic_table(&[1.0, 1.2]).map_prices(|mut prices| {
            prices.column_mut(2).fill(NAN);
            prices[[9, 2]] = 42.0;
        });

        let estimate = ReturnCovarianceEstimator::default()
            .estimate(&table, &window())
            .unwrap();
        assert_eq!(estimate.tickers, vec!["A0"]);
        assert_eq!(estimate.dropped, vec!["A1"]);
    }

    #[test]
    fn test_missing_benchmark() {
        let table = synthetic_table(&[1.0]);
        let config = EstimatorConfig {
            benchmark: "IMOEX".to_string(),
            ..EstimatorConfig::default()
        };
        let result = ReturnCovarianceEstimator::new(config).estimate(&table, &window());
        assert!(matches!(result, Err(PortfelError::MissingColumn(_))));
    }

    #[test]
    fn test_window_before_data() {
        let table = synthetic_table(&[1.0]);
        let early = AnalysisWindow::new(d(2023, 6, 1), 90).unwrap();
        let result = ReturnCovarianceEstimator::default().estimate(&table, &early);
        assert!(matches!(result, Err(PortfelError::InsufficientData(_))));
    }

    #[test]
    fn test_too_few_observations() {
        let table = synthetic_table(&[1.0]);
        // 2024-01-10 and 2024-01-11 only: one return row
        let short = AnalysisWindow::new(d(2024, 1, 11), 1).unwrap();
        let result = ReturnCovarianceEstimator::default().estimate(&table, &short);
        assert!(matches!(result, Err(PortfelError::InsufficientData(_))));
    }

    #[test]
    fn test_flat_benchmark_is_degenerate() {
        let table =
            synthetic_table(&[1.0]).map_prices(|mut prices| prices.column_mut(0).fill(100.0));

        let result = ReturnCovarianceEstimator::default().estimate(&table, &window());
        assert!(matches!(result, Err(PortfelError::DegenerateData(_))));
    }

    #[test]
    fn test_sparse_rows_dropped_before_returns() {
        // Only the benchmark quoted on day 5: row falls below two prices
        let table = synthetic_table(&[1.0, 0.5]).map_prices(|mut prices| {
            prices[[5, 1]] = NAN;
            prices[[5, 2]] = NAN;
        });

        let estimate = ReturnCovarianceEstimator::default()
            .estimate(&table, &window())
            .unwrap();
        assert_eq!(estimate.observations, 9);
    }

    #[test]
    fn test_legacy_construction() {
        let table = synthetic_table(&[0.5, 1.5]);
        let config = EstimatorConfig {
            construction: CovarianceConstruction::Legacy,
            ..EstimatorConfig::default()
        };
        let estimate = ReturnCovarianceEstimator::new(config)
            .estimate(&table, &window())
            .unwrap();

        assert_relative_eq!(estimate.covariance[[0, 1]], 0.75, epsilon = 1e-9);
    }

    #[test]
    fn test_to_problem() {
        let table = synthetic_table(&[0.5, 1.5]);
        let estimate = ReturnCovarianceEstimator::default()
            .estimate(&table, &window())
            .unwrap();

        let problem = estimate.to_problem(WeightBounds::default()).unwrap();
        assert_eq!(problem.n_assets(), 2);
        assert_eq!(problem.tickers(), estimate.tickers.as_slice());
    }
}
