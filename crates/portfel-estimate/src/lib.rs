//! Return and covariance estimation for the portfel optimizer.
//!
//! This crate turns a wide price table into solver inputs:
//! - Cleaning: drop sparse rows, forward-fill gaps inside the window
//! - Returns: daily percentage changes and annualized historical returns
//! - Factor model: per-asset beta against a market index, and the covariance
//!   matrix rebuilt from it
//!
//! # Example
//!
//! ```ignore
//! use portfel_estimate::{EstimatorConfig, ReturnCovarianceEstimator};
//! use portfel_traits::{AnalysisWindow, WeightBounds};
//!
//! let estimator = ReturnCovarianceEstimator::new(EstimatorConfig::default());
//! let estimate = estimator.estimate(&prices, &AnalysisWindow::new(date, 360)?)?;
//! let problem = estimate.to_problem(WeightBounds::default())?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod clean;
pub mod estimator;
pub mod factor;
pub mod returns;

pub use clean::{clean_window, drop_sparse_rows, forward_fill};
pub use estimator::{
    DEFAULT_BENCHMARK, Estimate, EstimatorConfig, ReturnCovarianceEstimator, TickerExposure,
};
pub use factor::{
    BenchmarkMoments, CovarianceConstruction, FactorExposure, factor_covariance, fit_exposure,
    fit_exposures,
};
pub use returns::{ExpectedReturnMethod, annualized_return, daily_returns, expected_returns};
