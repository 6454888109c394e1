//! The estimation-plus-solve pipeline.

use std::borrow::Cow;

use portfel_estimate::{Estimate, ReturnCovarianceEstimator};
use portfel_optimize::{ConicSolver, FrontierPoint, sample_frontier};
use portfel_traits::{
    Allocation, Date, PortfolioPerformance, PortfolioSolver, PriceTable, Result, Ticker,
    TickerWeight,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::OptimizeConfig;

/// Result of one optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationReport {
    /// Inputs the solver saw
    pub estimate: Estimate,
    /// Cleaned weights for every estimated ticker
    pub allocation: Allocation,
    /// Performance of the solved weights, before cleaning
    pub performance: PortfolioPerformance,
    /// Volatility the portfolio was solved for
    pub target_volatility: f64,
    /// Name of the solver that produced the weights
    pub solver: String,
}

/// Serializable digest of an [`OptimizationReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    /// Window start
    pub start: Date,
    /// Window end
    pub end: Date,
    /// Price rows used
    pub observations: usize,
    /// Requested volatility
    pub target_volatility: f64,
    /// Expected return, volatility and Sharpe ratio
    pub performance: PortfolioPerformance,
    /// Weights above the display threshold, largest first
    pub weights: Vec<TickerWeight>,
    /// Tickers left out for lack of data
    pub dropped: Vec<Ticker>,
    /// Solver name
    pub solver: String,
}

impl OptimizationReport {
    /// Summary keeping only weights above `display_threshold`.
    pub fn summary(&self, display_threshold: f64) -> ReportSummary {
        ReportSummary {
            start: self.estimate.window.start(),
            end: self.estimate.window.end(),
            observations: self.estimate.observations,
            target_volatility: self.target_volatility,
            performance: self.performance,
            weights: self
                .allocation
                .significant(display_threshold)
                .into_iter()
                .cloned()
                .collect(),
            dropped: self.estimate.dropped.clone(),
            solver: self.solver.clone(),
        }
    }
}

/// Optimizes portfolios over a fixed price table.
///
/// The table is loaded once and never modified; every call re-windows it
/// according to its [`OptimizeConfig`].
#[derive(Debug)]
pub struct PortfolioOptimizer<S> {
    prices: PriceTable,
    solver: S,
}

impl PortfolioOptimizer<ConicSolver> {
    /// Optimizer backed by the default Clarabel solver.
    pub fn with_default_solver(prices: PriceTable) -> Self {
        Self::new(prices, ConicSolver::default())
    }
}

impl<S: PortfolioSolver> PortfolioOptimizer<S> {
    /// Creates an optimizer over `prices` using `solver`.
    pub const fn new(prices: PriceTable, solver: S) -> Self {
        Self { prices, solver }
    }

    /// The full price table.
    pub const fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// The solver.
    pub const fn solver(&self) -> &S {
        &self.solver
    }

    /// Every ticker column in the price table, benchmark included.
    pub fn tickers(&self) -> &[Ticker] {
        self.prices.tickers()
    }

    fn prices_for(&self, config: &OptimizeConfig) -> Cow<'_, PriceTable> {
        match config.since {
            Some(since) => {
                let rows: Vec<usize> = self
                    .prices
                    .dates()
                    .iter()
                    .enumerate()
                    .filter(|(_, date)| **date >= since)
                    .map(|(i, _)| i)
                    .collect();
                debug!(%since, rows = rows.len(), "trimmed prices");
                Cow::Owned(self.prices.select_rows(&rows))
            }
            None => Cow::Borrowed(&self.prices),
        }
    }

    /// Expected returns and covariance for the configured window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is invalid or holds too little data.
    pub fn estimate(&self, config: &OptimizeConfig) -> Result<Estimate> {
        let window = config.window()?;
        let prices = self.prices_for(config);
        ReturnCovarianceEstimator::new(config.estimator.clone()).estimate(&prices, &window)
    }

    /// Highest-return portfolio within the configured target volatility.
    ///
    /// # Errors
    ///
    /// Returns an error if estimation fails or the target is infeasible.
    pub fn optimize(&self, config: &OptimizeConfig) -> Result<OptimizationReport> {
        let estimate = self.estimate(config)?;
        let problem = estimate.to_problem(config.weight_bounds)?;

        let raw = self
            .solver
            .efficient_risk(&problem, config.target_volatility)?;
        let performance = problem.performance(&raw.to_array(), config.risk_free_rate);
        let allocation = config.cleaning.apply(&raw);

        info!(
            solver = self.solver.name(),
            target = config.target_volatility,
            expected_return = performance.expected_return,
            volatility = performance.volatility,
            holdings = allocation.significant(config.display_threshold).len(),
            "optimized portfolio"
        );

        Ok(OptimizationReport {
            estimate,
            allocation,
            performance,
            target_volatility: config.target_volatility,
            solver: self.solver.name().to_string(),
        })
    }

    /// Efficient frontier for the configured window.
    ///
    /// # Errors
    ///
    /// Returns an error if estimation fails or the solver breaks down.
    pub fn frontier(&self, config: &OptimizeConfig, points: usize) -> Result<Vec<FrontierPoint>> {
        let estimate = self.estimate(config)?;
        let problem = estimate.to_problem(config.weight_bounds)?;
        sample_frontier(&self.solver, &problem, points, config.risk_free_rate)
    }
}
