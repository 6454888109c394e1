//! Portfolio solver trait.
//!
//! This module defines the `PortfolioSolver` trait, the single seam between
//! return/covariance estimation and portfolio construction. Estimation code
//! only ever talks to this trait, so any convex solver can be substituted
//! without touching the estimation pipeline.

use crate::{Allocation, OptimizationProblem, Result};

/// Solves for efficient-frontier weights given returns, covariance and a target.
///
/// All methods return weights aligned with [`OptimizationProblem::tickers`],
/// within the problem's weight bounds and summing to one.
///
/// # Example
///
/// ```no_run
/// use ndarray::Array1;
/// use portfel_traits::{Allocation, OptimizationProblem, PortfolioSolver, Result};
///
/// /// Ignores risk entirely and spreads capital evenly.
/// struct EqualWeight;
///
/// impl PortfolioSolver for EqualWeight {
///     fn name(&self) -> &str {
///         "equal_weight"
///     }
///
///     fn min_volatility(&self, problem: &OptimizationProblem) -> Result<Allocation> {
///         let n = problem.n_assets();
///         Ok(problem.allocation(&Array1::from_elem(n, 1.0 / n as f64)))
///     }
///
///     fn efficient_risk(
///         &self,
///         problem: &OptimizationProblem,
///         _target: f64,
///     ) -> Result<Allocation> {
///         self.min_volatility(problem)
///     }
///
///     fn efficient_return(
///         &self,
///         problem: &OptimizationProblem,
///         _target: f64,
///     ) -> Result<Allocation> {
///         self.min_volatility(problem)
///     }
/// }
/// ```
pub trait PortfolioSolver: Send + Sync {
    /// Name of this solver.
    ///
    /// Used for logging and reports.
    fn name(&self) -> &str;

    /// Global minimum-volatility portfolio.
    ///
    /// # Errors
    ///
    /// Returns an error if the solver fails to converge.
    fn min_volatility(&self, problem: &OptimizationProblem) -> Result<Allocation>;

    /// Maximum expected return with volatility at most `target_volatility`.
    ///
    /// When the target exceeds the volatility of the highest-return portfolio,
    /// that portfolio is returned.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PortfelError::InfeasibleTarget`] if the target is below
    /// the minimum achievable volatility.
    fn efficient_risk(
        &self,
        problem: &OptimizationProblem,
        target_volatility: f64,
    ) -> Result<Allocation>;

    /// Minimum volatility with expected return at least `target_return`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PortfelError::InfeasibleTarget`] if no portfolio within
    /// the bounds reaches the target.
    fn efficient_return(&self, problem: &OptimizationProblem, target_return: f64)
    -> Result<Allocation>;
}

impl<S: PortfolioSolver + ?Sized> PortfolioSolver for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn min_volatility(&self, problem: &OptimizationProblem) -> Result<Allocation> {
        (**self).min_volatility(problem)
    }

    fn efficient_risk(
        &self,
        problem: &OptimizationProblem,
        target_volatility: f64,
    ) -> Result<Allocation> {
        (**self).efficient_risk(problem, target_volatility)
    }

    fn efficient_return(
        &self,
        problem: &OptimizationProblem,
        target_return: f64,
    ) -> Result<Allocation> {
        (**self).efficient_return(problem, target_return)
    }
}
