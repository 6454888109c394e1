//! Efficient frontier sampling.

use portfel_traits::{
    OptimizationProblem, PortfelError, PortfolioPerformance, PortfolioSolver, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of frontier points sampled when not specified.
pub const DEFAULT_FRONTIER_POINTS: usize = 100;

/// Gap kept below the highest attainable return for the last frontier point.
const TOP_MARGIN: f64 = 1e-4;

/// One solved point of the efficient frontier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// Return the point was solved for
    pub target_return: f64,
    /// Performance of the solved portfolio
    pub performance: PortfolioPerformance,
}

/// Traces the efficient frontier with `efficient_return`.
///
/// Targets are evenly spaced from the minimum-volatility portfolio's return
/// to just below the highest attainable return. Targets the solver rejects
/// as infeasible are skipped.
///
/// # Errors
///
/// Returns an error if the minimum-volatility portfolio cannot be solved or
/// the solver fails for a reason other than an infeasible target.
pub fn sample_frontier<S>(
    solver: &S,
    problem: &OptimizationProblem,
    points: usize,
    risk_free_rate: f64,
) -> Result<Vec<FrontierPoint>>
where
    S: PortfolioSolver + ?Sized,
{
    if points == 0 {
        return Ok(Vec::new());
    }

    let min_vol = solver.min_volatility(problem)?.to_array();
    let start = problem.portfolio_return(&min_vol);
    let top = problem.portfolio_return(&problem.max_return_weights()) - TOP_MARGIN;
    let end = top.max(start);

    let targets: Vec<f64> = if points == 1 {
        vec![start]
    } else {
        let step = (end - start) / (points - 1) as f64;
        (0..points).map(|i| (i as f64).mul_add(step, start)).collect()
    };

    let mut frontier = Vec::with_capacity(points);
    for target_return in targets {
        match solver.efficient_return(problem, target_return) {
            Ok(allocation) => frontier.push(FrontierPoint {
                target_return,
                performance: problem.performance(&allocation.to_array(), risk_free_rate),
            }),
            Err(PortfelError::InfeasibleTarget(reason)) => {
                warn!(target_return, %reason, "skipping frontier point");
            }
            Err(e) => return Err(e),
        }
    }

    debug!(points = frontier.len(), solver = solver.name(), "sampled efficient frontier");
    Ok(frontier)
}
