//! Interior-point mean-variance solver backed by Clarabel.
//!
//! Every query is posed as a conic program over the weights `w`:
//!
//! ```text
//! minimum volatility   minimize ½·wᵀΣw
//! efficient return     minimize ½·wᵀΣw   subject to μᵀw ≥ target
//! efficient risk       maximize μᵀw      subject to ‖Fw‖ ≤ target, FᵀF = Σ
//! ```
//!
//! each with `Σw = 1` and `lower ≤ w ≤ upper`.

use clarabel::algebra::CscMatrix;
use clarabel::solver::*;
use ndarray::{Array1, Array2, s};
use portfel_traits::{
    Allocation, OptimizationProblem, PortfelError, PortfolioSolver, Result, WeightBounds,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for [`ConicSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Interior-point iteration cap
    pub max_iterations: u32,

    /// Duality gap and feasibility tolerance handed to Clarabel
    pub tolerance: f64,

    /// Slack allowed when comparing a portfolio to a volatility or return target
    pub target_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-8,
            target_tolerance: 1e-9,
        }
    }
}

/// Long-only efficient-frontier solver.
///
/// Minimum volatility and efficient return are quadratic programs; efficient
/// risk maximizes return inside a second-order cone built from a Cholesky
/// factor of the covariance. Targets at either end of the frontier are
/// answered from the minimum-volatility and maximum-return portfolios
/// without a cone solve.
///
/// The solver is deterministic: the same problem always yields the same
/// weights.
#[derive(Debug, Clone, Default)]
pub struct ConicSolver {
    config: SolverConfig,
}

/// Rows of `Aw + s = b` with `s` constrained to the matching cones.
struct Constraints {
    rows: Vec<Array1<f64>>,
    rhs: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl Constraints {
    /// `Σw = 1` and `lower ≤ w ≤ upper`.
    fn budget(n: usize, bounds: WeightBounds) -> Self {
        let mut rows = vec![Array1::ones(n)];
        let mut rhs = vec![1.0];

        for i in 0..n {
            let mut row = Array1::zeros(n);
            row[i] = -1.0;
            rows.push(row);
            rhs.push(-bounds.lower);
        }
        for i in 0..n {
            let mut row = Array1::zeros(n);
            row[i] = 1.0;
            rows.push(row);
            rhs.push(bounds.upper);
        }

        Self {
            rows,
            rhs,
            cones: vec![
                SupportedConeT::ZeroConeT(1),
                SupportedConeT::NonnegativeConeT(2 * n),
            ],
        }
    }

    /// `μᵀw ≥ target`
    fn min_return(mut self, expected_returns: &Array1<f64>, target: f64) -> Self {
        self.rows.push(expected_returns.mapv(|m| -m));
        self.rhs.push(-target);
        self.cones.push(SupportedConeT::NonnegativeConeT(1));
        self
    }

    /// `‖Fw‖ ≤ target`
    fn max_volatility(mut self, factor: &Array2<f64>, target: f64) -> Self {
        self.rows.push(Array1::zeros(factor.ncols()));
        self.rhs.push(target);
        for row in factor.rows() {
            self.rows.push(row.mapv(|x| -x));
            self.rhs.push(0.0);
        }
        self.cones
            .push(SupportedConeT::SecondOrderConeT(factor.nrows() + 1));
        self
    }

    fn matrix(&self, n: usize) -> CscMatrix<f64> {
        let mut dense = Array2::zeros((self.rows.len(), n));
        for (mut out, row) in dense.rows_mut().into_iter().zip(&self.rows) {
            out.assign(row);
        }
        to_csc(&dense, false)
    }
}

/// Compressed-column copy of `dense`, optionally keeping only the upper triangle.
fn to_csc(dense: &Array2<f64>, upper_triangle: bool) -> CscMatrix<f64> {
    let (m, n) = dense.dim();
    let mut colptr = Vec::with_capacity(n + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    colptr.push(0);
    for j in 0..n {
        let last = if upper_triangle { (j + 1).min(m) } else { m };
        for i in 0..last {
            let value = dense[[i, j]];
            if value != 0.0 {
                rowval.push(i);
                nzval.push(value);
            }
        }
        colptr.push(rowval.len());
    }

    CscMatrix::new(m, n, colptr, rowval, nzval)
}

/// Lower-triangular `L` with `LLᵀ = Σ` for a positive semi-definite `Σ`.
///
/// Pivots that vanish leave their column at zero.
fn cholesky(sigma: &Array2<f64>) -> Array2<f64> {
    let n = sigma.nrows();
    let floor = 1e-14 * sigma.diag().iter().fold(0.0_f64, |a, &b| a.max(b.abs()));
    let mut l = Array2::<f64>::zeros((n, n));

    for j in 0..n {
        let head = l.slice(s![j, ..j]).to_owned();
        let pivot = sigma[[j, j]] - head.dot(&head);
        if pivot <= floor {
            continue;
        }
        let pivot = pivot.sqrt();
        l[[j, j]] = pivot;

        for i in (j + 1)..n {
            let dot = l.slice(s![i, ..j]).dot(&head);
            l[[i, j]] = (sigma[[i, j]] - dot) / pivot;
        }
    }

    l
}

fn check_target(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PortfelError::InvalidData(format!("{name} must be finite, got {value}")))
    }
}

impl ConicSolver {
    /// Create a new solver with the given configuration.
    #[must_use]
    pub const fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The solver's configuration.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn settings(&self) -> DefaultSettings<f64> {
        DefaultSettings {
            verbose: false,
            max_iter: self.config.max_iterations,
            tol_gap_abs: self.config.tolerance,
            tol_gap_rel: self.config.tolerance,
            tol_feas: self.config.tolerance,
            ..DefaultSettings::default()
        }
    }

    /// Minimizes `½wᵀPw + qᵀw` under `constraints`.
    ///
    /// Interior-point solutions can sit a rounding error outside the box, so
    /// weights are clipped to the bounds.
    fn solve(
        &self,
        problem: &OptimizationProblem,
        p: &CscMatrix<f64>,
        q: &[f64],
        constraints: &Constraints,
    ) -> Result<Array1<f64>> {
        let a = constraints.matrix(problem.n_assets());
        let mut solver = DefaultSolver::new(
            p,
            q,
            &a,
            &constraints.rhs,
            &constraints.cones,
            self.settings(),
        );
        solver.solve();

        match &solver.solution.status {
            SolverStatus::Solved => {}
            SolverStatus::AlmostSolved => {
                warn!("clarabel reached reduced accuracy");
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                return Err(PortfelError::InfeasibleTarget(
                    "no portfolio satisfies the constraints".to_string(),
                ));
            }
            other => {
                return Err(PortfelError::Solver(format!(
                    "clarabel stopped with status {other:?}"
                )));
            }
        }

        let WeightBounds { lower, upper } = problem.bounds();
        let weights: Array1<f64> = solver
            .solution
            .x
            .iter()
            .map(|w| w.clamp(lower, upper))
            .collect();
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(PortfelError::Solver(
                "clarabel returned non-finite weights".to_string(),
            ));
        }

        Ok(weights)
    }

    fn min_volatility_weights(&self, problem: &OptimizationProblem) -> Result<Array1<f64>> {
        let n = problem.n_assets();
        let p = to_csc(problem.covariance(), true);
        let constraints = Constraints::budget(n, problem.bounds());
        self.solve(problem, &p, &vec![0.0; n], &constraints)
    }
}

impl PortfolioSolver for ConicSolver {
    fn name(&self) -> &str {
        "clarabel"
    }

    fn min_volatility(&self, problem: &OptimizationProblem) -> Result<Allocation> {
        let weights = self.min_volatility_weights(problem)?;
        debug!(
            volatility = problem.portfolio_volatility(&weights),
            "minimum volatility portfolio"
        );
        Ok(problem.allocation(&weights))
    }

    fn efficient_risk(
        &self,
        problem: &OptimizationProblem,
        target_volatility: f64,
    ) -> Result<Allocation> {
        check_target("target volatility", target_volatility)?;
        let tol = self.config.target_tolerance;

        let min_vol = self.min_volatility_weights(problem)?;
        let min_volatility = problem.portfolio_volatility(&min_vol);
        if target_volatility < min_volatility - tol {
            return Err(PortfelError::InfeasibleTarget(format!(
                "target volatility {target_volatility:.6} is below the minimum achievable {min_volatility:.6}"
            )));
        }

        let max_ret = problem.max_return_weights();
        let max_ret_volatility = problem.portfolio_volatility(&max_ret);
        if max_ret_volatility <= target_volatility + tol {
            debug!(
                volatility = max_ret_volatility,
                "target volatility admits the maximum return portfolio"
            );
            return Ok(problem.allocation(&max_ret));
        }
        if target_volatility <= min_volatility + tol {
            return Ok(problem.allocation(&min_vol));
        }

        let n = problem.n_assets();
        let factor = cholesky(problem.covariance()).reversed_axes();
        let constraints =
            Constraints::budget(n, problem.bounds()).max_volatility(&factor, target_volatility);
        let q = problem.expected_returns().mapv(|m| -m).to_vec();
        let p = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());

        let weights = self.solve(problem, &p, &q, &constraints)?;
        debug!(
            target_volatility,
            volatility = problem.portfolio_volatility(&weights),
            expected_return = problem.portfolio_return(&weights),
            "efficient risk portfolio"
        );
        Ok(problem.allocation(&weights))
    }

    fn efficient_return(
        &self,
        problem: &OptimizationProblem,
        target_return: f64,
    ) -> Result<Allocation> {
        check_target("target return", target_return)?;
        let tol = self.config.target_tolerance;

        let max_ret = problem.max_return_weights();
        let top = problem.portfolio_return(&max_ret);
        if target_return > top + tol {
            return Err(PortfelError::InfeasibleTarget(format!(
                "target return {target_return:.6} exceeds the maximum attainable {top:.6}"
            )));
        }

        let min_vol = self.min_volatility_weights(problem)?;
        if problem.portfolio_return(&min_vol) >= target_return - tol {
            return Ok(problem.allocation(&min_vol));
        }
        if top <= target_return + tol {
            return Ok(problem.allocation(&max_ret));
        }

        let n = problem.n_assets();
        let p = to_csc(problem.covariance(), true);
        let constraints = Constraints::budget(n, problem.bounds())
            .min_return(problem.expected_returns(), target_return);

        let weights = self.solve(problem, &p, &vec![0.0; n], &constraints)?;
        debug!(
            target_return,
            volatility = problem.portfolio_volatility(&weights),
            expected_return = problem.portfolio_return(&weights),
            "efficient return portfolio"
        );
        Ok(problem.allocation(&weights))
    }
}
