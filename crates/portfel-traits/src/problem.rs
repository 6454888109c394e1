//! Inputs and outputs of a portfolio solver.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::{PortfelError, Result, Ticker};

/// Per-asset weight limits shared by every asset in the problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    /// Smallest weight any single asset may take.
    pub lower: f64,
    /// Largest weight any single asset may take.
    pub upper: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
        }
    }
}

impl WeightBounds {
    /// Long-only bounds `[0, upper]`.
    pub const fn long_only(upper: f64) -> Self {
        Self { lower: 0.0, upper }
    }

    /// Checks that `n` assets within these bounds can sum to one.
    ///
    /// # Errors
    ///
    /// Returns [`PortfelError::InvalidData`] if the bounds are inverted,
    /// non-finite, or cannot be met by a fully invested portfolio.
    pub fn validate(&self, n: usize) -> Result<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower > self.upper {
            return Err(PortfelError::InvalidData(format!(
                "invalid weight bounds [{}, {}]",
                self.lower, self.upper
            )));
        }
        let n = n as f64;
        if n * self.lower > 1.0 + 1e-12 || n * self.upper < 1.0 - 1e-12 {
            return Err(PortfelError::InvalidData(format!(
                "weight bounds [{}, {}] cannot sum to 1 across {} assets",
                self.lower, self.upper, n
            )));
        }
        Ok(())
    }
}

/// Expected returns, covariance and bounds for a set of assets.
///
/// Construction validates that every input lines up and is finite, so
/// solvers can work on the raw arrays without further checks.
#[derive(Debug, Clone)]
pub struct OptimizationProblem {
    tickers: Vec<Ticker>,
    expected_returns: Array1<f64>,
    covariance: Array2<f64>,
    bounds: WeightBounds,
}

impl OptimizationProblem {
    /// Creates a new optimization problem.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no assets, the dimensions disagree, any
    /// input is non-finite, or the bounds are infeasible.
    pub fn new(
        tickers: Vec<Ticker>,
        expected_returns: Array1<f64>,
        covariance: Array2<f64>,
        bounds: WeightBounds,
    ) -> Result<Self> {
        let n = tickers.len();
        if n == 0 {
            return Err(PortfelError::InsufficientData(
                "optimization problem has no assets".to_string(),
            ));
        }
        if expected_returns.len() != n || covariance.dim() != (n, n) {
            return Err(PortfelError::DimensionMismatch(format!(
                "{} tickers, {} expected returns, {:?} covariance",
                n,
                expected_returns.len(),
                covariance.dim()
            )));
        }
        if expected_returns.iter().any(|x| !x.is_finite()) {
            return Err(PortfelError::InvalidData(
                "expected returns contain non-finite values".to_string(),
            ));
        }
        if covariance.iter().any(|x| !x.is_finite()) {
            return Err(PortfelError::InvalidData(
                "covariance matrix contains non-finite values".to_string(),
            ));
        }
        bounds.validate(n)?;

        Ok(Self {
            tickers,
            expected_returns,
            covariance,
            bounds,
        })
    }

    /// Asset identifiers, in the order of every vector and matrix axis.
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Expected annual returns.
    pub const fn expected_returns(&self) -> &Array1<f64> {
        &self.expected_returns
    }

    /// Covariance matrix of returns.
    pub const fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Weight bounds.
    pub const fn bounds(&self) -> WeightBounds {
        self.bounds
    }

    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Weights of the highest expected return attainable within the bounds.
    ///
    /// Every asset starts at the lower bound and the remaining budget goes to
    /// assets in decreasing order of expected return, which solves the
    /// linear program exactly.
    pub fn max_return_weights(&self) -> Array1<f64> {
        let WeightBounds { lower, upper } = self.bounds;
        let n = self.n_assets();
        let mut weights = Array1::from_elem(n, lower);
        let mut remaining = lower.mul_add(-(n as f64), 1.0);

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| self.expected_returns[b].total_cmp(&self.expected_returns[a]));

        for i in order {
            if remaining <= 0.0 {
                break;
            }
            let add = (upper - lower).min(remaining);
            weights[i] += add;
            remaining -= add;
        }

        weights
    }

    /// `wᵀμ`
    pub fn portfolio_return(&self, weights: &Array1<f64>) -> f64 {
        weights.dot(&self.expected_returns)
    }

    /// `wᵀΣw`, floored at zero.
    pub fn portfolio_variance(&self, weights: &Array1<f64>) -> f64 {
        weights.dot(&self.covariance.dot(weights)).max(0.0)
    }

    /// `√(wᵀΣw)`
    pub fn portfolio_volatility(&self, weights: &Array1<f64>) -> f64 {
        self.portfolio_variance(weights).sqrt()
    }

    /// Return, volatility and Sharpe ratio of a weight vector.
    pub fn performance(&self, weights: &Array1<f64>, risk_free_rate: f64) -> PortfolioPerformance {
        PortfolioPerformance::new(
            self.portfolio_return(weights),
            self.portfolio_volatility(weights),
            risk_free_rate,
        )
    }

    /// Wraps a weight vector aligned with [`Self::tickers`] into an allocation.
    pub fn allocation(&self, weights: &Array1<f64>) -> Allocation {
        Allocation::new(
            self.tickers
                .iter()
                .zip(weights.iter())
                .map(|(ticker, &weight)| TickerWeight {
                    ticker: ticker.clone(),
                    weight,
                })
                .collect(),
        )
    }
}

/// Expected return, volatility and Sharpe ratio of a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// Expected annual return.
    pub expected_return: f64,
    /// Annual volatility (standard deviation).
    pub volatility: f64,
    /// `(expected_return - risk_free_rate) / volatility`
    pub sharpe_ratio: f64,
}

impl PortfolioPerformance {
    /// Builds the performance summary; the Sharpe ratio is `NaN` for a riskless portfolio.
    pub fn new(expected_return: f64, volatility: f64, risk_free_rate: f64) -> Self {
        let sharpe_ratio = if volatility > 0.0 {
            (expected_return - risk_free_rate) / volatility
        } else {
            f64::NAN
        };
        Self {
            expected_return,
            volatility,
            sharpe_ratio,
        }
    }
}

/// One ticker's share of a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerWeight {
    /// Asset identifier.
    pub ticker: Ticker,
    /// Fraction of the portfolio.
    pub weight: f64,
}

/// Portfolio weights by ticker, in solver order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    weights: Vec<TickerWeight>,
}

impl Allocation {
    /// Creates an allocation from ticker weights.
    pub const fn new(weights: Vec<TickerWeight>) -> Self {
        Self { weights }
    }

    /// All ticker weights.
    pub fn weights(&self) -> &[TickerWeight] {
        &self.weights
    }

    /// Weight of one ticker.
    pub fn weight(&self, ticker: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|tw| tw.ticker == ticker)
            .map(|tw| tw.weight)
    }

    /// Weights as a vector, in allocation order.
    pub fn to_array(&self) -> Array1<f64> {
        self.weights.iter().map(|tw| tw.weight).collect()
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.weights.iter().map(|tw| tw.weight).sum()
    }

    /// Number of tickers.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the allocation has no tickers.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weights strictly above `threshold`, largest first.
    pub fn significant(&self, threshold: f64) -> Vec<&TickerWeight> {
        let mut picked: Vec<&TickerWeight> =
            self.weights.iter().filter(|tw| tw.weight > threshold).collect();
        picked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        picked
    }
}
