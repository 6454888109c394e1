//! Daily returns and annualized expected returns.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// How historical returns are annualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedReturnMethod {
    /// Geometric: `Π(1 + r)^(frequency / count) - 1`
    #[default]
    Compounded,
    /// Arithmetic: `mean(r) * frequency`
    Simple,
}

/// Day-over-day percentage change of every column.
///
/// The result has one row fewer than `prices`. A return is `NaN` when either
/// price is missing or the earlier price is zero.
pub fn daily_returns(prices: ArrayView2<'_, f64>) -> Array2<f64> {
    let rows = prices.nrows().saturating_sub(1);
    let mut returns = Array2::from_elem((rows, prices.ncols()), f64::NAN);

    for t in 0..rows {
        for j in 0..prices.ncols() {
            let prev = prices[[t, j]];
            let curr = prices[[t + 1, j]];
            if prev.is_finite() && curr.is_finite() && prev != 0.0 {
                returns[[t, j]] = curr / prev - 1.0;
            }
        }
    }

    returns
}

/// Annualized historical return of one return series.
///
/// `frequency` is the number of periods per year to scale to. Missing returns
/// are skipped; a series without any finite return yields `NaN`.
pub fn annualized_return(
    returns: ArrayView1<'_, f64>,
    frequency: f64,
    method: ExpectedReturnMethod,
) -> f64 {
    let finite: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    let count = finite.len() as f64;

    match method {
        ExpectedReturnMethod::Compounded => {
            let growth: f64 = finite.iter().map(|r| 1.0 + r).product();
            growth.powf(frequency / count) - 1.0
        }
        ExpectedReturnMethod::Simple => finite.iter().sum::<f64>() / count * frequency,
    }
}

/// Annualized historical return of every column.
pub fn expected_returns(
    returns: ArrayView2<'_, f64>,
    frequency: f64,
    method: ExpectedReturnMethod,
) -> Array1<f64> {
    returns
        .columns()
        .into_iter()
        .map(|column| annualized_return(column, frequency, method))
        .collect()
}
