//! Weight post-processing.

use portfel_traits::{Allocation, TickerWeight};
use serde::{Deserialize, Serialize};

/// Zeroes negligible weights and rounds the rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightCleaning {
    /// Weights with absolute value below this become exactly zero (default: 1e-4)
    pub cutoff: f64,

    /// Decimal places kept (default: 5)
    pub decimals: u32,
}

impl Default for WeightCleaning {
    fn default() -> Self {
        Self {
            cutoff: 1e-4,
            decimals: 5,
        }
    }
}

impl WeightCleaning {
    /// Applies the cutoff and rounding to every weight.
    ///
    /// Rounding can leave the total a few units of the last decimal away
    /// from one; weights are not renormalized.
    pub fn apply(&self, allocation: &Allocation) -> Allocation {
        let scale = 10_f64.powi(self.decimals as i32);
        Allocation::new(
            allocation
                .weights()
                .iter()
                .map(|tw| {
                    let weight = if tw.weight.abs() < self.cutoff {
                        0.0
                    } else {
                        (tw.weight * scale).round() / scale
                    };
                    TickerWeight {
                        ticker: tw.ticker.clone(),
                        weight,
                    }
                })
                .collect(),
        )
    }
}

/// [`WeightCleaning::apply`] with the default cutoff and rounding.
pub fn clean_weights(allocation: &Allocation) -> Allocation {
    WeightCleaning::default().apply(allocation)
}
