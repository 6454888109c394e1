//! Running table of weights and their changes between runs.

use portfel_traits::{Allocation, Ticker};
use serde::{Deserialize, Serialize};

/// One ticker's current weight and its change on the last update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    /// Asset identifier
    pub ticker: Ticker,
    /// Current weight
    pub weight: f64,
    /// Weight after the last update minus the weight before it
    pub change: f64,
}

/// Weights of every ticker across successive optimizations.
///
/// Starts with every ticker at zero. Each [`apply`](Self::apply) overwrites
/// the weights of the tickers in the new allocation, records how much they
/// moved, and re-sorts by weight. Tickers missing from the allocation keep
/// their previous row untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationTable {
    rows: Vec<AllocationRow>,
}

impl AllocationTable {
    /// A zero-weight row for each ticker.
    pub fn new<'a>(tickers: impl IntoIterator<Item = &'a Ticker>) -> Self {
        Self {
            rows: tickers
                .into_iter()
                .map(|ticker| AllocationRow {
                    ticker: ticker.clone(),
                    weight: 0.0,
                    change: 0.0,
                })
                .collect(),
        }
    }

    /// Rows seeded with `previous` weights and no change recorded.
    ///
    /// Tickers absent from `previous` start at zero; tickers only in
    /// `previous` are ignored.
    pub fn with_previous<'a>(
        tickers: impl IntoIterator<Item = &'a Ticker>,
        previous: &Allocation,
    ) -> Self {
        let mut table = Self::new(tickers);
        for row in &mut table.rows {
            row.weight = previous.weight(&row.ticker).unwrap_or(0.0);
        }
        table.sort();
        table
    }

    /// Rows, largest weight first after the most recent update.
    pub fn rows(&self) -> &[AllocationRow] {
        &self.rows
    }

    /// Row of one ticker.
    pub fn row(&self, ticker: &str) -> Option<&AllocationRow> {
        self.rows.iter().find(|row| row.ticker == ticker)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Folds a new allocation into the table.
    pub fn apply(&mut self, allocation: &Allocation) {
        for row in &mut self.rows {
            if let Some(weight) = allocation.weight(&row.ticker) {
                row.change = weight - row.weight;
                row.weight = weight;
            }
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.rows.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    }
}
