//! Common types used throughout the portfel workspace.
//!
//! This module defines the price table every computation starts from and the
//! analysis window used to slice it.

use std::collections::HashSet;

use chrono::Days;
use ndarray::{Array2, ArrayView1, ArrayViewMut2, Axis, s};
use serde::{Deserialize, Serialize};

use crate::{PortfelError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A security identifier, e.g. `"SBER.ME"`.
pub type Ticker = String;

/// Daily prices indexed by trading date, one column per ticker.
///
/// Missing quotes are stored as `NaN`. Rows are always sorted by date in
/// ascending order; [`PriceTable::new`] sorts them if needed, keeping the
/// original order of rows that share a date.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use portfel_traits::{Date, PriceTable};
///
/// let dates = vec![
///     Date::from_ymd_opt(2024, 1, 3).unwrap(),
///     Date::from_ymd_opt(2024, 1, 2).unwrap(),
/// ];
/// let tickers = vec!["MOEX.ME".to_string(), "SBER.ME".to_string()];
/// let prices = array![[101.0, 251.0], [100.0, 250.0]];
///
/// let table = PriceTable::new(dates, tickers, prices).unwrap();
/// assert_eq!(table.dates()[0], Date::from_ymd_opt(2024, 1, 2).unwrap());
/// assert_eq!(table.prices()[[0, 1]], 250.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<Date>,
    tickers: Vec<Ticker>,
    prices: Array2<f64>,
}

impl PriceTable {
    /// Creates a price table from dates, tickers and a `dates x tickers` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`PortfelError::DimensionMismatch`] if the matrix shape does not
    /// match the dates and tickers, and [`PortfelError::InvalidData`] if a
    /// ticker appears twice.
    pub fn new(dates: Vec<Date>, tickers: Vec<Ticker>, prices: Array2<f64>) -> Result<Self> {
        if prices.nrows() != dates.len() || prices.ncols() != tickers.len() {
            return Err(PortfelError::DimensionMismatch(format!(
                "price matrix is {}x{}, expected {}x{}",
                prices.nrows(),
                prices.ncols(),
                dates.len(),
                tickers.len()
            )));
        }

        let mut seen = HashSet::with_capacity(tickers.len());
        for ticker in &tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(PortfelError::InvalidData(format!(
                    "duplicate ticker column: {ticker}"
                )));
            }
        }

        if dates.windows(2).all(|w| w[0] <= w[1]) {
            return Ok(Self {
                dates,
                tickers,
                prices,
            });
        }

        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);
        let sorted_dates = order.iter().map(|&i| dates[i]).collect();
        let sorted_prices = prices.select(Axis(0), &order);

        Ok(Self {
            dates: sorted_dates,
            tickers,
            prices: sorted_prices,
        })
    }

    /// Trading dates, ascending.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Ticker column names in table order.
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// The `dates x tickers` price matrix.
    pub const fn prices(&self) -> &Array2<f64> {
        &self.prices
    }

    /// Number of date rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no date rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First date in the table.
    pub fn first_date(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    /// Last date in the table.
    pub fn last_date(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// Position of a ticker's column.
    pub fn column_index(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// Prices of a single ticker.
    pub fn column(&self, ticker: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(ticker)
            .map(|idx| self.prices.column(idx))
    }

    /// Rows whose date falls inside the window, both ends inclusive.
    ///
    /// The result may be empty if the window predates or postdates all data.
    pub fn slice(&self, window: &AnalysisWindow) -> Self {
        let start = self.dates.partition_point(|d| *d < window.start());
        let end = self
            .dates
            .partition_point(|d| *d <= window.end())
            .max(start);

        Self {
            dates: self.dates[start..end].to_vec(),
            tickers: self.tickers.clone(),
            prices: self.prices.slice(s![start..end, ..]).to_owned(),
        }
    }

    /// Keeps only the given rows, in the given order.
    ///
    /// Callers are expected to pass ascending indices so the date order holds.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            tickers: self.tickers.clone(),
            prices: self.prices.select(Axis(0), rows),
        }
    }

    /// A copy of the table with its prices rewritten in place by `f`.
    ///
    /// Dates, tickers and the matrix shape are unchanged.
    pub fn map_prices(&self, f: impl FnOnce(ArrayViewMut2<'_, f64>)) -> Self {
        let mut prices = self.prices.clone();
        f(prices.view_mut());
        Self {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            prices,
        }
    }
}

/// The inclusive date range `[current_date - window_days, current_date]`.
///
/// `current_date` is a calendar date and does not need to be a trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    current_date: Date,
    window_days: u32,
    start: Date,
}

impl AnalysisWindow {
    /// Creates a window ending at `current_date` and reaching back `window_days`.
    ///
    /// # Errors
    ///
    /// Returns [`PortfelError::InvalidWindow`] if `window_days` is zero and
    /// [`PortfelError::InvalidDate`] if the start date underflows the calendar.
    pub fn new(current_date: Date, window_days: u32) -> Result<Self> {
        if window_days == 0 {
            return Err(PortfelError::InvalidWindow(
                "window size must be at least one day".to_string(),
            ));
        }

        let start = current_date
            .checked_sub_days(Days::new(u64::from(window_days)))
            .ok_or_else(|| {
                PortfelError::InvalidDate(format!(
                    "{window_days} days before {current_date} is out of range"
                ))
            })?;

        Ok(Self {
            current_date,
            window_days,
            start,
        })
    }

    /// First calendar date of the window.
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Last calendar date of the window (the current date).
    pub const fn end(&self) -> Date {
        self.current_date
    }

    /// Window length in calendar days.
    pub const fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Whether a date lies inside the window.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.current_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_table() -> PriceTable {
        let dates = vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 5)];
        let tickers = vec!["MOEX.ME".to_string(), "SBER.ME".to_string()];
        let prices = array![[100.0, 250.0], [101.0, 252.0], [102.0, f64::NAN], [103.0, 255.0]];
        PriceTable::new(dates, tickers, prices).unwrap()
    }

    #[test]
    fn test_price_table_sorts_dates() {
        let dates = vec![d(2024, 1, 5), d(2024, 1, 2), d(2024, 1, 3)];
        let tickers = vec!["A".to_string()];
        let prices = array![[3.0], [1.0], [2.0]];

        let table = PriceTable::new(dates, tickers, prices).unwrap();
        assert_eq!(table.dates(), &[d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 5)]);
        assert_eq!(table.prices().column(0).to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_price_table_rejects_bad_shape() {
        let result =
            PriceTable::new(vec![d(2024, 1, 2)], vec!["A".to_string()], array![[1.0, 2.0]]);
        assert!(matches!(result, Err(PortfelError::DimensionMismatch(_))));
    }

    #[test]
    fn test_price_table_rejects_duplicate_tickers() {
        let result = PriceTable::new(
            vec![d(2024, 1, 2)],
            vec!["A".to_string(), "A".to_string()],
            array![[1.0, 2.0]],
        );
        assert!(matches!(result, Err(PortfelError::InvalidData(_))));
    }

    #[test]
    fn test_price_table_column() {
        let table = sample_table();
        assert_eq!(table.column_index("SBER.ME"), Some(1));
        assert_eq!(table.column("MOEX.ME").unwrap()[3], 103.0);
        assert!(table.column("GAZP.ME").is_none());
        assert_eq!(table.first_date(), Some(d(2024, 1, 2)));
        assert_eq!(table.last_date(), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_slice_is_inclusive() {
        let table = sample_table();
        let window = AnalysisWindow::new(d(2024, 1, 4), 1).unwrap();

        let sliced = table.slice(&window);
        assert_eq!(sliced.dates(), &[d(2024, 1, 3), d(2024, 1, 4)]);
        assert_eq!(sliced.prices().nrows(), 2);
        assert_eq!(sliced.tickers(), table.tickers());
    }

    #[test]
    fn test_slice_before_all_data_is_empty() {
        let table = sample_table();
        let window = AnalysisWindow::new(d(2023, 6, 1), 30).unwrap();

        let sliced = table.slice(&window);
        assert!(sliced.is_empty());
        assert_eq!(sliced.prices().ncols(), 2);
    }

    #[test]
    fn test_select_rows() {
        let table = sample_table();
        let picked = table.select_rows(&[0, 3]);
        assert_eq!(picked.dates(), &[d(2024, 1, 2), d(2024, 1, 5)]);
        assert_eq!(picked.prices()[[1, 1]], 255.0);
    }

    #[test]
    fn test_map_prices_keeps_layout() {
        let table = sample_table();
        let doubled = table.map_prices(|mut prices| prices.mapv_inplace(|p| p * 2.0));

        assert_eq!(doubled.dates(), table.dates());
        assert_eq!(doubled.tickers(), table.tickers());
        assert_eq!(doubled.prices(), &(table.prices() * 2.0));
    }

    #[test]
    fn test_window_bounds() {
        let window = AnalysisWindow::new(d(2024, 3, 31), 90).unwrap();
        assert_eq!(window.start(), d(2024, 1, 1));
        assert_eq!(window.end(), d(2024, 3, 31));
        assert_eq!(window.window_days(), 90);
        assert!(window.contains(d(2024, 1, 1)));
        assert!(window.contains(d(2024, 3, 31)));
        assert!(!window.contains(d(2024, 4, 1)));
    }

    #[test]
    fn test_zero_window_is_error() {
        let result = AnalysisWindow::new(d(2024, 3, 31), 0);
        assert!(matches!(result, Err(PortfelError::InvalidWindow(_))));
    }
}
