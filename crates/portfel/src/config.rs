//! Per-call optimizer configuration.

use chrono::Local;
use portfel_estimate::EstimatorConfig;
use portfel_optimize::WeightCleaning;
use portfel_traits::{AnalysisWindow, Date, Result, WeightBounds};
use serde::{Deserialize, Serialize};

use crate::preset::WindowPreset;

/// Everything one optimization run depends on besides the prices.
///
/// The optimizer keeps no state between calls; change a field and call again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// Last day of the analysis window (default: today)
    pub current_date: Date,

    /// Calendar days the window reaches back (default: 90)
    pub window_days: u32,

    /// Ignore all prices before this date
    pub since: Option<Date>,

    /// Volatility the chosen portfolio may not exceed (default: 0.05)
    pub target_volatility: f64,

    /// Risk-free rate for the Sharpe ratio (default: 0.02)
    pub risk_free_rate: f64,

    /// Benchmark, covariance construction and data requirements
    pub estimator: EstimatorConfig,

    /// Per-asset weight limits (default: [0, 1])
    pub weight_bounds: WeightBounds,

    /// Cutoff and rounding applied to solver weights
    pub cleaning: WeightCleaning,

    /// Weights at or below this are left out of reports and artifacts (default: 0.02)
    pub display_threshold: f64,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            current_date: Local::now().date_naive(),
            window_days: WindowPreset::ThreeMonths.days(),
            since: None,
            target_volatility: 0.05,
            risk_free_rate: 0.02,
            estimator: EstimatorConfig::default(),
            weight_bounds: WeightBounds::default(),
            cleaning: WeightCleaning::default(),
            display_threshold: 0.02,
        }
    }
}

impl OptimizeConfig {
    /// Config for `current_date` with everything else at its default.
    pub fn for_date(current_date: Date) -> Self {
        Self {
            current_date,
            ..Self::default()
        }
    }

    /// Sets the window length.
    #[must_use]
    pub const fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    /// Sets the target volatility.
    #[must_use]
    pub const fn with_target_volatility(mut self, target_volatility: f64) -> Self {
        self.target_volatility = target_volatility;
        self
    }

    /// Sets the benchmark ticker.
    #[must_use]
    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.estimator.benchmark = benchmark.into();
        self
    }

    /// The analysis window described by this config.
    ///
    /// # Errors
    ///
    /// Returns an error if `window_days` is zero or reaches before the
    /// earliest representable date.
    pub fn window(&self) -> Result<AnalysisWindow> {
        AnalysisWindow::new(self.current_date, self.window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use portfel_traits::PortfelError;

    fn date() -> Date {
        Date::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = OptimizeConfig::for_date(date());
        assert_eq!(config.window_days, 90);
        assert_relative_eq!(config.target_volatility, 0.05);
        assert_relative_eq!(config.risk_free_rate, 0.02);
        assert_relative_eq!(config.display_threshold, 0.02);
        assert_eq!(config.estimator.benchmark, "MOEX.ME");
        assert!(config.since.is_none());
    }

    #[test]
    fn test_builders() {
        let config = OptimizeConfig::for_date(date())
            .with_window_days(360)
            .with_target_volatility(0.02)
            .with_benchmark("IMOEX");
        assert_eq!(config.window_days, 360);
        assert_relative_eq!(config.target_volatility, 0.02);
        assert_eq!(config.estimator.benchmark, "IMOEX");
    }

    #[test]
    fn test_window() {
        let window = OptimizeConfig::for_date(date()).window().unwrap();
        assert_eq!(window.end(), date());
        assert_eq!(window.start(), Date::from_ymd_opt(2024, 3, 30).unwrap());
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = OptimizeConfig::for_date(date()).with_window_days(0).window();
        assert!(matches!(result, Err(PortfelError::InvalidWindow(_))));
    }
}
