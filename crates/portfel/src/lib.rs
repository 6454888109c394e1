#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/portfel/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # portfel
//!
//! portfel is an umbrella crate: it wires price loading, return/covariance
//! estimation and the frontier solver into one [`PortfolioOptimizer`], and
//! re-exports the sub-crates for convenience.
//!
//! ## Crate Organization
//!
//! - [`traits`] - Shared types, the error enum and the [`PortfolioSolver`] trait
//! - [`data`] - CSV price loading
//! - [`estimate`] - Windowed returns and the single-factor covariance
//! - [`optimize`] - Efficient-frontier solver, weight cleaning, frontier sampling
//!
//! ## Pipeline
//!
//! 1. **Load** the price table once ([`data::CsvPriceLoader`])
//! 2. **Estimate** expected returns and covariance for a window
//! 3. **Solve** for the best portfolio at the target volatility
//! 4. **Report** the cleaned weights and write CSV artifacts

/// Version information for the portfel crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod artifacts;
mod config;
mod optimizer;
mod preset;
mod table;

pub use artifacts::{
    ArtifactPaths, COVARIANCE_FILE, FRONTIER_FILE, WEIGHTS_FILE, covariance_frame, frontier_frame,
    read_weights, weights_frame, write_artifacts,
};
pub use config::OptimizeConfig;
pub use optimizer::{OptimizationReport, PortfolioOptimizer, ReportSummary};
pub use preset::{WindowPreset, parse_window_days};
pub use table::{AllocationRow, AllocationTable};

/// Core types and the solver trait.
pub mod traits {
    pub use portfel_traits::*;
}

// Re-export core types at top level for convenience
pub use portfel_traits::{
    Allocation, AnalysisWindow, Date, OptimizationProblem, PortfelError, PortfolioPerformance,
    PortfolioSolver, PriceTable, Result, Ticker, TickerWeight, WeightBounds,
};

/// CSV price loading.
///
/// # Example
///
/// ```ignore
/// use portfel::data::CsvPriceLoader;
///
/// let prices = CsvPriceLoader::new("data.csv").load()?;
/// ```
pub mod data {
    pub use portfel_data::*;
}

/// Return and covariance estimation.
///
/// The estimator slices the prices to the window, cleans them, regresses
/// every asset on the benchmark and rebuilds the covariance from the betas.
pub mod estimate {
    pub use portfel_estimate::*;
}

/// Portfolio solvers.
///
/// ## Available Solvers
///
/// - **ConicSolver**: long-only quadratic and second-order cone programs solved by Clarabel
pub mod optimize {
    pub use portfel_optimize::*;
}
