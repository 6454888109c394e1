#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/portfel/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

//! Core types and trait definitions for the portfel portfolio optimizer.
//!
//! This crate provides the price table, analysis window, optimization problem
//! and the solver abstraction shared by estimation and optimization crates.

/// The version of the portfel-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod problem;
pub mod solver;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{PortfelError, Result};
pub use problem::{
    Allocation, OptimizationProblem, PortfolioPerformance, TickerWeight, WeightBounds,
};
pub use solver::PortfolioSolver;
pub use types::{AnalysisWindow, Date, PriceTable, Ticker};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
