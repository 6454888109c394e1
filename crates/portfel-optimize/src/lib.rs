//! Efficient-frontier solvers for portfel.
//!
//! This crate implements [`PortfolioSolver`](portfel_traits::PortfolioSolver)
//! for long-only, fully invested portfolios on top of the Clarabel
//! interior-point solver, plus the utilities around it: weight cleaning and
//! frontier sampling.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ndarray::{Array2, array};
//! use portfel_optimize::{ConicSolver, clean_weights};
//! use portfel_traits::{OptimizationProblem, PortfolioSolver, WeightBounds};
//!
//! let problem = OptimizationProblem::new(
//!     vec!["SBER.ME".into(), "GAZP.ME".into()],
//!     array![0.12, 0.08],
//!     Array2::from_diag(&array![0.0004, 0.0002]),
//!     WeightBounds::default(),
//! )
//! .unwrap();
//!
//! let solver = ConicSolver::default();
//! let weights = clean_weights(&solver.efficient_risk(&problem, 0.015).unwrap());
//! ```

mod clean;
mod conic;
mod frontier;

// Re-export main types
pub use clean::{WeightCleaning, clean_weights};
pub use frontier::{DEFAULT_FRONTIER_POINTS, FrontierPoint, sample_frontier};
pub use conic::{ConicSolver, SolverConfig};
