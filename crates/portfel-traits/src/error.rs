//! Error types for the portfel workspace.
//!
//! This module defines the error type shared by price loading, return and
//! covariance estimation, and portfolio solving.

use thiserror::Error;

/// The main error type for portfel operations.
///
/// Numeric degeneracies (too few observations, a flat benchmark, an
/// unreachable risk target) are reported here instead of surfacing as `NaN`
/// further down the pipeline.
#[derive(Debug, Error)]
pub enum PortfelError {
    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error when an analysis window cannot be constructed.
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error when the data admits no meaningful estimate (e.g. zero variance).
    #[error("Degenerate data: {0}")]
    DegenerateData(String),

    /// Error when vectors and matrices do not line up.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error when a risk or return target cannot be reached.
    #[error("Infeasible target: {0}")]
    InfeasibleTarget(String),

    /// Error raised by a portfolio solver.
    #[error("Solver failed: {0}")]
    Solver(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for PortfelError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for PortfelError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for portfel operations.
///
/// This is a convenience type that uses [`PortfelError`] as the error type.
pub type Result<T> = std::result::Result<T, PortfelError>;
