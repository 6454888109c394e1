//! CSV artifacts written after an optimization run.

use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use portfel_data::{read_csv, write_csv};
use portfel_optimize::FrontierPoint;
use portfel_traits::{Allocation, PortfelError, Result, TickerWeight};
use tracing::{debug, info};

use crate::optimizer::OptimizationReport;

/// Efficient frontier plus the chosen portfolio.
pub const FRONTIER_FILE: &str = "frontier.csv";
/// Ticker-by-ticker covariance matrix.
pub const COVARIANCE_FILE: &str = "covariance.csv";
/// Displayed weights of the chosen portfolio.
pub const WEIGHTS_FILE: &str = "weights.csv";

/// Where [`write_artifacts`] put each file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Frontier CSV
    pub frontier: PathBuf,
    /// Covariance CSV
    pub covariance: PathBuf,
    /// Weights CSV
    pub weights: PathBuf,
}

/// Frontier points followed by the chosen portfolio, flagged in `chosen`.
///
/// # Errors
///
/// Returns an error if the frame cannot be assembled.
pub fn frontier_frame(
    report: &OptimizationReport,
    frontier: &[FrontierPoint],
) -> Result<DataFrame> {
    let performances = frontier
        .iter()
        .map(|p| p.performance)
        .chain(std::iter::once(report.performance));

    let mut volatility = Vec::with_capacity(frontier.len() + 1);
    let mut expected_return = Vec::with_capacity(frontier.len() + 1);
    let mut sharpe_ratio = Vec::with_capacity(frontier.len() + 1);
    for p in performances {
        volatility.push(p.volatility);
        expected_return.push(p.expected_return);
        sharpe_ratio.push(p.sharpe_ratio);
    }
    let mut chosen = vec![false; frontier.len()];
    chosen.push(true);

    Ok(DataFrame::new(vec![
        Column::new("volatility".into(), volatility),
        Column::new("expected_return".into(), expected_return),
        Column::new("sharpe_ratio".into(), sharpe_ratio),
        Column::new("chosen".into(), chosen),
    ])?)
}

/// Covariance matrix with a leading `ticker` column.
pub fn covariance_frame(report: &OptimizationReport) -> Result<DataFrame> {
    let estimate = &report.estimate;
    let mut columns = Vec::with_capacity(estimate.n_assets() + 1);
    columns.push(Column::new("ticker".into(), estimate.tickers.clone()));

    for (ticker, values) in estimate.tickers.iter().zip(estimate.covariance.columns()) {
        columns.push(Column::new(ticker.as_str().into(), values.to_vec()));
    }

    Ok(DataFrame::new(columns)?)
}

/// Weights above `display_threshold`, largest first.
pub fn weights_frame(report: &OptimizationReport, display_threshold: f64) -> Result<DataFrame> {
    let (tickers, weights): (Vec<String>, Vec<f64>) = report
        .allocation
        .significant(display_threshold)
        .into_iter()
        .map(|tw| (tw.ticker.clone(), tw.weight))
        .unzip();

    Ok(DataFrame::new(vec![
        Column::new("ticker".into(), tickers),
        Column::new("weight".into(), weights),
    ])?)
}

/// Reads a `ticker,weight` file such as [`WEIGHTS_FILE`] back into an allocation.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a column is missing, or a
/// row has no ticker or weight.
pub fn read_weights(path: &Path) -> Result<Allocation> {
    let df = read_csv(path)?;
    let column = |name: &str| {
        df.column(name)
            .map(|c| c.as_materialized_series().clone())
            .map_err(|_| PortfelError::MissingColumn(name.to_string()))
    };
    let tickers = column("ticker")?;
    let weights = column("weight")?.cast(&DataType::Float64)?;

    let rows = tickers
        .str()?
        .into_iter()
        .zip(weights.f64()?)
        .map(|(ticker, weight)| match (ticker, weight) {
            (Some(ticker), Some(weight)) => Ok(TickerWeight {
                ticker: ticker.to_string(),
                weight,
            }),
            _ => Err(PortfelError::InvalidData(format!(
                "incomplete weight row in {}",
                path.display()
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(path = %path.display(), tickers = rows.len(), "read weights");
    Ok(Allocation::new(rows))
}

/// Writes the frontier, covariance and weights CSVs into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be written.
pub fn write_artifacts(
    dir: &Path,
    report: &OptimizationReport,
    frontier: &[FrontierPoint],
    display_threshold: f64,
) -> Result<ArtifactPaths> {
    fs::create_dir_all(dir)?;

    let paths = ArtifactPaths {
        frontier: dir.join(FRONTIER_FILE),
        covariance: dir.join(COVARIANCE_FILE),
        weights: dir.join(WEIGHTS_FILE),
    };

    write_csv(&mut frontier_frame(report, frontier)?, &paths.frontier)?;
    write_csv(&mut covariance_frame(report)?, &paths.covariance)?;
    write_csv(&mut weights_frame(report, display_threshold)?, &paths.weights)?;

    info!(dir = %dir.display(), "wrote artifacts");
    Ok(paths)
}
