//! Optimize command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};
use portfel::{
    Allocation, AllocationTable, OptimizationReport, OptimizeConfig, PortfolioOptimizer,
    PriceTable, Ticker, read_weights, write_artifacts,
};

/// Solve for the target volatility and report the allocation.
///
/// `previous` names a weights file from an earlier run; the report's
/// change column is measured against it.
pub(crate) fn run_optimize(
    prices: PriceTable,
    config: &OptimizeConfig,
    previous: Option<&Path>,
    artifacts: Option<&Path>,
    points: usize,
    format: &str,
) -> Result<()> {
    let json = match format {
        "text" => false,
        "json" => true,
        other => bail!("Unknown output format: {other} (expected text or json)"),
    };

    let optimizer = PortfolioOptimizer::with_default_solver(prices);
    let report = optimizer.optimize(config)?;

    if json {
        let summary = report.summary(config.display_threshold);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let table = allocation_table(optimizer.tickers(), previous, &report.allocation)?;
        print_report(&report, &table, config);
    }

    if let Some(dir) = artifacts {
        let frontier = optimizer.frontier(config, points)?;
        let paths = write_artifacts(dir, &report, &frontier, config.display_threshold)?;
        if !json {
            println!("Artifacts:");
            println!("  {}", paths.frontier.display());
            println!("  {}", paths.covariance.display());
            println!("  {}", paths.weights.display());
            println!();
        }
    }

    Ok(())
}

/// This run's weights, with changes measured from `previous` when given.
fn allocation_table(
    tickers: &[Ticker],
    previous: Option<&Path>,
    allocation: &Allocation,
) -> Result<AllocationTable> {
    let mut table = previous.map_or_else(
        || Ok(AllocationTable::new(tickers)),
        |path| {
            read_weights(path)
                .map(|weights| AllocationTable::with_previous(tickers, &weights))
                .with_context(|| {
                    format!("failed to read previous weights from {}", path.display())
                })
        },
    )?;
    table.apply(allocation);
    Ok(table)
}

fn print_report(report: &OptimizationReport, table: &AllocationTable, config: &OptimizeConfig) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Portfolio Optimization                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let window = &report.estimate.window;
    println!(
        "Window:     {} to {} ({} days)",
        window.start(),
        window.end(),
        window.window_days()
    );
    println!("Benchmark:  {}", config.estimator.benchmark);
    println!("Assets:     {}", report.estimate.n_assets());
    println!("Target vol: {:.4}", report.target_volatility);
    println!("Solver:     {}", report.solver);
    println!();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("PERFORMANCE");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    println!(
        "Expected annual return: {:>8.2}%",
        report.performance.expected_return * 100.0
    );
    println!("Volatility:             {:>8.4}", report.performance.volatility);
    println!("Sharpe ratio:           {:>8.3}", report.performance.sharpe_ratio);
    println!();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("WEIGHTS (above {:.0}%)", config.display_threshold * 100.0);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("{:<12} {:>10} {:>10}", "Ticker", "Weight", "Change");
    println!("{}", "─".repeat(34));
    for row in table
        .rows()
        .iter()
        .filter(|row| row.weight > config.display_threshold)
    {
        println!(
            "{:<12} {:>9.2}% {:>+9.2}%",
            row.ticker,
            row.weight * 100.0,
            row.change * 100.0
        );
    }
    println!();

    if !report.estimate.dropped.is_empty() {
        println!("Dropped (not enough data): {}", report.estimate.dropped.join(", "));
        println!();
    }
}
