//! Estimate command implementation.

use anyhow::Result;
use portfel::{OptimizeConfig, PortfolioOptimizer, PriceTable};

/// Largest universe whose covariance matrix is printed in full.
const MAX_PRINTED_MATRIX: usize = 12;

/// Show the factor model fitted over the configured window.
pub(crate) fn show_estimate(prices: PriceTable, config: &OptimizeConfig) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Return/Covariance Estimate                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let optimizer = PortfolioOptimizer::with_default_solver(prices);
    let estimate = optimizer.estimate(config)?;

    println!("Window:       {} to {}", estimate.window.start(), estimate.window.end());
    println!("Observations: {} price rows", estimate.observations);
    println!("Benchmark:    {}", config.estimator.benchmark);
    println!("  Mean:       {:.6}", estimate.benchmark.mean);
    println!("  Variance:   {:.8}", estimate.benchmark.variance);
    println!();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("FACTOR EXPOSURES");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!(
        "{:<12} {:>10} {:>12} {:>12} {:>12}",
        "Ticker", "Beta", "Alpha", "Resid Vol", "Exp Return"
    );
    println!("{}", "─".repeat(62));
    for (te, mu) in estimate.exposures.iter().zip(estimate.expected_returns.iter()) {
        println!(
            "{:<12} {:>10.4} {:>12.6} {:>12.6} {:>11.2}%",
            te.ticker,
            te.exposure.beta,
            te.exposure.alpha,
            te.exposure.residual_volatility,
            mu * 100.0
        );
    }
    println!();

    if !estimate.dropped.is_empty() {
        println!("Dropped (not enough data): {}", estimate.dropped.join(", "));
        println!();
    }

    if estimate.n_assets() <= MAX_PRINTED_MATRIX {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("COVARIANCE");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

        print!("{:<12}", "");
        for ticker in &estimate.tickers {
            print!(" {:>11}", ticker);
        }
        println!();
        for (ticker, row) in estimate.tickers.iter().zip(estimate.covariance.rows()) {
            print!("{:<12}", ticker);
            for value in row {
                print!(" {:>11.3e}", value);
            }
            println!();
        }
        println!();
    } else {
        println!(
            "Covariance matrix is {0}x{0}; use `optimize --artifacts <dir>` to export it.",
            estimate.n_assets()
        );
        println!();
    }

    Ok(())
}
