//! Frontier command implementation.

use anyhow::Result;
use portfel::{OptimizeConfig, PortfolioOptimizer, PriceTable};

/// Sample and print the efficient frontier for the configured window.
pub(crate) fn show_frontier(
    prices: PriceTable,
    config: &OptimizeConfig,
    points: usize,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Efficient Frontier                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let optimizer = PortfolioOptimizer::with_default_solver(prices);
    let window = config.window()?;
    println!("Window:  {} to {}", window.start(), window.end());
    println!("Points:  {}", points);
    println!();

    let frontier = optimizer.frontier(config, points)?;

    println!(
        "{:>12} {:>12} {:>12} {:>10}",
        "Target", "Return", "Volatility", "Sharpe"
    );
    println!("{}", "─".repeat(49));
    for point in &frontier {
        println!(
            "{:>11.2}% {:>11.2}% {:>12.6} {:>10.3}",
            point.target_return * 100.0,
            point.performance.expected_return * 100.0,
            point.performance.volatility,
            point.performance.sharpe_ratio
        );
    }
    println!();

    if frontier.len() < points {
        println!(
            "{} of {} targets were infeasible and skipped.",
            points - frontier.len(),
            points
        );
        println!();
    }

    Ok(())
}
