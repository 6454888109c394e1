//! Tickers command implementation.

use portfel::PriceTable;

/// List the ticker columns of the price file.
pub(crate) fn list_tickers(prices: &PriceTable) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Available Tickers                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    match (prices.first_date(), prices.last_date()) {
        (Some(first), Some(last)) => {
            println!("Rows:     {}", prices.len());
            println!("Range:    {} to {}", first, last);
        }
        _ => println!("Price file has no rows."),
    }
    println!();

    println!("{:<12} {:>10}", "Ticker", "Quotes");
    println!("{}", "─".repeat(23));
    for ticker in prices.tickers() {
        let quotes = prices
            .column(ticker)
            .map(|c| c.iter().filter(|v| v.is_finite()).count())
            .unwrap_or(0);
        println!("{:<12} {:>10}", ticker, quotes);
    }
    println!();
}
