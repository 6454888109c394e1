//! portfel CLI binary.
//!
//! Provides the command-line interface for the portfel portfolio optimizer.

mod cmd;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use portfel::data::{CsvLayout, CsvPriceLoader, DEFAULT_PRICES_FILE, PRICES_ENV_VAR};
use portfel::estimate::CovarianceConstruction;
use portfel::{OptimizeConfig, PriceTable, parse_window_days};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portfel")]
#[command(about = "Single-factor efficient-frontier portfolio optimizer", long_about = None)]
#[command(version)]
struct Cli {
    /// Daily price CSV: a date column plus one column per ticker
    #[arg(long, global = true, env = PRICES_ENV_VAR, default_value = DEFAULT_PRICES_FILE)]
    prices: PathBuf,

    /// Name of the date column in the price CSV
    #[arg(long, global = true, default_value = "Date")]
    date_column: String,

    #[command(subcommand)]
    command: Commands,
}

/// Window and estimator options shared by the analysis commands.
#[derive(Args)]
struct WindowArgs {
    /// Last day of the window (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    date: Option<String>,

    /// Window length: 3m, 6m, 1y, 2y, 3y, 4y, 5y or a number of days
    #[arg(short, long, default_value = "3m")]
    window: String,

    /// Ignore prices before this date (YYYY-MM-DD)
    #[arg(long)]
    since: Option<String>,

    /// Benchmark ticker used as the market factor
    #[arg(short, long, default_value = "MOEX.ME")]
    benchmark: String,

    /// Covariance construction (beta-adjusted or legacy)
    #[arg(long, default_value = "beta-adjusted")]
    covariance: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List tickers in the price file
    Tickers,

    /// Show betas, expected returns and covariance for a window
    Estimate {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Find the highest-return portfolio within a volatility target
    Optimize {
        #[command(flatten)]
        window: WindowArgs,

        /// Target volatility
        #[arg(short, long, default_value = "0.05")]
        risk: f64,

        /// Weights CSV from an earlier run to measure changes against
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Directory to write frontier, covariance and weights CSVs into
        #[arg(long)]
        artifacts: Option<PathBuf>,

        /// Frontier points sampled for the artifacts
        #[arg(long, default_value = "100")]
        points: usize,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Sample the efficient frontier
    Frontier {
        #[command(flatten)]
        window: WindowArgs,

        /// Number of target returns
        #[arg(short, long, default_value = "100")]
        points: usize,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("portfel=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let prices = load_prices(&cli.prices, &cli.date_column)?;

    match cli.command {
        Commands::Tickers => {
            cmd::tickers::list_tickers(&prices);
        }
        Commands::Estimate { window } => {
            cmd::estimate::show_estimate(prices, &window.config()?)?;
        }
        Commands::Optimize {
            window,
            risk,
            previous,
            artifacts,
            points,
            format,
        } => {
            let config = window.config()?.with_target_volatility(risk);
            cmd::optimize::run_optimize(
                prices,
                &config,
                previous.as_deref(),
                artifacts.as_deref(),
                points,
                &format,
            )?;
        }
        Commands::Frontier { window, points } => {
            cmd::frontier::show_frontier(prices, &window.config()?, points)?;
        }
    }

    Ok(())
}

fn load_prices(path: &std::path::Path, date_column: &str) -> Result<PriceTable> {
    let layout = CsvLayout {
        date_column: date_column.to_string(),
        ..CsvLayout::default()
    };
    CsvPriceLoader::new(path)
        .with_layout(layout)
        .load()
        .with_context(|| format!("failed to load prices from {}", path.display()))
}

/// Parse a date string in YYYY-MM-DD format.
fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {date_str}"))
}

fn parse_construction(s: &str) -> Result<CovarianceConstruction> {
    match s.to_lowercase().as_str() {
        "beta-adjusted" | "beta_adjusted" => Ok(CovarianceConstruction::BetaAdjusted),
        "legacy" => Ok(CovarianceConstruction::Legacy),
        other => anyhow::bail!("Unknown covariance construction: {other}"),
    }
}

impl WindowArgs {
    fn config(&self) -> Result<OptimizeConfig> {
        let current_date = match self.date {
            Some(ref d) => parse_date(d)?,
            None => Local::now().date_naive(),
        };

        let mut config = OptimizeConfig::for_date(current_date)
            .with_window_days(parse_window_days(&self.window)?)
            .with_benchmark(self.benchmark.clone());
        config.since = self.since.as_deref().map(parse_date).transpose()?;
        config.estimator.construction = parse_construction(&self.covariance)?;

        Ok(config)
    }
}
