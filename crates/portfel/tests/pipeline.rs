//! End-to-end run from a CSV file to artifacts.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use portfel::data::CsvPriceLoader;
use portfel::optimize::ConicSolver;
use portfel::{
    AllocationTable, COVARIANCE_FILE, Date, FRONTIER_FILE, OptimizeConfig, PortfelError,
    PortfolioOptimizer, WEIGHTS_FILE, WindowPreset, read_weights, write_artifacts,
};

const TICKERS: [&str; 4] = ["MOEX.ME", "SBER.ME", "GAZP.ME", "LKOH.ME"];

/// Deterministic pseudo-random return in [-0.01, 0.01).
fn shock(t: usize, salt: usize) -> f64 {
    let mut z = (t as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (salt as u64 + 1).wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    ((z >> 11) as f64 / (1_u64 << 53) as f64 - 0.5) * 0.02
}

/// Weekday prices from 2023-01-02 for about two years, with a few holes.
fn write_prices(dir: &tempfile::TempDir) -> PathBuf {
    let mut csv = format!("Date,{}\n", TICKERS.join(","));
    let mut prices = [3000.0, 250.0, 160.0, 6500.0];
    let betas = [1.0, 1.3, 0.8, 0.9];
    let drifts = [0.0, 0.0008, -0.0002, 0.0004];

    let mut date = Date::from_ymd_opt(2023, 1, 2).unwrap();
    for t in 0..520 {
        let m = shock(t, 0);
        for j in 0..TICKERS.len() {
            let idio = if j == 0 { 0.0 } else { 0.4 * shock(t, j) };
            prices[j] *= 1.0 + drifts[j] + betas[j] * m + idio;
        }

        write!(csv, "{}", date.format("%Y-%m-%d")).unwrap();
        for (j, price) in prices.iter().enumerate() {
            if j == 2 && t % 37 == 5 {
                csv.push(',');
            } else {
                write!(csv, ",{price:.4}").unwrap();
            }
        }
        csv.push('\n');

        date = date.succ_opt().unwrap();
        if date.format("%a").to_string() == "Sat" {
            date = date.succ_opt().unwrap().succ_opt().unwrap();
        }
    }

    let path = dir.path().join("data.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn optimizer(dir: &tempfile::TempDir) -> PortfolioOptimizer<ConicSolver> {
    let prices = CsvPriceLoader::new(write_prices(dir)).load().unwrap();
    PortfolioOptimizer::with_default_solver(prices)
}

fn config() -> OptimizeConfig {
    OptimizeConfig::for_date(Date::from_ymd_opt(2024, 6, 28).unwrap())
        .with_window_days(WindowPreset::OneYear.days())
}

#[test]
fn test_csv_to_estimate() {
    let dir = tempfile::tempdir().unwrap();
    let optimizer = optimizer(&dir);

    assert_eq!(optimizer.tickers(), &TICKERS);

    let estimate = optimizer.estimate(&config()).unwrap();
    assert_eq!(estimate.tickers, vec!["SBER.ME", "GAZP.ME", "LKOH.ME"]);

    let cov = &estimate.covariance;
    for i in 0..cov.nrows() {
        for j in 0..cov.ncols() {
            assert_relative_eq!(cov[[i, j]], cov[[j, i]], epsilon = 1e-15);
        }
    }

    let sber = &estimate.exposures[0];
    assert!((sber.exposure.beta - 1.3).abs() < 0.2);
}

#[test]
fn test_optimize_with_reachable_target() {
    let dir = tempfile::tempdir().unwrap();
    let optimizer = optimizer(&dir);

    let estimate = optimizer.estimate(&config()).unwrap();
    let problem = estimate.to_problem(Default::default()).unwrap();
    let max_var = (0..problem.n_assets())
        .map(|i| problem.covariance()[[i, i]])
        .fold(0.0_f64, f64::max);

    // Somewhere strictly inside the frontier
    let target = 0.9 * max_var.sqrt();
    let report = optimizer
        .optimize(&config().with_target_volatility(target))
        .unwrap();

    assert_relative_eq!(report.allocation.total(), 1.0, epsilon = 1e-4);
    assert!(report.performance.volatility <= target + 1e-4);
    assert!(report.allocation.weights().iter().all(|tw| tw.weight >= 0.0));

    let summary = serde_json::to_value(report.summary(0.02)).unwrap();
    assert!(summary["weights"].is_array());
    assert_eq!(summary["end"], "2024-06-28");
}

#[test]
fn test_artifacts_written() {
    let dir = tempfile::tempdir().unwrap();
    let optimizer = optimizer(&dir);
    let config = config();

    let report = optimizer.optimize(&config).unwrap();
    let frontier = optimizer.frontier(&config, 15).unwrap();

    let out = dir.path().join("out");
    let paths = write_artifacts(&out, &report, &frontier, config.display_threshold).unwrap();

    assert_eq!(paths.frontier, out.join(FRONTIER_FILE));
    let frontier_csv = fs::read_to_string(&paths.frontier).unwrap();
    assert!(frontier_csv.starts_with("volatility,expected_return,sharpe_ratio,chosen"));
    assert_eq!(frontier_csv.lines().count(), frontier.len() + 2);

    let covariance_csv = fs::read_to_string(out.join(COVARIANCE_FILE)).unwrap();
    assert!(covariance_csv.starts_with("ticker,SBER.ME,GAZP.ME,LKOH.ME"));
    assert_eq!(covariance_csv.lines().count(), 4);

    let weights_csv = fs::read_to_string(out.join(WEIGHTS_FILE)).unwrap();
    assert!(weights_csv.starts_with("ticker,weight"));

    let saved = read_weights(&paths.weights).unwrap();
    let significant = report.allocation.significant(config.display_threshold);
    assert_eq!(saved.len(), significant.len());
    for tw in significant {
        assert_relative_eq!(saved.weight(&tw.ticker).unwrap(), tw.weight, epsilon = 1e-9);
    }
}

#[test]
fn test_allocation_table_tracks_runs() {
    let dir = tempfile::tempdir().unwrap();
    let optimizer = optimizer(&dir);
    let mut table = AllocationTable::new(optimizer.tickers());

    let first = optimizer.optimize(&config()).unwrap();
    table.apply(&first.allocation);
    let second = optimizer
        .optimize(&config().with_window_days(WindowPreset::SixMonths.days()))
        .unwrap();
    table.apply(&second.allocation);

    for row in table.rows() {
        if let Some(weight) = second.allocation.weight(&row.ticker) {
            let before = first.allocation.weight(&row.ticker).unwrap_or(0.0);
            assert_relative_eq!(row.weight, weight);
            assert_relative_eq!(row.change, weight - before, epsilon = 1e-12);
        }
    }
    assert!(table.rows().windows(2).all(|w| w[0].weight >= w[1].weight));
    assert_eq!(table.row("MOEX.ME").unwrap().weight, 0.0);
}

#[test]
fn test_window_before_data_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let optimizer = optimizer(&dir);
    let config = OptimizeConfig::for_date(Date::from_ymd_opt(2020, 1, 1).unwrap());

    assert!(matches!(
        optimizer.optimize(&config),
        Err(PortfelError::InsufficientData(_))
    ));
}

#[test]
fn test_missing_benchmark_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let optimizer = optimizer(&dir);

    assert!(matches!(
        optimizer.estimate(&config().with_benchmark("IMOEX")),
        Err(PortfelError::MissingColumn(_))
    ));
}
