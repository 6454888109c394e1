//! Price data loading for portfel.
//!
//! This crate reads the wide daily-price CSV that drives the optimizer: a
//! `Date` column plus one column of prices per ticker, with empty cells for
//! missing quotes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use portfel_data::CsvPriceLoader;
//!
//! let table = CsvPriceLoader::new("data.csv").load().unwrap();
//!
//! for ticker in table.tickers() {
//!     println!("{ticker}");
//! }
//! ```
//!
//! # Environment Variables
//!
//! The `portfel` CLI reads the price file path from [`PRICES_ENV_VAR`]
//! (also picked up from a `.env` file) and falls back to
//! [`DEFAULT_PRICES_FILE`]:
//!
//! ```bash
//! PORTFEL_PRICES=/path/to/data.csv
//! ```

mod frame;
mod loader;

pub use frame::{DEFAULT_DATE_FORMAT, price_table_from_frame};
pub use loader::{
    CsvLayout, CsvPriceLoader, DEFAULT_PRICES_FILE, PRICES_ENV_VAR, read_csv, write_csv,
};
