//! CSV price file loader.

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use portfel_traits::{PortfelError, PriceTable, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::frame::{DEFAULT_DATE_FORMAT, price_table_from_frame};

/// Environment variable naming the default price file.
pub const PRICES_ENV_VAR: &str = "PORTFEL_PRICES";

/// Price file used when neither a path nor [`PRICES_ENV_VAR`] is given.
pub const DEFAULT_PRICES_FILE: &str = "data.csv";

/// Layout of a wide price CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvLayout {
    /// Name of the date column
    pub date_column: String,

    /// chrono format string for the date column
    pub date_format: String,

    /// Field separator
    pub separator: u8,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            separator: b',',
        }
    }
}

/// Reads a CSV with a date column plus one price column per ticker.
///
/// # Example
///
/// ```rust,no_run
/// use portfel_data::CsvPriceLoader;
///
/// let table = CsvPriceLoader::new("data.csv").load().unwrap();
/// println!("{} tickers, {} days", table.tickers().len(), table.len());
/// ```
#[derive(Debug, Clone)]
pub struct CsvPriceLoader {
    path: PathBuf,
    layout: CsvLayout,
}

impl CsvPriceLoader {
    /// Create a loader for the given file with the default layout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            layout: CsvLayout::default(),
        }
    }

    /// Override the CSV layout.
    #[must_use]
    pub fn with_layout(mut self, layout: CsvLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Path this loader reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw DataFrame without converting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn read_frame(&self) -> Result<DataFrame> {
        if !self.path.exists() {
            return Err(PortfelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("price file not found: {}", self.path.display()),
            )));
        }

        let df = read_csv_with(&self.path, self.layout.separator)?;

        debug!(
            path = %self.path.display(),
            rows = df.height(),
            columns = df.width(),
            "read price csv"
        );
        Ok(df)
    }

    /// Load the file into a [`PriceTable`] sorted by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the date column is
    /// missing, or a date cannot be parsed.
    pub fn load(&self) -> Result<PriceTable> {
        let df = self.read_frame()?;
        let table =
            price_table_from_frame(&df, &self.layout.date_column, &self.layout.date_format)?;

        info!(
            path = %self.path.display(),
            tickers = table.tickers().len(),
            days = table.len(),
            first = ?table.first_date(),
            last = ?table.last_date(),
            "loaded prices"
        );
        Ok(table)
    }
}

fn read_csv_with(path: &Path, separator: u8) -> Result<DataFrame> {
    Ok(CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?)
}

/// Read a comma-separated file with a header row.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    read_csv_with(path, b',')
}

/// Write a DataFrame to a CSV file with a header row.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}
