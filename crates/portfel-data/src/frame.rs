//! Conversion between polars DataFrames and [`PriceTable`].

use chrono::NaiveDate;
use ndarray::Array2;
use polars::prelude::*;
use portfel_traits::{Date, PortfelError, PriceTable, Result};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// Date format used when dates are stored as text.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds a [`PriceTable`] from a wide DataFrame.
///
/// The frame must contain `date_column` (either a polars `Date` column or
/// text in `date_format`); every other column is read as a ticker's prices.
/// Nulls and values that cannot be read as numbers become `NaN`.
///
/// # Errors
///
/// Returns [`PortfelError::MissingColumn`] if the date column is absent and
/// [`PortfelError::InvalidDate`] if a date cannot be parsed.
pub fn price_table_from_frame(
    df: &DataFrame,
    date_column: &str,
    date_format: &str,
) -> Result<PriceTable> {
    let date_col = df
        .column(date_column)
        .map_err(|_| PortfelError::MissingColumn(date_column.to_string()))?;
    let dates = parse_dates(date_col.as_materialized_series(), date_format)?;

    let price_columns: Vec<&Column> = df
        .get_columns()
        .iter()
        .filter(|c| c.name().as_str() != date_column)
        .collect();

    let tickers: Vec<String> = price_columns
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut prices = Array2::from_elem((dates.len(), tickers.len()), f64::NAN);
    for (j, column) in price_columns.iter().enumerate() {
        let values = column
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        for (i, value) in values.f64()?.into_iter().enumerate() {
            if let Some(v) = value {
                prices[[i, j]] = v;
            }
        }
    }

    PriceTable::new(dates, tickers, prices)
}

fn parse_dates(series: &Series, date_format: &str) -> Result<Vec<Date>> {
    match series.dtype() {
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            days.i32()?
                .into_iter()
                .map(|d| {
                    d.and_then(|d| NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_CE_DAYS))
                        .ok_or_else(|| {
                            PortfelError::InvalidDate("null or out-of-range date".to_string())
                        })
                })
                .collect()
        }
        DataType::String => series
            .str()?
            .into_iter()
            .map(|s| {
                let s = s.ok_or_else(|| PortfelError::InvalidDate("empty date".to_string()))?;
                NaiveDate::parse_from_str(s.trim(), date_format)
                    .map_err(|e| PortfelError::InvalidDate(format!("{s}: {e}")))
            })
            .collect(),
        other => Err(PortfelError::InvalidData(format!(
            "date column has unsupported type {other}"
        ))),
    }
}
