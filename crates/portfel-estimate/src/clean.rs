//! Row filtering and gap filling for a windowed price table.

use portfel_traits::PriceTable;

/// Keeps only rows with at least `min_values` non-missing prices.
///
/// A row with no prices at all is always dropped, even when `min_values` is 0.
pub fn drop_sparse_rows(table: &PriceTable, min_values: usize) -> PriceTable {
    let threshold = min_values.max(1);
    let keep: Vec<usize> = table
        .prices()
        .rows()
        .into_iter()
        .enumerate()
        .filter(|(_, row)| row.iter().filter(|v| v.is_finite()).count() >= threshold)
        .map(|(i, _)| i)
        .collect();

    table.select_rows(&keep)
}

/// Pads every gap with the most recent earlier price in the same column.
///
/// Values before a column's first observation stay missing.
pub fn forward_fill(table: &PriceTable) -> PriceTable {
    table.map_prices(|mut prices| {
        for mut column in prices.columns_mut() {
            let mut last: Option<f64> = None;
            for value in column.iter_mut() {
                if value.is_finite() {
                    last = Some(*value);
                } else if let Some(prev) = last {
                    *value = prev;
                }
            }
        }
    })
}

/// Drops sparse rows, then forward-fills what is left.
pub fn clean_window(table: &PriceTable, min_values: usize) -> PriceTable {
    forward_fill(&drop_sparse_rows(table, min_values))
}
