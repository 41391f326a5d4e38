//! Time normalizer.
//!
//! Rewrites every date-role column to plain text: `YYYY-MM-DD` for midnight
//! timestamps, `YYYY-MM-DD HH:MM:SS` otherwise, and "" for anything that does
//! not parse. Running it on its own output changes nothing.

use lis_map::contains_keyword;
use lis_model::{CellValue, DATE_COLUMN_KEYWORDS, Table};

use crate::datetime::{format_timestamp, parse_timestamp};

/// Indices of columns whose name contains a date-role keyword.
pub fn date_columns(header: &[String]) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .filter(|(_, column)| {
            DATE_COLUMN_KEYWORDS
                .iter()
                .any(|keyword| contains_keyword(column, keyword))
        })
        .map(|(index, _)| index)
        .collect()
}

pub fn normalize_time_value(value: &CellValue) -> CellValue {
    CellValue::Text(parse_timestamp(value).map(format_timestamp).unwrap_or_default())
}

/// Normalizes the date-role columns of `table` in place and returns how
/// many columns were rewritten.
pub fn normalize_times(table: &mut Table) -> usize {
    let targets = date_columns(table.columns());
    for row in table.rows_mut() {
        for index in &targets {
            if let Some(cell) = row.get_mut(*index) {
                *cell = normalize_time_value(cell);
            }
        }
    }
    targets.len()
}
