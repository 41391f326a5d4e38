//! Table merger.
//!
//! Unions one canonical sheet across processed workbooks, tags provenance and
//! deduplicates on a best-effort identifier column.

use std::collections::HashSet;

use lis_model::{CellValue, PROVENANCE_COLUMNS, Row, Table, columns, redact_value};
use tracing::{debug, info};

const IDENTIFIER_MARKERS: &[&str] = &["id", "编号", "标识"];

/// One contributing table and the file it came from.
#[derive(Debug, Clone)]
pub struct MergeInput {
    pub source: String,
    pub table: Table,
}

impl MergeInput {
    pub fn new(source: impl Into<String>, table: Table) -> Self {
        Self {
            source: source.into(),
            table,
        }
    }
}

/// First column whose lowercased name contains an identifier marker.
/// Provenance columns never qualify.
pub fn identifier_column(header: &[String]) -> Option<&str> {
    header
        .iter()
        .filter(|column| !PROVENANCE_COLUMNS.contains(&column.as_str()))
        .find(|column| {
            let lower = column.to_lowercase();
            IDENTIFIER_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .map(String::as_str)
}

fn merged_header(schema: &[&str], inputs: &[MergeInput]) -> Vec<String> {
    let mut header: Vec<String> = schema.iter().map(|column| (*column).to_string()).collect();
    for input in inputs {
        for column in input.table.columns() {
            if !PROVENANCE_COLUMNS.contains(&column.as_str()) && !header.contains(column) {
                header.push(column.clone());
            }
        }
    }
    header.extend(PROVENANCE_COLUMNS.iter().map(|column| (*column).to_string()));
    header
}

fn row_signature(row: &[CellValue], content_columns: usize) -> String {
    row.iter()
        .take(content_columns)
        .map(CellValue::render)
        .collect::<Vec<_>>()
        .join("\u{1f}")
}

/// Concatenates `inputs` in order onto `schema` plus any extra columns seen,
/// then appends provenance. Rows sharing an identifier keep their first
/// occurrence; blank identifiers are never merged away. Without an
/// identifier column, whole-row duplicates (ignoring provenance) are dropped.
pub fn merge_tables(schema: &[&str], inputs: Vec<MergeInput>, processed_at: &str) -> Table {
    let header = merged_header(schema, &inputs);
    let content_columns = header.len() - PROVENANCE_COLUMNS.len();
    let identifier = identifier_column(&header[..content_columns]).map(str::to_string);
    let identifier_idx = identifier
        .as_deref()
        .and_then(|name| header.iter().position(|column| column == name));
    let source_idx = header.iter().position(|column| column == columns::SOURCE_FILE);
    let updated_idx = header.iter().position(|column| column == columns::UPDATED_AT);

    let mut merged = Table::new(header.clone());
    let mut seen: HashSet<String> = HashSet::new();
    let mut total = 0usize;
    for input in inputs {
        let positions: Vec<Option<usize>> = header
            .iter()
            .map(|column| input.table.column_index(column))
            .collect();
        for source_row in input.table.rows() {
            total += 1;
            let mut row: Row = positions
                .iter()
                .map(|position| {
                    position
                        .and_then(|index| source_row.get(index).cloned())
                        .unwrap_or_default()
                })
                .collect();
            if let Some(index) = source_idx {
                row[index] = CellValue::from(input.source.as_str());
            }
            if let Some(index) = updated_idx {
                row[index] = CellValue::from(processed_at);
            }
            let key = match identifier_idx {
                Some(index) => row[index].trimmed(),
                None => Some(row_signature(&row, content_columns)),
            };
            if let Some(key) = key
                && !seen.insert(key.clone())
            {
                debug!(
                    identifier = redact_value(&key),
                    source = %input.source,
                    "dropped duplicate merged row"
                );
                continue;
            }
            merged.push_row(row);
        }
    }
    info!(
        identifier = identifier.as_deref().unwrap_or("<whole row>"),
        input_rows = total,
        rows = merged.len(),
        "merged table"
    );
    merged
}
