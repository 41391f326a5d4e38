//! Spreadsheet files (xlsx, xlsm, xls, ods) read through calamine.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Sheets, open_workbook_auto};
use lis_model::{CellValue, Row, Table, excel_serial_to_datetime};

use crate::clean::{normalize_cell, unique_headers};
use crate::error::{IngestError, Result};
use crate::workbook::WorkbookReader;

pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// A read-only spreadsheet workbook. The first row of each sheet is its header.
pub struct SpreadsheetWorkbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl SpreadsheetWorkbook {
    pub fn open(path: &Path) -> Result<Self> {
        let sheets = open_workbook_auto(path).map_err(|e| IngestError::Spreadsheet {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }
}

impl WorkbookReader for SpreadsheetWorkbook {
    fn path(&self) -> &Path {
        &self.path
    }

    fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.sheets.sheet_names())
    }

    fn read_sheet(&mut self, name: &str) -> Result<Table> {
        if !self.has_sheet(name)? {
            return Err(IngestError::SheetNotFound {
                path: self.path.clone(),
                sheet: name.to_string(),
            });
        }
        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| IngestError::Spreadsheet {
                path: self.path.clone(),
                message: format!("sheet '{name}': {e}"),
            })?;
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Table::default());
        };
        let header: Vec<String> = header.iter().map(header_text).collect();
        let mut table = Table::new(unique_headers(&header));
        for raw in rows {
            let row: Row = raw.iter().map(cell_value).collect();
            if row.iter().all(CellValue::is_blank) {
                continue;
            }
            table.push_row(row);
        }
        tracing::debug!(
            path = %self.path.display(),
            sheet = name,
            rows = table.len(),
            columns = table.columns().len(),
            "read spreadsheet sheet"
        );
        Ok(table)
    }
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        CellValue::Null => String::new(),
        value => value.render(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::String(value) => CellValue::text(normalize_cell(value)),
        Data::Bool(value) => CellValue::Text(value.to_string()),
        Data::DateTime(value) => excel_serial_to_datetime(value.as_f64())
            .map_or(CellValue::Null, CellValue::DateTime),
        Data::DateTimeIso(value) | Data::DurationIso(value) => CellValue::text(normalize_cell(value)),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}
