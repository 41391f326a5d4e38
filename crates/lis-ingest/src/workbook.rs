//! Reader and writer seams over workbook containers.

use std::path::Path;

use lis_model::Table;

use crate::discovery::{SHEET_DIR_EXTENSION, has_extension};
use crate::error::{IngestError, Result};
use crate::sheet_dir::SheetDir;
use crate::spreadsheet::{SPREADSHEET_EXTENSIONS, SpreadsheetWorkbook};

/// Read access to a workbook of named tables.
pub trait WorkbookReader {
    fn path(&self) -> &Path;

    /// Sheet names in workbook order, without parsing any sheet.
    fn sheet_names(&self) -> Result<Vec<String>>;

    fn read_sheet(&mut self, name: &str) -> Result<Table>;

    fn has_sheet(&self, name: &str) -> Result<bool> {
        Ok(self.sheet_names()?.iter().any(|sheet| sheet == name))
    }
}

/// Write access to a workbook.
///
/// Sheets named in `sheets` replace same-named sheets; every other sheet
/// already present is preserved.
pub trait WorkbookWriter {
    fn write_sheets(&self, sheets: &[(&str, &Table)]) -> Result<()> {
        self.replace_sheets(sheets, &[])
    }

    /// Writes `sheets` and deletes each sheet named in `remove` as one
    /// locked update. Removing a sheet that does not exist is not an error.
    fn replace_sheets(&self, sheets: &[(&str, &Table)], remove: &[&str]) -> Result<()>;
}

/// Opens a workbook by path, choosing the container by extension.
pub fn open_workbook(path: &Path) -> Result<Box<dyn WorkbookReader>> {
    if path.is_dir() && has_extension(path, &[SHEET_DIR_EXTENSION]) {
        return Ok(Box::new(SheetDir::open(path)?));
    }
    if path.is_file() && has_extension(path, SPREADSHEET_EXTENSIONS) {
        return Ok(Box::new(SpreadsheetWorkbook::open(path)?));
    }
    Err(IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}
