//! Workbook I/O for the reconciliation engine.
//!
//! Input workbooks are spreadsheet files read through calamine or sheet
//! directories (one CSV per sheet). All outputs are sheet directories written
//! with an atomic temp-file-and-rename discipline.

pub mod clean;
pub mod discovery;
pub mod error;
pub mod sheet_dir;
pub mod spreadsheet;
pub mod workbook;

pub use clean::{normalize_cell, normalize_header, unique_headers};
pub use discovery::{
    SHEET_DIR_EXTENSION, list_input_workbooks, list_processed_workbooks, processed_output_path,
};
pub use error::{IngestError, Result};
pub use sheet_dir::SheetDir;
pub use spreadsheet::SpreadsheetWorkbook;
pub use workbook::{WorkbookReader, WorkbookWriter, open_workbook};
