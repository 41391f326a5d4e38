//! Raw source sheets of one input workbook.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lis_ingest::WorkbookReader;
use lis_model::{LisError, Result, SourceSheet, Table};
use tracing::{debug, warn};

const SOURCE_SHEETS: [SourceSheet; 5] = [
    SourceSheet::Outpatient,
    SourceSheet::Inpatient,
    SourceSheet::Medication,
    SourceSheet::Examination,
    SourceSheet::Statistics,
];

/// The known source sheets of one workbook, read once.
///
/// A sheet that is present but unreadable is remembered with its error, so
/// only the canonical sheets built from it fail.
#[derive(Debug, Default)]
pub struct SourceTables {
    path: PathBuf,
    tables: HashMap<SourceSheet, Table>,
    unreadable: HashMap<SourceSheet, String>,
}

impl SourceTables {
    pub fn read(reader: &mut dyn WorkbookReader) -> Result<Self> {
        let path = reader.path().to_path_buf();
        let names = reader.sheet_names()?;
        let mut sources = Self {
            path,
            ..Self::default()
        };
        for sheet in SOURCE_SHEETS {
            if !names.iter().any(|name| name.trim() == sheet.sheet_name()) {
                debug!(sheet = sheet.sheet_name(), "source sheet absent");
                continue;
            }
            match reader.read_sheet(sheet.sheet_name()) {
                Ok(table) => {
                    debug!(sheet = sheet.sheet_name(), rows = table.len(), "read source sheet");
                    sources.tables.insert(sheet, table);
                }
                Err(error) => {
                    warn!(sheet = sheet.sheet_name(), %error, "source sheet unreadable");
                    sources.unreadable.insert(sheet, error.to_string());
                }
            }
        }
        Ok(sources)
    }

    /// Builds a source set from in-memory tables.
    pub fn from_tables(path: &Path, tables: impl IntoIterator<Item = (SourceSheet, Table)>) -> Self {
        Self {
            path: path.to_path_buf(),
            tables: tables.into_iter().collect(),
            unreadable: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, sheet: SourceSheet) -> bool {
        self.tables.contains_key(&sheet)
    }

    /// The sheet, or the reason it cannot be used.
    pub fn require(&self, sheet: SourceSheet) -> Result<&Table> {
        if let Some(table) = self.tables.get(&sheet) {
            return Ok(table);
        }
        match self.unreadable.get(&sheet) {
            Some(message) => Err(LisError::Workbook {
                path: self.path.clone(),
                message: message.clone(),
            }),
            None => Err(LisError::MissingRequiredSheet {
                sheet: sheet.sheet_name().to_string(),
            }),
        }
    }

    pub fn optional(&self, sheet: SourceSheet) -> Option<&Table> {
        self.tables.get(&sheet)
    }
}
