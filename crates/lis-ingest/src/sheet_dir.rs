//! Sheet directories: one CSV file per sheet inside a `<name>.sheets`
//! directory.
//!
//! Each write holds an exclusive advisory lock on the directory's `.lock`
//! file, writes every sheet to `<sheet>.csv.tmp`, syncs it and renames it over
//! `<sheet>.csv`. A half-written sheet therefore never carries the `.csv`
//! extension. The OS drops the lock when its holder exits, so a `.lock` file
//! left behind by a killed writer does not block later writes.

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use lis_model::{CellValue, Row, Table};

use crate::clean::{normalize_cell, unique_headers};
use crate::error::{IngestError, Result};
use crate::workbook::{WorkbookReader, WorkbookWriter};

const SHEET_FILE_EXTENSION: &str = "csv";
const LOCK_FILE_NAME: &str = ".lock";

#[derive(Debug, Clone)]
pub struct SheetDir {
    path: PathBuf,
}

impl SheetDir {
    /// Opens an existing sheet directory for reading.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(IngestError::DirectoryNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self::at(path))
    }

    /// Handle for a sheet directory that may not exist yet.
    pub fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.path
            .join(format!("{}.{SHEET_FILE_EXTENSION}", sheet_file_stem(sheet)))
    }

    fn write_sheet(&self, sheet: &str, table: &Table) -> Result<()> {
        let target = self.sheet_path(sheet);
        let temp_path = target.with_extension("csv.tmp");
        let file = File::create(&temp_path).map_err(|e| write_error("create", &temp_path, e))?;
        let mut writer = WriterBuilder::new().from_writer(file);
        let csv_error = |source: csv::Error| IngestError::Csv {
            path: temp_path.clone(),
            source,
        };
        writer.write_record(table.columns()).map_err(csv_error)?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(CellValue::render))
                .map_err(csv_error)?;
        }
        let file = writer.into_inner().map_err(|e| IngestError::Io {
            operation: "flush",
            path: temp_path.clone(),
            source: e.into_error(),
        })?;
        file.sync_all().map_err(|e| IngestError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source: e,
        })?;
        drop(file);
        fs::rename(&temp_path, &target).map_err(|e| IngestError::WriteConflict {
            path: target.clone(),
            source: e,
        })?;
        tracing::debug!(
            path = %target.display(),
            rows = table.len(),
            "wrote sheet"
        );
        Ok(())
    }

    fn remove_sheet(&self, sheet: &str) -> Result<()> {
        let target = self.sheet_path(sheet);
        match fs::remove_file(&target) {
            Ok(()) => {
                tracing::debug!(path = %target.display(), "removed sheet");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(write_error("remove", &target, e)),
        }
    }
}

impl WorkbookReader for SheetDir {
    fn path(&self) -> &Path {
        &self.path
    }

    fn sheet_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.path).map_err(|e| IngestError::DirectoryRead {
            path: self.path.clone(),
            source: e,
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IngestError::DirectoryRead {
                path: self.path.clone(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_sheet = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SHEET_FILE_EXTENSION));
            if let (true, Some(stem)) = (is_sheet, path.file_stem().and_then(|s| s.to_str())) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_sheet(&mut self, name: &str) -> Result<Table> {
        let path = self.sheet_path(name);
        if !path.is_file() {
            return Err(IngestError::SheetNotFound {
                path: self.path.clone(),
                sheet: name.to_string(),
            });
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| IngestError::Csv {
                path: path.clone(),
                source: e,
            })?;
        let mut records = reader.records();
        let Some(header) = records.next() else {
            return Ok(Table::default());
        };
        let header = header.map_err(|e| IngestError::Csv {
            path: path.clone(),
            source: e,
        })?;
        let header: Vec<&str> = header.iter().collect();
        let mut table = Table::new(unique_headers(&header));
        for record in records {
            let record = record.map_err(|e| IngestError::Csv {
                path: path.clone(),
                source: e,
            })?;
            let row: Row = record
                .iter()
                .map(|value| CellValue::text(normalize_cell(value)))
                .collect();
            if row.iter().all(CellValue::is_blank) {
                continue;
            }
            table.push_row(row);
        }
        Ok(table)
    }
}

impl WorkbookWriter for SheetDir {
    fn replace_sheets(&self, sheets: &[(&str, &Table)], remove: &[&str]) -> Result<()> {
        fs::create_dir_all(&self.path).map_err(|e| write_error("create directory", &self.path, e))?;
        let _lock = DirLock::acquire(&self.path)?;
        for (name, table) in sheets {
            self.write_sheet(name, table)?;
        }
        for name in remove {
            self.remove_sheet(name)?;
        }
        tracing::info!(
            path = %self.path.display(),
            sheets = sheets.len(),
            removed = remove.len(),
            "saved workbook"
        );
        Ok(())
    }
}

/// Exclusive writer lock, released on drop or when the process exits.
struct DirLock {
    file: File,
    path: PathBuf,
}

impl DirLock {
    fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| write_error("open lock", &path, e))?;
        match file.try_lock() {
            Ok(()) => Ok(Self { file, path }),
            Err(TryLockError::WouldBlock) => Err(IngestError::WriteConflict {
                path: dir.to_path_buf(),
                source: io::Error::new(ErrorKind::WouldBlock, "locked by another writer"),
            }),
            Err(TryLockError::Error(e)) => Err(write_error("lock", &path, e)),
        }
    }
}

// The lock file itself stays: unlinking it while another writer has it open
// would let two writers lock different inodes.
impl Drop for DirLock {
    fn drop(&mut self) {
        if let Err(error) = self.file.unlock() {
            tracing::warn!(path = %self.path.display(), %error, "failed to release workbook lock");
        }
    }
}

fn write_error(operation: &'static str, path: &Path, source: std::io::Error) -> IngestError {
    if source.kind() == ErrorKind::PermissionDenied {
        IngestError::WriteConflict {
            path: path.to_path_buf(),
            source,
        }
    } else {
        IngestError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

fn sheet_file_stem(sheet: &str) -> String {
    sheet
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\' | ':') { '_' } else { ch })
        .collect()
}
