//! Per-sheet, per-file and per-phase outcomes aggregated into reports.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sheet::SheetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetStatus {
    Success,
    /// Zero qualifying rows. The sheet is still written, header-only.
    Empty,
    Failed,
}

impl SheetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SheetStatus::Success => "success",
            SheetStatus::Empty => "empty",
            SheetStatus::Failed => "failed",
        }
    }

    pub fn is_ok(self) -> bool {
        !matches!(self, SheetStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Partial,
    Failed,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Success => "success",
            FileStatus::Partial => "partial",
            FileStatus::Failed => "failed",
        }
    }

    /// Success when nothing failed, failed when nothing succeeded.
    pub fn from_counts(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) if succeeded > 0 => FileStatus::Success,
            (0, _) => FileStatus::Failed,
            _ => FileStatus::Partial,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetOutcome {
    pub sheet: SheetKind,
    pub status: SheetStatus,
    pub rows: usize,
    pub dropped_duplicates: usize,
    pub error: Option<String>,
}

impl SheetOutcome {
    pub fn written(sheet: SheetKind, rows: usize, dropped_duplicates: usize) -> Self {
        let status = if rows == 0 {
            SheetStatus::Empty
        } else {
            SheetStatus::Success
        };
        Self {
            sheet,
            status,
            rows,
            dropped_duplicates,
            error: None,
        }
    }

    pub fn failed(sheet: SheetKind, error: impl Into<String>) -> Self {
        Self {
            sheet,
            status: SheetStatus::Failed,
            rows: 0,
            dropped_duplicates: 0,
            error: Some(error.into()),
        }
    }

    /// Marks a built sheet as failed, e.g. when it could not be persisted.
    /// An already failed sheet keeps its own error.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_ok() {
            self.status = SheetStatus::Failed;
            self.error = Some(error.into());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    pub sheets: Vec<SheetOutcome>,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn from_sheets(input: PathBuf, output: Option<PathBuf>, sheets: Vec<SheetOutcome>) -> Self {
        let succeeded = sheets.iter().filter(|sheet| sheet.status.is_ok()).count();
        let failed = sheets.len() - succeeded;
        Self {
            input,
            output,
            status: FileStatus::from_counts(succeeded, failed),
            sheets,
            error: None,
        }
    }

    /// A file that could not be processed at all (unreadable, unwritable).
    pub fn failed(input: PathBuf, error: impl Into<String>) -> Self {
        Self {
            input,
            output: None,
            status: FileStatus::Failed,
            sheets: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// An input whose processed workbook already existed and was left alone.
    pub fn skipped(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output: Some(output),
            status: FileStatus::Success,
            sheets: Vec::new(),
            error: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }

    pub fn succeeded_sheets(&self) -> usize {
        self.sheets.iter().filter(|sheet| sheet.status.is_ok()).count()
    }

    pub fn failed_sheets(&self) -> usize {
        self.sheets.len() - self.succeeded_sheets()
    }
}

/// Outcome of phase 2: every input file of one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub files: Vec<FileOutcome>,
    pub report_path: Option<PathBuf>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|file| file.status == status).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(FileStatus::Success)
    }

    pub fn partial(&self) -> usize {
        self.count(FileStatus::Partial)
    }

    pub fn failed(&self) -> usize {
        self.count(FileStatus::Failed)
    }

    /// Files that produced at least one sheet.
    pub fn processed(&self) -> usize {
        self.succeeded() + self.partial()
    }

    /// Share of fully successful files, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.files.is_empty() {
            0.0
        } else {
            self.succeeded() as f64 * 100.0 / self.files.len() as f64
        }
    }

    pub fn has_success(&self) -> bool {
        self.processed() > 0
    }

    /// Processed workbooks, in input order.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|file| file.status != FileStatus::Failed)
            .filter_map(|file| file.output.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSheetOutcome {
    pub sheet: SheetKind,
    pub status: SheetStatus,
    pub rows: usize,
    pub contributing_files: usize,
    pub error: Option<String>,
}

/// Outcome of phase 3: one consolidated workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub sheets: Vec<MergeSheetOutcome>,
    pub report_path: Option<PathBuf>,
}

impl MergeReport {
    pub fn merged_sheets(&self) -> usize {
        self.sheets.iter().filter(|sheet| sheet.status.is_ok()).count()
    }

    pub fn failed_sheets(&self) -> usize {
        self.sheets.len() - self.merged_sheets()
    }

    pub fn has_success(&self) -> bool {
        self.merged_sheets() > 0
    }

    pub fn status(&self) -> FileStatus {
        FileStatus::from_counts(self.merged_sheets(), self.failed_sheets())
    }
}
