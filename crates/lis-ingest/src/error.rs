//! Error types for workbook reading and writing.

use std::path::PathBuf;

use lis_model::LisError;
use thiserror::Error;

/// Errors that can occur while reading or writing workbooks.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path is neither a spreadsheet file nor a sheet directory.
    #[error("unsupported workbook format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Spreadsheet container could not be opened or parsed.
    #[error("failed to read spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// A sheet file could not be parsed as CSV.
    #[error("failed to parse sheet {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Requested sheet does not exist in the workbook.
    #[error("workbook {path} has no sheet '{sheet}'")]
    SheetNotFound { path: PathBuf, sheet: String },

    /// Another writer holds the workbook, or the target is not writable.
    #[error("workbook {path} is locked or not writable: {source}")]
    WriteConflict {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure during a named operation.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

impl From<IngestError> for LisError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::SheetNotFound { sheet, .. } => LisError::MissingRequiredSheet { sheet },
            IngestError::WriteConflict { path, source } => LisError::WriteConflict { path, source },
            IngestError::Io { path, source, .. } | IngestError::DirectoryRead { path, source } => {
                LisError::Io { path, source }
            }
            IngestError::DirectoryNotFound { ref path }
            | IngestError::UnsupportedFormat { ref path }
            | IngestError::Spreadsheet { ref path, .. }
            | IngestError::Csv { ref path, .. } => LisError::Workbook {
                path: path.clone(),
                message: error.to_string(),
            },
        }
    }
}
