use std::path::PathBuf;

use thiserror::Error;

use crate::role::SemanticRole;

/// Failures of the reconciliation engine.
///
/// A sheet with zero qualifying rows is not represented here; it is a
/// successful outcome reported as [`crate::SheetStatus::Empty`].
#[derive(Debug, Error)]
pub enum LisError {
    /// A source workbook lacks a raw sheet the canonical sheet is built from.
    #[error("source workbook has no sheet '{sheet}'")]
    MissingRequiredSheet { sheet: String },

    /// No column of the source table matches a role the target schema requires.
    #[error("no column in '{table}' matches required role {role}")]
    MissingRequiredRole { role: SemanticRole, table: String },

    /// The output is locked or could not be replaced.
    #[error("cannot write {path}: output is in use or not replaceable ({source})")]
    WriteConflict {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LisError>;
