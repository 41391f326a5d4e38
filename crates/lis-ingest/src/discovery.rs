//! Input and intermediate workbook discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::spreadsheet::SPREADSHEET_EXTENSIONS;

/// Extension of sheet directories.
pub const SHEET_DIR_EXTENSION: &str = "sheets";

const PROCESSED_SUFFIX: &str = "_processed";
const REPORT_STEMS: &[&str] = &["batch_process_report", "merge_report"];

/// Case-insensitive extension check.
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        paths.push(entry.path());
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Lists raw input workbooks in a directory.
///
/// Spreadsheet files and sheet directories qualify. Processed outputs,
/// reports and office lock files (`~$...`) are skipped. Sorted by file name.
pub fn list_input_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in read_dir_sorted(dir)? {
        let Some(stem) = file_stem(&path) else {
            continue;
        };
        if stem.starts_with("~$")
            || stem.ends_with(PROCESSED_SUFFIX)
            || REPORT_STEMS.contains(&stem)
        {
            continue;
        }
        let is_spreadsheet = path.is_file() && has_extension(&path, SPREADSHEET_EXTENSIONS);
        let is_sheet_dir = path.is_dir() && has_extension(&path, &[SHEET_DIR_EXTENSION]);
        if is_spreadsheet || is_sheet_dir {
            inputs.push(path);
        }
    }
    Ok(inputs)
}

/// Lists `*_processed.sheets` workbooks in a directory, sorted by file name.
pub fn list_processed_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(read_dir_sorted(dir)?
        .into_iter()
        .filter(|path| path.is_dir() && has_extension(path, &[SHEET_DIR_EXTENSION]))
        .filter(|path| file_stem(path).is_some_and(|stem| stem.ends_with(PROCESSED_SUFFIX)))
        .collect())
}

/// `{output_dir}/{input stem}_processed.sheets`.
pub fn processed_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = file_stem(input).unwrap_or("workbook");
    output_dir.join(format!("{stem}{PROCESSED_SUFFIX}.{SHEET_DIR_EXTENSION}"))
}
