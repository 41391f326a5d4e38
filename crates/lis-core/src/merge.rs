//! Phase 3: consolidate processed workbooks into one.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use lis_ingest::{SHEET_DIR_EXTENSION, SheetDir, WorkbookReader, WorkbookWriter, open_workbook};
use lis_model::{MergeReport, MergeSheetOutcome, SheetKind, SheetStatus, Table};
use lis_transform::{MergeInput, merge_tables};
use tracing::{error, info, info_span, warn};

use crate::report::{MERGE_REPORT_NAME, merge_report_tables};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

struct OpenedInput {
    name: String,
    reader: Box<dyn WorkbookReader>,
}

fn open_inputs(inputs: &[PathBuf]) -> Vec<OpenedInput> {
    inputs
        .iter()
        .filter_map(|path| match open_workbook(path) {
            Ok(reader) => Some(OpenedInput {
                name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                reader,
            }),
            Err(open_error) => {
                warn!(file = %path.display(), error = %open_error, "skipping unreadable workbook");
                None
            }
        })
        .collect()
}

/// Reads one canonical sheet from every input that has it.
fn collect_sheet(
    kind: SheetKind,
    opened: &mut [OpenedInput],
) -> (Vec<MergeInput>, Vec<String>) {
    let mut tables = Vec::new();
    let mut errors = Vec::new();
    for input in opened.iter_mut() {
        let present = match input.reader.has_sheet(kind.sheet_name()) {
            Ok(present) => present,
            Err(read_error) => {
                errors.push(format!("{}: {read_error}", input.name));
                continue;
            }
        };
        if !present {
            continue;
        }
        match input.reader.read_sheet(kind.sheet_name()) {
            Ok(table) => tables.push(MergeInput::new(input.name.clone(), table)),
            Err(read_error) => {
                warn!(file = %input.name, error = %read_error, "sheet unreadable");
                errors.push(format!("{}: {read_error}", input.name));
            }
        }
    }
    (tables, errors)
}

/// The merged workbook is always a sheet directory: any other extension on
/// `output` is replaced by `.sheets`.
pub fn merged_output_path(output: &Path) -> PathBuf {
    let is_sheet_dir = output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SHEET_DIR_EXTENSION));
    if is_sheet_dir {
        output.to_path_buf()
    } else {
        output.with_extension(SHEET_DIR_EXTENSION)
    }
}

/// `merge_report.sheets` beside the merged output.
pub fn merge_report_path(output: &Path) -> PathBuf {
    output
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{MERGE_REPORT_NAME}.{SHEET_DIR_EXTENSION}"))
}

/// Merges every canonical sheet across `inputs` into `output` and writes
/// the merge report.
///
/// Every canonical sheet is written, header-only when no input contributes
/// rows. A sheet fails only when all inputs holding it were unreadable, and
/// is still written header-only; a failed write fails every sheet. `output`
/// is adjusted by [`merged_output_path`].
pub fn run_merge(inputs: &[PathBuf], output: &Path) -> Result<MergeReport> {
    let requested = output;
    let output = merged_output_path(requested);
    if output != requested {
        warn!(
            requested = %requested.display(),
            output = %output.display(),
            "merged workbook is a sheet directory; using .sheets extension"
        );
    }
    let output = output.as_path();
    let span = info_span!("merge", output = %output.display(), files = inputs.len());
    let _guard = span.enter();
    let start = Instant::now();
    let processed_at = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }

    let mut opened = open_inputs(inputs);
    let mut merged: Vec<(SheetKind, Table)> = Vec::new();
    let mut sheets: Vec<MergeSheetOutcome> = Vec::new();
    for kind in SheetKind::ALL {
        let (tables, errors) = collect_sheet(kind, &mut opened);
        if tables.is_empty() && !errors.is_empty() {
            sheets.push(MergeSheetOutcome {
                sheet: kind,
                status: SheetStatus::Failed,
                rows: 0,
                contributing_files: 0,
                error: Some(errors.join("; ")),
            });
            merged.push((kind, merge_tables(kind.schema(), Vec::new(), &processed_at)));
            continue;
        }
        let contributing = tables.iter().filter(|input| !input.table.is_empty()).count();
        let table = merge_tables(kind.schema(), tables, &processed_at);
        sheets.push(MergeSheetOutcome {
            sheet: kind,
            status: if table.is_empty() {
                SheetStatus::Empty
            } else {
                SheetStatus::Success
            },
            rows: table.len(),
            contributing_files: contributing,
            error: None,
        });
        merged.push((kind, table));
    }

    let to_write: Vec<(&str, &Table)> = merged
        .iter()
        .map(|(kind, table)| (kind.sheet_name(), table))
        .collect();
    if let Err(write_error) = SheetDir::at(output).write_sheets(&to_write) {
        let write_error = lis_model::LisError::from(write_error);
        error!(error = %write_error, "cannot write merged workbook");
        for sheet in &mut sheets {
            if sheet.status.is_ok() {
                sheet.status = SheetStatus::Failed;
                sheet.error = Some(write_error.to_string());
            }
        }
    }

    let mut report = MergeReport {
        inputs: inputs.to_vec(),
        output: output.to_path_buf(),
        sheets,
        report_path: None,
    };
    let report_path = merge_report_path(output);
    let tables = merge_report_tables(&report);
    let report_sheets: Vec<(&str, &Table)> =
        tables.iter().map(|(name, table)| (*name, table)).collect();
    match SheetDir::at(&report_path).write_sheets(&report_sheets) {
        Ok(()) => report.report_path = Some(report_path),
        Err(write_error) => error!(error = %write_error, "cannot write merge report"),
    }

    info!(
        merged = report.merged_sheets(),
        failed = report.failed_sheets(),
        duration_ms = start.elapsed().as_millis(),
        "merge finished"
    );
    Ok(report)
}
