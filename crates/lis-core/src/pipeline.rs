//! Phase 1: one source workbook to one processed workbook.

use std::path::Path;
use std::time::Instant;

use lis_ingest::{SheetDir, WorkbookWriter, open_workbook, processed_output_path};
use lis_model::{FileOutcome, LisError, SheetKind, SheetOutcome, Table};
use tracing::{debug, info, info_span, warn};

use crate::sheets::build_sheet;
use crate::sources::SourceTables;

/// Canonical sheets built from one workbook, with one outcome per sheet.
#[derive(Debug, Default)]
pub struct ProcessedSheets {
    /// Sheets that did not fail, in canonical order.
    pub tables: Vec<(SheetKind, Table)>,
    pub outcomes: Vec<SheetOutcome>,
}

/// Builds all seven canonical sheets. A failing sheet is recorded and the
/// rest still run.
pub fn process_sources(sources: &SourceTables) -> ProcessedSheets {
    let mut processed = ProcessedSheets::default();
    for kind in SheetKind::ALL {
        let _span = info_span!("sheet", sheet = kind.sheet_name()).entered();
        match build_sheet(kind, sources) {
            Ok(build) => {
                debug!(
                    rows = build.table.len(),
                    dropped = build.dropped_duplicates,
                    "sheet built"
                );
                processed.outcomes.push(SheetOutcome::written(
                    kind,
                    build.table.len(),
                    build.dropped_duplicates,
                ));
                processed.tables.push((kind, build.table));
            }
            Err(error) => {
                warn!(%error, "sheet failed");
                processed
                    .outcomes
                    .push(SheetOutcome::failed(kind, error.to_string()));
            }
        }
    }
    processed
}

/// Processes `input` into `{output_dir}/{stem}_processed.sheets`.
///
/// Never fails: unreadable inputs and failed writes are recorded in the
/// returned outcome. Sheets that fail are removed from an existing processed
/// workbook, and a failed write fails every sheet.
pub fn process_file(input: &Path, output_dir: &Path) -> FileOutcome {
    let span = info_span!("process_file", file = %input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mut reader = match open_workbook(input) {
        Ok(reader) => reader,
        Err(error) => {
            warn!(%error, "cannot open workbook");
            return FileOutcome::failed(input.to_path_buf(), error.to_string());
        }
    };
    let sources = match SourceTables::read(reader.as_mut()) {
        Ok(sources) => sources,
        Err(error) => {
            warn!(%error, "cannot read workbook");
            return FileOutcome::failed(input.to_path_buf(), error.to_string());
        }
    };
    let ProcessedSheets {
        tables,
        mut outcomes,
    } = process_sources(&sources);
    let output = processed_output_path(input, output_dir);
    // Sheets that failed this run must not keep a previous run's rows.
    let stale: Vec<&str> = outcomes
        .iter()
        .filter(|sheet| !sheet.status.is_ok())
        .map(|sheet| sheet.sheet.sheet_name())
        .collect();

    if tables.is_empty() {
        warn!("no sheet could be built");
        let mut outcome = FileOutcome::from_sheets(input.to_path_buf(), None, outcomes);
        if output.is_dir()
            && let Err(error) = SheetDir::at(&output).replace_sheets(&[], &stale)
        {
            let error = LisError::from(error);
            warn!(%error, output = %output.display(), "cannot clear stale processed workbook");
            outcome.error = Some(error.to_string());
        }
        return outcome;
    }

    let sheets: Vec<(&str, &Table)> = tables
        .iter()
        .map(|(kind, table)| (kind.sheet_name(), table))
        .collect();
    if let Err(error) = SheetDir::at(&output).replace_sheets(&sheets, &stale) {
        let error = LisError::from(error).to_string();
        warn!(%error, output = %output.display(), "cannot write processed workbook");
        for sheet in &mut outcomes {
            sheet.fail(error.as_str());
        }
        let mut outcome = FileOutcome::failed(input.to_path_buf(), error);
        outcome.sheets = outcomes;
        return outcome;
    }

    let outcome =
        FileOutcome::from_sheets(input.to_path_buf(), Some(output.clone()), outcomes);
    info!(
        output = %output.display(),
        status = outcome.status.as_str(),
        sheets = outcome.succeeded_sheets(),
        failed = outcome.failed_sheets(),
        duration_ms = start.elapsed().as_millis(),
        "file processed"
    );
    outcome
}
