//! Phase 2: every input workbook of a directory, in parallel.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use lis_ingest::{SHEET_DIR_EXTENSION, SheetDir, WorkbookWriter, processed_output_path};
use lis_model::{BatchReport, FileOutcome, Table};
use rayon::prelude::*;
use tracing::{error, info, info_span};

use crate::pipeline::process_file;
use crate::report::{BATCH_REPORT_NAME, batch_report_tables};

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Worker threads; 0 uses rayon's global pool.
    pub workers: usize,
    pub skip_existing: bool,
}

fn process_or_skip(input: &Path, output_dir: &Path, options: BatchOptions) -> FileOutcome {
    if options.skip_existing {
        let output = processed_output_path(input, output_dir);
        if output.exists() {
            info!(file = %input.display(), "processed workbook exists, skipping");
            return FileOutcome::skipped(input.to_path_buf(), output);
        }
    }
    process_file(input, output_dir)
}

/// Processes `inputs` into `output_dir` and writes the batch report there.
///
/// Every input gets an outcome; none aborts the batch. `on_file_done` runs
/// on the worker thread as each file finishes. Returns once every file is
/// done.
pub fn run_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: BatchOptions,
    on_file_done: &(dyn Fn(&FileOutcome) + Sync),
) -> Result<BatchReport> {
    let span = info_span!("batch", output_dir = %output_dir.display(), files = inputs.len());
    let _guard = span.enter();
    let start = Instant::now();
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;

    let run = || -> Vec<FileOutcome> {
        inputs
            .par_iter()
            .map(|input| {
                let outcome = process_or_skip(input, output_dir, options);
                on_file_done(&outcome);
                outcome
            })
            .collect()
    };
    let files = if options.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
            .context("build worker pool")?
            .install(run)
    } else {
        run()
    };

    let mut report = BatchReport {
        output_dir: output_dir.to_path_buf(),
        files,
        report_path: None,
    };
    let report_path = output_dir.join(format!("{BATCH_REPORT_NAME}.{SHEET_DIR_EXTENSION}"));
    let tables = batch_report_tables(&report);
    let sheets: Vec<(&str, &Table)> = tables.iter().map(|(name, table)| (*name, table)).collect();
    match SheetDir::at(&report_path).write_sheets(&sheets) {
        Ok(()) => report.report_path = Some(report_path),
        Err(write_error) => {
            error!(error = %write_error, "cannot write batch report");
        }
    }

    info!(
        total = report.total(),
        succeeded = report.succeeded(),
        partial = report.partial(),
        failed = report.failed(),
        duration_ms = start.elapsed().as_millis(),
        "batch finished"
    );
    Ok(report)
}
