//! Orchestration of the reconciliation engine.
//!
//! Phase 1 turns one source workbook into the seven canonical sheets. Phase 2
//! runs phase 1 over a directory of inputs in parallel and writes a status
//! report. Phase 3 merges the processed workbooks into one consolidated
//! workbook, after every phase-2 job has finished.

pub mod batch;
pub mod config;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod sheets;
pub mod sources;

pub use batch::{BatchOptions, run_batch};
pub use config::PipelineConfig;
pub use merge::{merge_report_path, merged_output_path, run_merge};
pub use pipeline::{ProcessedSheets, process_file, process_sources};
pub use report::{BATCH_REPORT_NAME, MERGE_REPORT_NAME, batch_report_tables, merge_report_tables};
pub use sheets::{SheetBuild, build_sheet};
pub use sources::SourceTables;
