use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use lis_core::{BatchOptions, PipelineConfig, process_file, run_batch, run_merge};
use lis_ingest::{list_input_workbooks, list_processed_workbooks};
use lis_model::{BatchReport, FileOutcome, MergeReport};
use tracing::{info, info_span};

use crate::cli::{BatchArgs, MergeArgs, ProcessArgs, RunArgs};
use crate::progress::batch_progress;

pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path),
        None => Ok(PipelineConfig::default()),
    }
}

pub fn run_process(args: &ProcessArgs) -> Result<FileOutcome> {
    if !args.file.exists() {
        bail!("input not found: {}", args.file.display());
    }
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args
            .file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    Ok(process_file(&args.file, &output_dir))
}

pub fn run_batch_phase(args: &BatchArgs, config: &PipelineConfig) -> Result<BatchReport> {
    let input_dir = args
        .input_dir
        .clone()
        .or_else(|| config.input_dir.clone())
        .ok_or_else(|| anyhow!("no input directory; pass INPUT_DIR or set input_dir"))?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.resolved_output_dir(&input_dir));
    let options = BatchOptions {
        workers: args.workers.unwrap_or(config.workers),
        skip_existing: args.skip_existing || config.skip_existing,
    };

    let inputs = list_input_workbooks(&input_dir)
        .with_context(|| format!("list inputs in {}", input_dir.display()))?;
    info!(input_dir = %input_dir.display(), files = inputs.len(), "discovered inputs");
    if inputs.is_empty() {
        bail!("no source workbooks found in {}", input_dir.display());
    }

    let progress = batch_progress(inputs.len());
    let report = run_batch(&inputs, &output_dir, options, &|outcome: &FileOutcome| {
        progress.set_message(outcome.file_name());
        progress.inc(1);
    });
    progress.finish_and_clear();
    report
}

fn merge_output(output: Option<&PathBuf>, config: &PipelineConfig) -> Result<PathBuf> {
    output
        .cloned()
        .or_else(|| config.merged_output.clone())
        .ok_or_else(|| anyhow!("no merged output path; pass --output or set merged_output"))
}

pub fn run_merge_phase(args: &MergeArgs, config: &PipelineConfig) -> Result<MergeReport> {
    let processed_dir = args
        .processed_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .or_else(|| config.input_dir.clone())
        .ok_or_else(|| anyhow!("no processed directory; pass PROCESSED_DIR or set output_dir"))?;
    let output = merge_output(args.output.as_ref(), config)?;
    let inputs = list_processed_workbooks(&processed_dir)
        .with_context(|| format!("list processed workbooks in {}", processed_dir.display()))?;
    if inputs.is_empty() {
        bail!("no processed workbooks found in {}", processed_dir.display());
    }
    run_merge(&inputs, &output)
}

/// Outcome of `run`: the merge is absent when no file could be processed.
pub struct RunResult {
    pub batch: BatchReport,
    pub merge: Option<MergeReport>,
}

pub fn run_all(args: &RunArgs, config: &PipelineConfig) -> Result<RunResult> {
    let span = info_span!("run");
    let _guard = span.enter();
    let output = merge_output(args.output.as_ref(), config)?;
    let batch = run_batch_phase(&args.batch, config)?;
    if !batch.has_success() {
        return Ok(RunResult { batch, merge: None });
    }
    let merge = run_merge(&batch.outputs(), &output)?;
    Ok(RunResult {
        batch,
        merge: Some(merge),
    })
}
