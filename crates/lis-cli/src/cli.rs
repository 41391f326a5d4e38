//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "lis-merge",
    version,
    about = "Reconcile hospital visit workbooks into canonical reporting sheets",
    long_about = "Reconcile heterogeneous hospital workbooks into seven canonical sheets.\n\n\
                  Each input is processed on its own (process, batch), then the processed\n\
                  workbooks are merged into one consolidated workbook (merge, run)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Pipeline configuration file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process one source workbook into its processed workbook.
    Process(ProcessArgs),

    /// Process every source workbook of a directory in parallel.
    Batch(BatchArgs),

    /// Merge processed workbooks into one consolidated workbook.
    Merge(MergeArgs),

    /// Batch-process a directory, then merge the results.
    Run(RunArgs),

    /// List the canonical sheets and their columns.
    Sheets,
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Source workbook (.xlsx, .xlsm, .xls, .ods or a .sheets directory).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory for the processed workbook (default: next to FILE).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Directory holding the source workbooks.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory for processed workbooks and the batch report (default: INPUT_DIR).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Worker threads (default: one per core).
    #[arg(long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Skip inputs whose processed workbook already exists.
    #[arg(long = "skip-existing")]
    pub skip_existing: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    /// Directory holding `*_processed.sheets` workbooks.
    #[arg(value_name = "PROCESSED_DIR")]
    pub processed_dir: Option<PathBuf>,

    /// Consolidated workbook to write.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Consolidated workbook to write.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
