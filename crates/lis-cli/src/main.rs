//! Clinical workbook reconciliation CLI.

use clap::{ColorChoice, Parser};
use lis_cli::logging::{LogConfig, LogFormat, init_logging};
use lis_model::FileStatus;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod progress;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{load_config, run_all, run_batch_phase, run_merge_phase, run_process};
use crate::summary::{
    print_batch_summary, print_file_outcome, print_merge_summary, print_sheets,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };
    let exit_code = match &cli.command {
        Command::Process(args) => match run_process(args) {
            Ok(outcome) => {
                print_file_outcome(&outcome);
                i32::from(outcome.status == FileStatus::Failed)
            }
            Err(error) => report_error(&error),
        },
        Command::Batch(args) => match run_batch_phase(args, &config) {
            Ok(report) => {
                print_batch_summary(&report);
                i32::from(!report.has_success())
            }
            Err(error) => report_error(&error),
        },
        Command::Merge(args) => match run_merge_phase(args, &config) {
            Ok(report) => {
                print_merge_summary(&report);
                i32::from(!report.has_success())
            }
            Err(error) => report_error(&error),
        },
        Command::Run(args) => match run_all(args, &config) {
            Ok(result) => {
                print_batch_summary(&result.batch);
                match &result.merge {
                    Some(merge) => {
                        print_merge_summary(merge);
                        i32::from(!merge.has_success())
                    }
                    None => {
                        eprintln!("error: no input could be processed; merge skipped");
                        1
                    }
                }
            }
            Err(error) => report_error(&error),
        },
        Command::Sheets => {
            print_sheets();
            0
        }
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
