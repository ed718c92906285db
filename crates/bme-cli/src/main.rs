//! Bannerlord mod editor CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use bme_cli::cli::{Cli, Command, ExportArgs, LogFormatArg, LogLevelArg};
use bme_cli::commands::{effective_policy, run_check, run_export, run_index, run_list};
use bme_cli::config::{FileConfig, Settings};
use bme_cli::logging::{LogConfig, LogFormat, init_logging};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

mod summary;

use crate::summary::{print_check_summary, print_index_summary, print_schema_list};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let settings = match FileConfig::load_optional(cli.config.as_deref()) {
        Ok(config) => Settings::from_config(&config),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(2);
        }
    };
    let exit_code = match &cli.command {
        Command::Check(args) => {
            let result = run_check(args, &settings);
            print_check_summary(&result, effective_policy(args, &settings));
            i32::from(result.has_errors())
        }
        Command::Index(args) => match run_index(args, &settings) {
            Ok(summary) => {
                print_index_summary(&summary);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Export(args) => match export(args, &settings) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::List => {
            print_schema_list(&run_list());
            0
        }
    };
    std::process::exit(exit_code);
}

fn export(args: &ExportArgs, settings: &Settings) -> Result<()> {
    let json = run_export(args, settings)?;
    if args.output.is_none() {
        println!("{json}");
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::default().with_level(cli.verbosity.tracing_level_filter());
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
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_ansi(with_ansi)
}
