//! CLI argument definitions for `bme`.

use std::path::PathBuf;

use bme_model::ErrorPolicy;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bme",
    version,
    about = "Bannerlord mod editor - check, index and export game XML files",
    long_about = "Check, index and export Mount & Blade II: Bannerlord XML files.\n\n\
                  Every file is parsed into its schema and written back; `check` reports\n\
                  any structural drift between the source and the rewrite."
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

    /// Log output format (pretty for humans, json for machine parsing).
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

    /// TOML file with streaming, writer and error policy settings.
    #[arg(long = "config", value_name = "TOML", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse and rewrite files, reporting structural drift.
    Check(CheckArgs),

    /// Stream a large entity file into its indexes.
    Index(IndexArgs),

    /// Export credits or class divisions as editor JSON.
    Export(ExportArgs),

    /// List the supported file kinds and their indexes.
    List,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Files to check.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// What to do with malformed attribute values.
    #[arg(long = "policy", value_enum)]
    pub policy: Option<PolicyArg>,

    /// Elements per chunk for indexed collections.
    #[arg(long = "chunk-size", value_name = "N")]
    pub chunk_size: Option<usize>,
}

#[derive(Args)]
pub struct IndexArgs {
    /// Entity file to index.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Elements per chunk.
    #[arg(long = "chunk-size", value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Index to look a key up in.
    #[arg(long = "index", value_name = "NAME", requires = "key")]
    pub index: Option<String>,

    /// Key to look up.
    #[arg(long = "key", value_name = "KEY", requires = "index")]
    pub key: Option<String>,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Credits or class divisions file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Pretty-print the JSON.
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Write to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    FailFast,
    WarnAndContinue,
}

impl From<PolicyArg> for ErrorPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::FailFast => ErrorPolicy::FailFast,
            PolicyArg::WarnAndContinue => ErrorPolicy::WarnAndContinue,
        }
    }
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
