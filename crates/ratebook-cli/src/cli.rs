//! CLI argument definitions for the Ratebook pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ratebook",
    version,
    about = "Clean, validate, and merge wage-rate datasets",
    long_about = "Clean, validate, and merge wage-rate datasets into a single\n\
                  canonical rate book.\n\n\
                  Collection sheets are split on their OVERRIDE marker: marked\n\
                  rows replace conflicting rate-book rows, unmarked rows are\n\
                  appended when genuinely new."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge a collection sheet into the main rate book.
    Merge(MergeArgs),

    /// Inspect a schema file.
    Schema(SchemaArgs),
}

#[derive(Parser)]
pub struct MergeArgs {
    /// Path to the main rate-book CSV.
    #[arg(value_name = "MAIN")]
    pub main: PathBuf,

    /// Path to the collection-sheet CSV.
    #[arg(value_name = "COLLECTION")]
    pub collection: PathBuf,

    /// Path to the YAML schema file.
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: PathBuf,

    /// Output path for the merged CSV.
    #[arg(long = "out", value_name = "PATH")]
    pub out: PathBuf,
}

#[derive(Parser)]
pub struct SchemaArgs {
    /// Path to the YAML schema file.
    #[arg(value_name = "PATH")]
    pub schema: PathBuf,
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
