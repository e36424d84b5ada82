//! CLI argument definitions for the formstate demo.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "formstate-demo",
    version,
    about = "Scripted contact-book editing session over the formstate model",
    long_about = "Plays a scripted editing session against an in-memory store:\n\
                  load, edit, save, discard, delete, and a batch save.\n\
                  Use --fail-on to watch a failed persist leave its row dirty."
)]
pub struct Cli {
    /// Inject a persist failure for contacts whose name contains this text.
    #[arg(long = "fail-on", value_name = "TEXT")]
    pub fail_on: Option<String>,

    /// Print the session summary as JSON instead of plain text.
    #[arg(long = "json")]
    pub json: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

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

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
