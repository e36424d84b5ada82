//! Formstate demo CLI.

use clap::{ColorChoice, Parser};
use formstate_demo::logging::{LogConfig, LogFormat, init_logging};
use formstate_demo::session::{self, SessionSummary};
use std::io::{self, IsTerminal};

mod cli;

use crate::cli::{Cli, LogFormatArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(summary) => {
            if summary.has_failures() {
                1
            } else {
                0
            }
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<SessionSummary> {
    let summary = session::run(cli.fail_on.as_deref());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(summary)
}

fn print_summary(summary: &SessionSummary) {
    println!("session summary");
    println!("  loaded:        {}", summary.loaded);
    println!("  saved:         {}", summary.saved);
    println!("  save failures: {}", summary.save_failures);
    println!("  discarded:     {}", summary.discarded);
    println!("  deleted:       {}", summary.deleted);
    println!(
        "  batch:         {} attempted, {} saved, {} skipped, {} failed",
        summary.batch.attempted,
        summary.batch.saved,
        summary.batch.skipped_invalid,
        summary.batch.failures.len()
    );
    for failure in &summary.batch.failures {
        println!("    [{}] {}", failure.index, failure.message);
    }
    println!("  store rows:");
    for row in &summary.rows {
        println!("    #{} {} <{}>", row.id, row.name, row.email);
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !cli.verbosity.is_present();
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
