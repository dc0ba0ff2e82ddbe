//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

/// Validate iCalendar (.ics) documents matching a glob pattern.
#[derive(Debug, Parser)]
#[command(name = "icslint", version, about)]
pub struct Cli {
    /// Glob pattern selecting the documents to validate
    /// (e.g. "calendars/**/*.ics")
    pub pattern: String,

    /// Write the JSON report to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Fail the run when warnings are present (overrides configuration)
    #[arg(long)]
    pub fail_on_warnings: bool,
}
