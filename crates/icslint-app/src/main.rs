//! icslint: validates iCalendar documents matching a glob pattern and
//! emits a JSON report.
//!
//! Exit codes: 0 clean (or findings below the gating policy), 1 gated
//! findings, 2 run failure.

mod cli;
mod report;
mod runner;

use std::process::ExitCode;

use clap::Parser;
use icslint_core::config::load_config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    // The report goes to stdout; all logging goes to stderr.
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    match run(&filter_handle).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = ?e, "Run failed");
            ExitCode::from(2)
        }
    }
}

/// Returns `Ok(true)` when the run passes the gating policy.
async fn run(
    filter_handle: &reload::Handle<EnvFilter, tracing_subscriber::Registry>,
) -> anyhow::Result<bool> {
    let args = cli::Cli::parse();
    let mut config = load_config()?;

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    if args.fail_on_warnings {
        config.gating.fail_on_warnings = true;
    }

    let run_report = runner::run(&args.pattern, config.runner.max_in_flight).await?;

    tracing::info!(
        files = run_report.files.len(),
        errors = run_report.total_errors,
        warnings = run_report.total_warnings,
        "Validation complete"
    );

    report::emit(&run_report, args.report.as_deref(), args.pretty)?;

    Ok(!run_report.gated(&config.gating))
}
