//! File enumeration and batch orchestration.
//!
//! Each document is read and validated independently; a failure on one
//! never suppresses or corrupts the results of another. Only an invalid
//! pattern is fatal to the run.

use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::StreamExt;
use icslint_core::{Diagnostic, Scope, ValidationResult};
use icslint_rfc::rfc::validation::validate_document;

use crate::report::RunReport;

/// ## Summary
/// Expands a glob pattern into the ordered list of matching files.
///
/// ## Errors
/// Returns an error if the pattern itself is invalid. Entries that cannot
/// be read during traversal are skipped with a warning.
pub fn expand_pattern(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Skipping unreadable glob entry"),
        }
    }

    Ok(paths)
}

/// ## Summary
/// Validates every file matching `pattern` with bounded concurrency.
/// Document order in the report follows the pattern expansion.
///
/// ## Errors
/// Returns an error only for run-level faults (invalid pattern); see the
/// module docs for the per-document failure contract.
pub async fn run(pattern: &str, max_in_flight: usize) -> anyhow::Result<RunReport> {
    let paths = expand_pattern(pattern)?;

    if paths.is_empty() {
        tracing::warn!(pattern, "No files matched pattern");
        return Ok(RunReport::default());
    }

    tracing::info!(count = paths.len(), pattern, "Validating documents");

    let results: Vec<(PathBuf, ValidationResult)> = futures::stream::iter(paths)
        .map(|path| async move {
            let result = validate_file(&path).await;
            (path, result)
        })
        .buffered(max_in_flight.max(1))
        .collect()
        .await;

    let mut report = RunReport::default();
    for (path, result) in &results {
        tracing::debug!(
            path = %path.display(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            "Validated document"
        );
        report.insert(path.display().to_string(), result);
    }

    Ok(report)
}

/// Reads and validates a single document. A read failure becomes the
/// document's only diagnostic rather than a run failure.
async fn validate_file(path: &Path) -> ValidationResult {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => validate_document(&text),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.push(Diagnostic::error(
                Scope::Calendar,
                format!("Failed to read file: {e}"),
            ));
            result
        }
    }
}
