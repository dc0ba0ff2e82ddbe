//! Run-level report aggregation and emission.
//!
//! The report is the run's persisted artifact: totals plus a mapping from
//! document path to its rendered diagnostic messages. It round-trips
//! through JSON without loss.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use icslint_core::ValidationResult;
use icslint_core::config::GatingConfig;
use serde::{Deserialize, Serialize};

/// Per-document slice of the report: rendered diagnostic messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<&ValidationResult> for FileReport {
    fn from(result: &ValidationResult) -> Self {
        Self {
            errors: result.errors.iter().map(ToString::to_string).collect(),
            warnings: result.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Aggregated outcome of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Total error findings across all documents.
    pub total_errors: usize,
    /// Total warning findings across all documents.
    pub total_warnings: usize,
    /// Per-document results, keyed by path. Sorted keys keep the
    /// serialized report deterministic.
    pub files: BTreeMap<String, FileReport>,
}

impl RunReport {
    /// Records one document's result and updates the totals.
    pub fn insert(&mut self, path: String, result: &ValidationResult) {
        self.total_errors += result.error_count();
        self.total_warnings += result.warning_count();
        self.files.insert(path, FileReport::from(result));
    }

    /// Returns whether the gating policy fails this run.
    #[must_use]
    pub fn gated(&self, gating: &GatingConfig) -> bool {
        (gating.fail_on_errors && self.total_errors > 0)
            || (gating.fail_on_warnings && self.total_warnings > 0)
    }
}

/// ## Summary
/// Serializes the report as JSON and writes it to `path`, or to stdout
/// when no path is given.
///
/// ## Errors
/// Returns an error if serialization or the file write fails.
pub fn emit(report: &RunReport, path: Option<&Path>, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };

    match path {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use icslint_core::{Diagnostic, Scope};

    fn sample_result() -> ValidationResult {
        let mut result = ValidationResult::new();
        result.push(Diagnostic::error(Scope::Event(2), "Duplicate UID found: abc"));
        result.push(Diagnostic::warning(
            Scope::Calendar,
            "No events found in calendar",
        ));
        result
    }

    #[test]
    fn insert_updates_totals() {
        let mut report = RunReport::default();
        report.insert("a.ics".to_string(), &sample_result());
        report.insert("b.ics".to_string(), &ValidationResult::new());

        assert_eq!(report.total_errors, 1);
        assert_eq!(report.total_warnings, 1);
        assert_eq!(report.files.len(), 2);
        assert!(report.files["b.ics"].errors.is_empty());
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let mut report = RunReport::default();
        report.insert("cal/a.ics".to_string(), &sample_result());

        let json = serde_json::to_string(&report).expect("serialize");
        let restored: RunReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, report);
        assert_eq!(
            restored.files["cal/a.ics"].errors,
            vec!["Event 2: Duplicate UID found: abc"]
        );
    }

    #[test]
    fn gating_follows_configuration() {
        let mut report = RunReport::default();
        report.insert("a.ics".to_string(), &sample_result());

        let errors_only = GatingConfig {
            fail_on_errors: true,
            fail_on_warnings: false,
        };
        assert!(report.gated(&errors_only));

        let mut warnings_only = RunReport::default();
        let mut result = ValidationResult::new();
        result.push(Diagnostic::warning(Scope::Event(1), "Missing SUMMARY property (recommended)"));
        warnings_only.insert("b.ics".to_string(), &result);

        assert!(!warnings_only.gated(&errors_only));
        assert!(warnings_only.gated(&GatingConfig {
            fail_on_errors: true,
            fail_on_warnings: true,
        }));
    }

    #[test]
    fn empty_run_is_never_gated() {
        let report = RunReport::default();
        assert!(!report.gated(&GatingConfig {
            fail_on_errors: true,
            fail_on_warnings: true,
        }));
    }
}
