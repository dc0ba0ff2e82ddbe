//! Validation diagnostics and per-document results.

use std::fmt;

use serde::{Serialize, Serializer};

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The document violates a requirement of the format.
    Error,
    /// The document is usable but misses a recommendation.
    Warning,
}

impl Severity {
    /// Returns the string name for this severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Document-relative locator for a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The calendar document as a whole.
    Calendar,
    /// A VEVENT sub-component, identified by its 1-based position in
    /// document order.
    Event(usize),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calendar => write!(f, "calendar"),
            Self::Event(n) => write!(f, "Event {n}"),
        }
    }
}

/// A single validation finding.
///
/// Diagnostics are immutable once created and are never deduplicated:
/// the same message may legitimately appear once per offending event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the finding.
    pub severity: Severity,
    /// Where in the document the finding applies.
    pub scope: Scope,
    /// Human-readable description of the defect.
    pub message: String,
}

impl Diagnostic {
    /// Creates an error-severity diagnostic.
    #[must_use]
    pub fn error(scope: Scope, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            scope,
            message: message.into(),
        }
    }

    /// Creates a warning-severity diagnostic.
    #[must_use]
    pub fn warning(scope: Scope, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            scope,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Calendar => write!(f, "{}", self.message),
            Scope::Event(_) => write!(f, "{}: {}", self.scope, self.message),
        }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The outcome of validating one document.
///
/// Errors and warnings are partitioned by severity only; within each list
/// diagnostics appear in the order they were produced. One instance is
/// created per validation call and owned exclusively by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Error-severity findings, in production order.
    pub errors: Vec<Diagnostic>,
    /// Warning-severity findings, in production order.
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic to the list matching its severity.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    /// Appends every diagnostic from `iter`, partitioning by severity.
    pub fn extend(&mut self, iter: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }

    /// Returns the number of error findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warning findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Returns whether the document produced no findings at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}
