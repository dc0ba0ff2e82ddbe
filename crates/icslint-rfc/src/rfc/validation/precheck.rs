//! Structural pre-check over raw document text.
//!
//! Runs before structured parsing and flags gross violations of container
//! framing and top-level mandatory properties that a lenient parser might
//! otherwise tolerate. Each check is an independent presence test; none
//! short-circuits another, and none can itself fail.

use icslint_core::{Diagnostic, Scope};

/// ## Summary
/// Checks raw document text for the calendar framing markers and the
/// mandatory top-level properties. Empty or garbage input is legal and
/// simply produces findings.
#[must_use]
pub fn check(text: &str) -> Vec<Diagnostic> {
    let mut findings = Vec::new();

    if !text.contains("BEGIN:VCALENDAR") {
        findings.push(Diagnostic::error(
            Scope::Calendar,
            "Missing BEGIN:VCALENDAR declaration",
        ));
    }
    if !text.contains("END:VCALENDAR") {
        findings.push(Diagnostic::error(
            Scope::Calendar,
            "Missing END:VCALENDAR declaration",
        ));
    }
    if !text.contains("VERSION:") {
        findings.push(Diagnostic::error(Scope::Calendar, "Missing VERSION property"));
    }
    if !text.contains("PRODID:") {
        findings.push(Diagnostic::warning(
            Scope::Calendar,
            "Missing PRODID property (recommended)",
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use icslint_core::Severity;

    fn messages(findings: &[Diagnostic]) -> Vec<&str> {
        findings.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn well_formed_document_has_no_findings() {
        let text = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\nEND:VCALENDAR\r\n";
        assert!(check(text).is_empty());
    }

    #[test]
    fn empty_input_produces_all_findings() {
        let findings = check("");
        assert_eq!(
            messages(&findings),
            vec![
                "Missing BEGIN:VCALENDAR declaration",
                "Missing END:VCALENDAR declaration",
                "Missing VERSION property",
                "Missing PRODID property (recommended)",
            ]
        );

        let severities: Vec<Severity> = findings.iter().map(|d| d.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Error,
                Severity::Error,
                Severity::Error,
                Severity::Warning,
            ]
        );
    }

    #[test]
    fn missing_open_marker_is_independent_of_the_rest() {
        // Document closes but never opens; other markers present
        let text = "VERSION:2.0\r\nPRODID:-//Test//EN\r\nEND:VCALENDAR\r\n";
        let findings = check(text);
        assert_eq!(messages(&findings), vec!["Missing BEGIN:VCALENDAR declaration"]);
    }

    #[test]
    fn missing_close_marker_flagged() {
        let text = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n";
        let findings = check(text);
        assert_eq!(messages(&findings), vec!["Missing END:VCALENDAR declaration"]);
    }

    #[test]
    fn checks_do_not_require_parseable_input() {
        let findings = check("\u{0}\u{1}garbage\u{2}");
        assert_eq!(findings.len(), 4);
    }
}
