//! Validation of iCalendar documents.
//!
//! Two components run per document: the structural pre-check over the raw
//! text, then (when the text parses) the semantic rule engine over the
//! document model. Their findings are strictly additive and the two share
//! no state; pre-check findings always precede semantic findings.

pub mod calendar;
pub mod precheck;

use icslint_core::{Diagnostic, Scope, ValidationResult};

use crate::rfc::ical::parse;

/// ## Summary
/// Validates one document: structural pre-check first, then the semantic
/// rule engine when the text parses. A parse failure contributes a single
/// error diagnostic and skips the semantic checks.
#[must_use]
pub fn validate_document(text: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.extend(precheck::check(text));

    match parse::parse(text) {
        Ok(document) => result.extend(calendar::check(&document)),
        Err(e) => result.push(Diagnostic::error(
            Scope::Calendar,
            format!("Failed to parse ICS file: {e}"),
        )),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_calendar_scenario() {
        // No VERSION, no PRODID, no events; the empty wrapper still parses.
        let result = validate_document("BEGIN:VCALENDAR\nEND:VCALENDAR\n");

        let errors: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
        let warnings: Vec<String> = result.warnings.iter().map(ToString::to_string).collect();

        assert_eq!(errors, vec!["Missing VERSION property"]);
        assert_eq!(
            warnings,
            vec![
                "Missing PRODID property (recommended)",
                "No events found in calendar",
            ]
        );
    }

    #[test]
    fn duplicate_uid_scenario() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:abc123\r\n\
DTSTAMP:20260110T120000Z\r\n\
DTSTART:20260115T090000Z\r\n\
DTEND:20260115T100000Z\r\n\
SUMMARY:First\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:abc123\r\n\
DTSTAMP:20260110T120000Z\r\n\
DTSTART:20260116T090000Z\r\n\
DTEND:20260116T100000Z\r\n\
SUMMARY:Second\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let result = validate_document(input);

        let errors: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
        assert_eq!(errors, vec!["Event 2: Duplicate UID found: abc123"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unparseable_document_reports_single_error() {
        // Passes every pre-check marker but has no closing VEVENT
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:x\r\n\
END:VCALENDAR\r\n";

        let result = validate_document(input);
        assert_eq!(result.error_count(), 1);
        assert!(result.errors[0]
            .to_string()
            .starts_with("Failed to parse ICS file: "));
    }

    #[test]
    fn garbage_input_is_a_finding_not_a_fault() {
        let result = validate_document("not a calendar at all");

        // Three structural errors plus the parse failure
        assert_eq!(result.error_count(), 4);
        assert_eq!(result.warning_count(), 1);
        // Pre-check findings come first
        assert_eq!(
            result.errors[0].to_string(),
            "Missing BEGIN:VCALENDAR declaration"
        );
    }

    #[test]
    fn validation_is_deterministic() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:3.0\r\n\
BEGIN:VEVENT\r\n\
DTSTART;TZID=America/New_York:20260115T090000\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let first = validate_document(input);
        let second = validate_document(input);
        assert_eq!(first, second);
    }
}
