//! Semantic rule engine over the parsed document model.
//!
//! Walks the calendar's declared properties and its ordered sequence of
//! VEVENT sub-components, applying per-component and cross-component
//! rules. The engine consumes the document read-only; duplicate-UID state
//! and the timezone resolver live for one call only, so concurrent
//! validations of different documents are independent.

use std::collections::HashSet;

use icslint_core::{Diagnostic, Scope};

use crate::rfc::ical::core::{Component, ICalendar, Property, Value};
use crate::rfc::ical::timezone::{TimeZoneResolver, instant_of};

/// ## Summary
/// Applies the document- and event-level rules to a parsed calendar and
/// returns the findings in rule order, events in document order.
#[must_use]
pub fn check(document: &ICalendar) -> Vec<Diagnostic> {
    let mut findings = Vec::new();
    let mut resolver = TimeZoneResolver::new();

    check_version(document, &mut findings);

    let events = document.events();
    if events.is_empty() {
        findings.push(Diagnostic::warning(
            Scope::Calendar,
            "No events found in calendar",
        ));
    }

    let has_timezone_definitions = !document.timezones().is_empty();
    let mut seen_uids: HashSet<&str> = HashSet::new();

    for (index, event) in events.into_iter().enumerate() {
        check_event(
            event,
            Scope::Event(index + 1),
            has_timezone_definitions,
            &mut seen_uids,
            &mut resolver,
            &mut findings,
        );
    }

    findings
}

/// A declared version other than the literal "2.0" is worth a warning;
/// absence is already reported by the structural pre-check.
fn check_version(document: &ICalendar, findings: &mut Vec<Diagnostic>) {
    if let Some(version) = document.version()
        && version != "2.0"
    {
        findings.push(Diagnostic::warning(
            Scope::Calendar,
            format!("Calendar VERSION is '{version}', expected '2.0'"),
        ));
    }
}

fn check_event<'a>(
    event: &'a Component,
    scope: Scope,
    has_timezone_definitions: bool,
    seen_uids: &mut HashSet<&'a str>,
    resolver: &mut TimeZoneResolver,
    findings: &mut Vec<Diagnostic>,
) {
    match event.uid() {
        None => findings.push(Diagnostic::error(scope, "Missing UID property")),
        Some(uid) => {
            // First occurrence owns the UID; only repeats are flagged
            if !seen_uids.insert(uid) {
                findings.push(Diagnostic::error(
                    scope,
                    format!("Duplicate UID found: {uid}"),
                ));
            }
        }
    }

    if !event.has_property("DTSTAMP") {
        findings.push(Diagnostic::error(scope, "Missing DTSTAMP property"));
    }

    let dtstart = event.get_property("DTSTART");
    if dtstart.is_none() {
        findings.push(Diagnostic::error(scope, "Missing DTSTART property"));
    }

    if !event.has_property("SUMMARY") {
        findings.push(Diagnostic::warning(
            scope,
            "Missing SUMMARY property (recommended)",
        ));
    }

    let dtend = event.get_property("DTEND");
    match (dtend, event.get_property("DURATION")) {
        (None, None) => findings.push(Diagnostic::warning(
            scope,
            "No DTEND or DURATION specified",
        )),
        (Some(_), Some(_)) => findings.push(Diagnostic::error(
            scope,
            "Both DTEND and DURATION specified",
        )),
        _ => {}
    }

    // Order the two endpoints when both resolve to absolute instants.
    // Resolution failures are swallowed: malformed dates are the parser's
    // report, not a second finding here.
    if let (Some(start), Some(end)) = (dtstart, dtend)
        && let (Some(start_at), Some(end_at)) =
            (instant_of(start, resolver), instant_of(end, resolver))
        && end_at < start_at
    {
        findings.push(Diagnostic::error(scope, "End date is before start date"));
    }

    // Coarse check: any VTIMEZONE in the document satisfies it, whether
    // or not it defines the zone actually referenced.
    if !has_timezone_definitions
        && let Some(tzid) = dtstart.and_then(named_zone)
    {
        findings.push(Diagnostic::warning(
            scope,
            format!("DTSTART references timezone '{tzid}' but no VTIMEZONE component is defined"),
        ));
    }
}

/// Returns the named (non-UTC, non-floating) zone of a date-time property.
fn named_zone(property: &Property) -> Option<&str> {
    match &property.value {
        Value::DateTime(dt) => dt.tzid(),
        _ => None,
    }
}
