//! iCalendar document parser (RFC 5545).
//!
//! Assembles content lines into the typed component tree.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{
    parse_boolean, parse_date, parse_datetime, parse_duration, parse_float, parse_integer,
    parse_time, parse_utc_offset, unescape_text,
};
use crate::rfc::ical::core::{
    Component, ComponentKind, ContentLine, Date, DateTime, ICalendar, Property, Value,
};

/// Parses an iCalendar document from a string.
///
/// ## Errors
///
/// Returns an error if the input has no parseable VCALENDAR structure.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    let lines = split_lines(input);

    if lines.is_empty() {
        tracing::debug!("Empty iCalendar input");
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    }

    let content_lines: Vec<(usize, ContentLine)> = lines
        .into_iter()
        .map(|(line_num, line)| parse_content_line(&line, line_num).map(|cl| (line_num, cl)))
        .collect::<ParseResult<_>>()?;

    let mut iter = content_lines.into_iter();

    let (line_num, begin) = iter
        .next()
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingBegin, 1, 1))?;
    if begin.name != "BEGIN" {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1));
    }
    let root_name = begin.raw_value.to_ascii_uppercase();
    if root_name != "VCALENDAR" {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1)
            .with_context("expected VCALENDAR"));
    }

    let root = parse_component_body(&mut iter, line_num, &root_name)?;

    tracing::debug!(
        events = root.children_of_kind(ComponentKind::Event).len(),
        timezones = root.children_of_kind(ComponentKind::Timezone).len(),
        "Parsed iCalendar document"
    );

    Ok(ICalendar { root })
}

/// Parses a component's properties and children; the BEGIN line has
/// already been consumed, and this consumes through the matching END.
fn parse_component_body(
    iter: &mut impl Iterator<Item = (usize, ContentLine)>,
    begin_line_num: usize,
    component_name: &str,
) -> ParseResult<Component> {
    let mut component = Component::named(component_name);
    let mut last_line_num = begin_line_num;

    loop {
        let Some((line_num, content_line)) = iter.next() else {
            return Err(
                ParseError::new(ParseErrorKind::MissingEnd, last_line_num, 1)
                    .with_context(format!("missing END:{component_name}")),
            );
        };
        last_line_num = line_num;

        match content_line.name.as_str() {
            "BEGIN" => {
                let nested_name = content_line.raw_value.to_ascii_uppercase();
                let nested = parse_component_body(iter, line_num, &nested_name)?;
                component.add_child(nested);
            }
            "END" => {
                let end_name = content_line.raw_value.to_ascii_uppercase();
                if end_name != component_name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{component_name}, got END:{end_name}"
                            )),
                    );
                }
                break;
            }
            _ => {
                let property = parse_property(content_line, line_num)?;
                component.add_property(property);
            }
        }
    }

    Ok(component)
}

/// Parses a property from a content line, resolving the value type.
fn parse_property(cl: ContentLine, line_num: usize) -> ParseResult<Property> {
    let value_type = determine_value_type(&cl);
    let tzid = cl.tzid().map(str::to_string);

    let parsed_value = parse_value(&cl.raw_value, value_type, tzid.as_deref(), line_num)?;

    Ok(Property {
        name: cl.name,
        params: cl.params,
        value: parsed_value,
        raw_value: cl.raw_value,
    })
}

/// Internal enum for value type dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Binary,
    Boolean,
    Date,
    DateTime,
    Duration,
    Float,
    Integer,
    Text,
    Time,
    Uri,
    UtcOffset,
    Unknown,
}

impl ValueType {
    fn from_param(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "BOOLEAN" => Self::Boolean,
            "CAL-ADDRESS" | "URI" => Self::Uri,
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "DURATION" => Self::Duration,
            "FLOAT" => Self::Float,
            "INTEGER" => Self::Integer,
            "TEXT" => Self::Text,
            "TIME" => Self::Time,
            "UTC-OFFSET" => Self::UtcOffset,
            // RECUR, PERIOD, and vendor types are preserved raw
            _ => Self::Unknown,
        }
    }
}

/// Determines the value type for a property.
fn determine_value_type(cl: &ContentLine) -> ValueType {
    // Explicit VALUE parameter wins
    if let Some(value_type) = cl.value_type() {
        return ValueType::from_param(value_type);
    }

    // Property-specific defaults
    match cl.name.as_str() {
        "DTSTART" | "DTEND" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "COMPLETED" | "DUE"
        | "RECURRENCE-ID" => ValueType::DateTime,

        "EXDATE" | "RDATE" => {
            // Date form is 8 digits without a 'T'; period form contains '/'
            if cl.raw_value.len() == 8 && !cl.raw_value.contains('T') {
                ValueType::Date
            } else if cl.raw_value.contains('/') {
                ValueType::Unknown
            } else {
                ValueType::DateTime
            }
        }

        "DURATION" | "TRIGGER" => {
            if cl.raw_value.starts_with(['P', '-', '+']) {
                ValueType::Duration
            } else {
                ValueType::DateTime
            }
        }

        "PERCENT-COMPLETE" | "PRIORITY" | "REPEAT" | "SEQUENCE" => ValueType::Integer,

        "TZOFFSETFROM" | "TZOFFSETTO" => ValueType::UtcOffset,

        "URL" | "TZURL" | "SOURCE" | "ATTENDEE" | "ORGANIZER" => ValueType::Uri,

        // Recurrence and free/busy semantics are out of scope; keep raw
        "RRULE" | "EXRULE" | "FREEBUSY" => ValueType::Unknown,

        _ => ValueType::Text,
    }
}

/// Parses a raw value string into a typed Value.
fn parse_value(
    raw: &str,
    value_type: ValueType,
    tzid: Option<&str>,
    line_num: usize,
) -> ParseResult<Value> {
    match value_type {
        ValueType::Text => Ok(Value::Text(unescape_text(raw))),
        ValueType::DateTime => {
            if raw.contains(',') {
                // Comma-separated list (EXDATE, RDATE)
                let dts: Vec<DateTime> = raw
                    .split(',')
                    .map(|s| parse_datetime(s.trim(), tzid, line_num, 1))
                    .collect::<ParseResult<_>>()?;
                Ok(Value::DateTimeList(dts))
            } else {
                Ok(Value::DateTime(parse_datetime(raw, tzid, line_num, 1)?))
            }
        }
        ValueType::Date => {
            if raw.contains(',') {
                let dates: Vec<Date> = raw
                    .split(',')
                    .map(|s| parse_date(s.trim(), line_num, 1))
                    .collect::<ParseResult<_>>()?;
                Ok(Value::DateList(dates))
            } else {
                Ok(Value::Date(parse_date(raw, line_num, 1)?))
            }
        }
        ValueType::Duration => Ok(Value::Duration(parse_duration(raw, line_num, 1)?)),
        ValueType::Integer => Ok(Value::Integer(parse_integer(raw, line_num, 1)?)),
        ValueType::Float => Ok(Value::Float(parse_float(raw, line_num, 1)?)),
        ValueType::Boolean => Ok(Value::Boolean(parse_boolean(raw, line_num, 1)?)),
        ValueType::UtcOffset => Ok(Value::UtcOffset(parse_utc_offset(raw, line_num, 1)?)),
        ValueType::Uri => Ok(Value::Uri(raw.to_string())),
        ValueType::Binary => {
            // RFC 5545 §3.3.1: Base64 decode
            use base64::{Engine, engine::general_purpose::STANDARD};
            let decoded = STANDARD.decode(raw).map_err(|e| {
                ParseError::new(ParseErrorKind::InvalidValue, line_num, 1)
                    .with_context(format!("invalid Base64 encoding: {e}"))
            })?;
            Ok(Value::Binary(decoded))
        }
        ValueType::Time => Ok(Value::Time(parse_time(raw, line_num, 1)?)),
        ValueType::Unknown => Ok(Value::Unknown(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_VEVENT: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:test-uid-123@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T140000Z\r\n\
DTEND:20260123T150000Z\r\n\
SUMMARY:Test Event\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test_log::test]
    fn parse_simple_vevent() {
        let ical = parse(SIMPLE_VEVENT).unwrap();

        assert_eq!(ical.version(), Some("2.0"));
        assert_eq!(ical.prodid(), Some("-//Test//Test//EN"));

        let events = ical.events();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.uid(), Some("test-uid-123@example.com"));
        assert_eq!(event.summary(), Some("Test Event"));
    }

    #[test_log::test]
    fn parse_empty_calendar() {
        let ical = parse("BEGIN:VCALENDAR\nEND:VCALENDAR\n").unwrap();
        assert_eq!(ical.version(), None);
        assert!(ical.events().is_empty());
    }

    #[test]
    fn parse_with_timezone() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:test@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART;TZID=America/New_York:20260123T090000\r\n\
SUMMARY:Morning Meeting\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];

        let dtstart = event.get_property("DTSTART").unwrap();
        let dt = dtstart.as_datetime().unwrap();
        assert_eq!(dt.tzid(), Some("America/New_York"));
        assert_eq!(dt.hour, 9);
    }

    #[test]
    fn parse_rrule_preserved_raw() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:recurring@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=10\r\n\
SUMMARY:Recurring Meeting\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];

        let rrule = event.get_property("RRULE").unwrap();
        assert!(rrule.value.is_unknown());
        assert_eq!(rrule.raw_value, "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=10");
    }

    #[test]
    fn parse_with_valarm() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:alarm@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
SUMMARY:Event with Alarm\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
TRIGGER:-PT15M\r\n\
DESCRIPTION:Reminder\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];

        let alarms = event.children_of_kind(ComponentKind::Alarm);
        assert_eq!(alarms.len(), 1);

        let action = alarms[0].get_property("ACTION").unwrap();
        assert_eq!(action.as_text(), Some("DISPLAY"));

        let trigger = alarms[0].get_property("TRIGGER").unwrap();
        let dur = trigger.as_duration().unwrap();
        assert!(dur.negative);
        assert_eq!(dur.minutes, 15);
    }

    #[test]
    fn parse_vtimezone() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
BEGIN:STANDARD\r\n\
DTSTART:20251102T020000\r\n\
TZOFFSETFROM:-0400\r\n\
TZOFFSETTO:-0500\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:zoned@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART;TZID=America/New_York:20260123T090000\r\n\
SUMMARY:Zoned\r\n\
DTEND;TZID=America/New_York:20260123T100000\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        assert_eq!(ical.timezones().len(), 1);

        let tz = &ical.timezones()[0];
        assert_eq!(
            tz.get_property("TZID").and_then(Property::as_text),
            Some("America/New_York")
        );
        let standard = tz.children_of_kind(ComponentKind::Standard);
        assert_eq!(standard.len(), 1);
        let offset = standard[0].get_property("TZOFFSETTO").unwrap();
        assert_eq!(
            offset.value,
            Value::UtcOffset(crate::rfc::ical::core::UtcOffset::from_seconds(-5 * 3600))
        );
    }

    #[test]
    fn parse_multiple_events() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:event1@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
SUMMARY:Event 1\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:event2@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260124T090000Z\r\n\
SUMMARY:Event 2\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let events = ical.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].uid(), Some("event1@example.com"));
        assert_eq!(events[1].uid(), Some("event2@example.com"));
    }

    #[test]
    fn parse_with_escaped_text() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:escaped@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
SUMMARY:Meeting\\, important\r\n\
DESCRIPTION:Line 1\\nLine 2\\nLine 3\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];

        assert_eq!(event.summary(), Some("Meeting, important"));
        assert_eq!(
            event.get_property("DESCRIPTION").and_then(Property::as_text),
            Some("Line 1\nLine 2\nLine 3")
        );
    }

    #[test]
    fn parse_with_folded_lines() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:folded@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
SUMMARY:This is a very long summary that needs to be folded across\r\n\
  multiple lines to comply with the 75 octet limit\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];

        let summary = event.summary().unwrap();
        assert!(summary.contains("folded across"));
        assert!(summary.contains("multiple lines"));
    }

    #[test]
    fn parse_missing_begin() {
        let input = "VERSION:2.0\r\n";
        let result = parse(input);
        assert_eq!(result.unwrap_err().kind, ParseErrorKind::MissingBegin);
    }

    #[test]
    fn parse_missing_end() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\n";
        let result = parse(input);
        assert_eq!(result.unwrap_err().kind, ParseErrorKind::MissingEnd);
    }

    #[test]
    fn parse_mismatched_end() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
END:VEVENT\r\n";
        let result = parse(input);
        assert_eq!(
            result.unwrap_err().kind,
            ParseErrorKind::MismatchedComponent
        );
    }

    #[test]
    fn parse_preserves_x_properties() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:xprop@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
X-CUSTOM-PROP:Custom Value\r\n\
X-APPLE-STRUCTURED-LOCATION:geo:37.7749\\,-122.4194\r\n\
SUMMARY:Event\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];

        let x_custom = event.get_property("X-CUSTOM-PROP").unwrap();
        assert_eq!(x_custom.as_text(), Some("Custom Value"));

        let x_apple = event.get_property("X-APPLE-STRUCTURED-LOCATION").unwrap();
        assert!(x_apple.raw_value.contains("geo:"));
    }

    #[test]
    fn parse_datetime_list() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:exdate@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
RRULE:FREQ=DAILY;COUNT=10\r\n\
EXDATE:20260125T090000Z,20260127T090000Z,20260129T090000Z\r\n\
SUMMARY:Event with excluded dates\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];

        let exdate = event.get_property("EXDATE").unwrap();
        let datetime_list = exdate.value.as_datetime_list().unwrap();

        assert_eq!(datetime_list.len(), 3);
        assert_eq!(datetime_list[0].day, 25);
        assert_eq!(datetime_list[1].day, 27);
        assert_eq!(datetime_list[2].day, 29);
    }

    #[test]
    fn parse_date_list() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:rdate@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART;VALUE=DATE:20260123\r\n\
RDATE;VALUE=DATE:20260125,20260127,20260130\r\n\
SUMMARY:Event with additional dates\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];

        let dtstart = event.get_property("DTSTART").unwrap();
        assert_eq!(dtstart.as_date(), Some(&Date::new(2026, 1, 23)));

        let rdate = event.get_property("RDATE").unwrap();
        let date_list = rdate.value.as_date_list().unwrap();
        assert_eq!(date_list.len(), 3);
        assert_eq!(date_list[2].day, 30);
    }

    #[test]
    fn parse_binary_base64() {
        // "Hello World" in Base64 is "SGVsbG8gV29ybGQ="
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:binary-test@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T140000Z\r\n\
ATTACH;ENCODING=BASE64;VALUE=BINARY:SGVsbG8gV29ybGQ=\r\n\
SUMMARY:Binary Test\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let ical = parse(input).unwrap();
        let event = &ical.events()[0];
        let attach = event.get_property("ATTACH").unwrap();

        match &attach.value {
            Value::Binary(data) => assert_eq!(data, b"Hello World"),
            other => panic!("expected Binary, got {other:?}"),
        }
    }
}
