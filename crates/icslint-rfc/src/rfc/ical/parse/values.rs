//! Value type parsers for iCalendar (RFC 5545 §3.3).
//!
//! Error sources are intentionally discarded during parsing (`map_err_ignore`);
//! the positioned [`ParseError`] kinds carry all the information a diagnostic
//! needs.
#![expect(
    clippy::map_err_ignore,
    reason = "Value parsers discard error sources; position and kind suffice"
)]

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{Date, DateTime, DateTimeForm, Duration, Time, UtcOffset};

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<Date> {
    if s.len() != 8 || !s.is_ascii() {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col));
    }

    let year = s[0..4]
        .parse::<u16>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDate, line, col))?;
    let month = s[4..6]
        .parse::<u8>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDate, line, col))?;
    let day = s[6..8]
        .parse::<u8>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDate, line, col))?;

    // Basic range validation; calendar validity is resolved later
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col));
    }

    Ok(Date { year, month, day })
}

/// Parses a TIME value (RFC 5545 §3.3.12).
///
/// Format: HHMMSS[Z] (e.g., "133000", "133000Z")
///
/// ## Errors
/// Returns an error if the string is not a valid 6-digit time.
pub fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<Time> {
    let (time_str, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };

    if time_str.len() != 6 || !time_str.is_ascii() {
        return Err(ParseError::new(ParseErrorKind::InvalidTime, line, col));
    }

    let hour = time_str[0..2]
        .parse::<u8>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidTime, line, col))?;
    let minute = time_str[2..4]
        .parse::<u8>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidTime, line, col))?;
    let second = time_str[4..6]
        .parse::<u8>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidTime, line, col))?;

    // Allow 60 for leap seconds
    if hour > 23 || minute > 59 || second > 60 {
        return Err(ParseError::new(ParseErrorKind::InvalidTime, line, col));
    }

    Ok(Time {
        hour,
        minute,
        second,
        is_utc,
    })
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Format: YYYYMMDD"T"HHMMSS[Z] (e.g., "19970714T133000Z")
///
/// The TZID, when present, comes from the property's parameter list, not
/// from the value itself.
///
/// ## Errors
/// Returns an error if the string is not a valid date-time format.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let t_pos = s
        .find('T')
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDateTime, line, col))?;

    let date = parse_date(&s[..t_pos], line, col)?;
    let time = parse_time(&s[t_pos + 1..], line, col + t_pos + 1)?;

    let form = if time.is_utc {
        DateTimeForm::Utc
    } else if let Some(tz) = tzid {
        DateTimeForm::Zoned {
            tzid: tz.to_string(),
        }
    } else {
        DateTimeForm::Floating
    };

    Ok(DateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        hour: time.hour,
        minute: time.minute,
        second: time.second,
        form,
    })
}

/// Parses a UTC-OFFSET value (RFC 5545 §3.3.14).
///
/// Format: (+|-)HHMM[SS] (e.g., "+0530", "-0800")
///
/// ## Errors
/// Returns an error if the string is not a valid UTC offset format.
pub fn parse_utc_offset(s: &str, line: usize, col: usize) -> ParseResult<UtcOffset> {
    if s.len() < 5 || !s.is_ascii() {
        return Err(ParseError::new(ParseErrorKind::InvalidUtcOffset, line, col));
    }

    let sign = match s.chars().next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Err(ParseError::new(ParseErrorKind::InvalidUtcOffset, line, col)),
    };

    let hours = s[1..3]
        .parse::<i32>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidUtcOffset, line, col))?;
    let minutes = s[3..5]
        .parse::<i32>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidUtcOffset, line, col))?;

    let seconds = if s.len() >= 7 {
        s[5..7]
            .parse::<i32>()
            .map_err(|_| ParseError::new(ParseErrorKind::InvalidUtcOffset, line, col))?
    } else {
        0
    };

    let total = sign * (hours * 3600 + minutes * 60 + seconds);
    Ok(UtcOffset::from_seconds(total))
}

/// Parses a DURATION value (RFC 5545 §3.3.6).
///
/// Format: [+|-]P[nW] or [+|-]P[nD][T[nH][nM][nS]]
///
/// ## Errors
/// Returns an error if the string is not a valid duration format.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<Duration> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDuration, line, col);

    let mut rest = s;
    let mut duration = Duration::zero();

    if let Some(stripped) = rest.strip_prefix('-') {
        duration.negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else {
        // No sign, duration is positive
    }

    rest = rest.strip_prefix('P').ok_or_else(invalid)?;

    let mut in_time = false;
    let mut saw_component = false;
    let mut digits = String::new();

    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if c == 'T' {
            if !digits.is_empty() {
                return Err(invalid());
            }
            in_time = true;
            continue;
        }

        let num: u32 = digits.parse().map_err(|_| invalid())?;
        match c {
            'W' if !in_time => duration.weeks = num,
            'D' if !in_time => duration.days = num,
            'H' if in_time => duration.hours = num,
            'M' if in_time => duration.minutes = num,
            'S' if in_time => duration.seconds = num,
            _ => return Err(invalid()),
        }
        saw_component = true;
        digits.clear();
    }

    // Trailing digits without a designator, or nothing after 'P'
    if !digits.is_empty() || !saw_component {
        return Err(invalid());
    }

    Ok(duration)
}

/// Unescapes text values (RFC 5545 §3.3.11).
///
/// Escape sequences: \\ \, \; \n \N
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => result.push('\n'),
                Some(',') => result.push(','),
                Some(';') => result.push(';'),
                Some('\\') | None => result.push('\\'),
                Some(other) => {
                    // Invalid escape, preserve as-is
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Parses a BOOLEAN value (RFC 5545 §3.3.2).
///
/// ## Errors
/// Returns an error if the string is not "TRUE" or "FALSE".
pub fn parse_boolean(s: &str, line: usize, col: usize) -> ParseResult<bool> {
    match s.to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(ParseError::new(ParseErrorKind::InvalidBoolean, line, col)),
    }
}

/// Parses an INTEGER value (RFC 5545 §3.3.8).
///
/// ## Errors
/// Returns an error if the string is not a valid integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    s.parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidInteger, line, col))
}

/// Parses a FLOAT value (RFC 5545 §3.3.7).
///
/// ## Errors
/// Returns an error if the string is not a valid floating-point number.
pub fn parse_float(s: &str, line: usize, col: usize) -> ParseResult<f64> {
    s.parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidFloat, line, col))
}
