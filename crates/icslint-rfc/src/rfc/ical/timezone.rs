//! Timezone resolution and UTC conversion for iCalendar date-times.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone
//! canonicalization, then `chrono-tz` for the actual offset arithmetic.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

use super::core::{Date, DateTime as IcalDateTime, DateTimeForm, Property, Value};

/// Error during timezone conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Non-existent time during DST gap.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),

    /// The value does not name a valid calendar date or time.
    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),
}

/// Resolver for timezone identifiers.
///
/// Caches successful TZID resolutions. One resolver is scoped to one
/// validation call; nothing here is shared across documents.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    /// Cache of resolved IANA timezones by TZID as written.
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// The TZID is first normalized (vendor prefixes stripped, Windows
    /// display names mapped, IANA aliases canonicalized) and then parsed
    /// as an IANA timezone name.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be
    /// resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid);

        let tz = Tz::from_str(&normalized)
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }
}

/// Normalizes common CalDAV/iCalendar timezone identifiers to IANA names.
///
/// Uses ICU4X for Windows timezone ID mapping and IANA canonicalization.
/// Many calendar clients write non-standard TZID values that need to be
/// mapped to standard IANA timezone names.
fn normalize_tzid(tzid: &str) -> String {
    // Strip common prefixes
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    // Try Windows timezone mapping first using ICU
    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        // Get the canonical IANA name from the BCP-47 timezone ID
        let iana_parser = IanaParserExtended::new();
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    // Try IANA parser for canonicalization (handles aliases like Europe/Kiev -> Europe/Kyiv)
    let iana_parser = IanaParserExtended::new();
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    // Return as-is if not recognized
    stripped.to_string()
}

/// ## Summary
/// Converts a local datetime to UTC using the specified timezone.
///
/// Handles DST gaps (non-existent times) and folds (ambiguous times)
/// according to RFC 5545 semantics: gaps fail, folds take the first
/// occurrence.
///
/// ## Errors
///
/// Returns an error if the timezone cannot be resolved or the datetime
/// falls in a DST gap.
///
/// ## Side Effects
///
/// Updates the timezone resolver's cache if a new timezone is resolved.
pub fn convert_to_utc(
    local_time: NaiveDateTime,
    tzid: &str,
    resolver: &mut TimeZoneResolver,
) -> Result<DateTime<Utc>, ConversionError> {
    let tz = resolver.resolve(tzid)?;

    match tz.from_local_datetime(&local_time) {
        LocalResult::None => {
            // DST gap: the wall-clock time does not exist
            Err(ConversionError::NonExistentTime(format!(
                "{local_time} in timezone {tzid}"
            )))
        }
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt1, _dt2) => {
            // DST fold: RFC 5545 §3.3.5 uses the first occurrence
            Ok(dt1.with_timezone(&Utc))
        }
    }
}

/// ## Summary
/// Resolves a DATE-TIME value in any of its three forms to an absolute
/// UTC instant. Floating times are taken at face value (compared as if
/// UTC).
///
/// ## Errors
///
/// Returns an error if the components do not name a valid calendar
/// datetime or the zone cannot be resolved.
pub fn instant_of_datetime(
    dt: &IcalDateTime,
    resolver: &mut TimeZoneResolver,
) -> Result<DateTime<Utc>, ConversionError> {
    let naive = naive_of(dt).ok_or_else(|| ConversionError::InvalidDateTime(dt.to_string()))?;

    match &dt.form {
        DateTimeForm::Utc | DateTimeForm::Floating => {
            Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
        }
        DateTimeForm::Zoned { tzid } => convert_to_utc(naive, tzid, resolver),
    }
}

/// ## Summary
/// Resolves a date or date-time property value (DTSTART, DTEND) to an
/// absolute UTC instant, if possible. DATE values resolve to midnight.
///
/// Returns `None` for unresolvable values: malformed calendar dates,
/// unknown zones, DST gaps, or value kinds that carry no instant.
#[must_use]
pub fn instant_of(property: &Property, resolver: &mut TimeZoneResolver) -> Option<DateTime<Utc>> {
    match &property.value {
        Value::DateTime(dt) => instant_of_datetime(dt, resolver).ok(),
        Value::Date(d) => {
            let date = naive_date_of(*d)?;
            Some(DateTime::from_naive_utc_and_offset(
                date.and_time(NaiveTime::MIN),
                Utc,
            ))
        }
        _ => None,
    }
}

fn naive_of(dt: &IcalDateTime) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(
        i32::from(dt.year),
        u32::from(dt.month),
        u32::from(dt.day),
    )?;
    let time = NaiveTime::from_hms_opt(
        u32::from(dt.hour),
        u32::from(dt.minute),
        u32::from(dt.second),
    )?;
    Some(NaiveDateTime::new(date, time))
}

fn naive_date_of(d: Date) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::from(d.year), u32::from(d.month), u32::from(d.day))
}
