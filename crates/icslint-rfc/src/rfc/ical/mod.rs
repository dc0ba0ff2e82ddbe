//! iCalendar (RFC 5545) support.
//!
//! The `core` module holds the document model the validation engine
//! consumes read-only; `parse` turns raw text into that model; `timezone`
//! resolves date-time values to absolute instants.

pub mod core;
pub mod parse;
pub mod timezone;
