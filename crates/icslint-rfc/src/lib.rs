//! RFC 5545 layer for icslint.
//!
//! Contains the iCalendar document model, a lenient content-line parser,
//! timezone resolution for date-time values, and the validation rule
//! engine that inspects parsed documents.

pub mod rfc;
