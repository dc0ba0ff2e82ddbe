//! iCalendar core models (RFC 5545).
//!
//! Read-only data structures for representing parsed iCalendar content.
//! Properties keep their raw value strings alongside the typed value so
//! diagnostics can cite what was actually written.

mod component;
mod datetime;
mod duration;
mod parameter;
mod property;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use datetime::{DateTime, DateTimeForm, Time, UtcOffset};
pub use duration::Duration;
pub use parameter::Parameter;
pub use property::{ContentLine, Property};
pub use value::{Date, Value};
