//! Shared vocabulary for the icslint workspace.
//!
//! This crate defines the diagnostic types produced by validation, the
//! runtime configuration, and the core error type. It deliberately has no
//! knowledge of iCalendar itself.

pub mod config;
pub mod diagnostic;
pub mod error;

pub use diagnostic::{Diagnostic, Scope, Severity, ValidationResult};
pub use error::{CoreError, CoreResult};
