//! Diagnostics shared by every stage of the translator.
//!
//! Node-level problems never abort translation: the front end and the passes
//! record a [`Diagnostic`] (inside an error placeholder node or in a pass's
//! warning list) and keep going. Only file-level upstream failures escape as
//! `Result` errors, in the crates that perform I/O.

pub mod codes;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod formatter;

pub use codes::{ErrorCode, Severity, UnknownCode};
pub use config::ErrorConfig;
pub use context::ErrorContext;
pub use diagnostic::{Diagnostic, DiagnosticCollector};
pub use formatter::DiagnosticFormatter;
