//! Audit logging module.
//!
//! Every dispatched request produces one structured [`AuditEntry`]. Entries
//! are written as JSON lines by [`AuditLogger`]; [`NullAuditLogger`] drops
//! them when auditing is disabled.
//!
//! ## Features
//!
//! - Domain, command, acting user, outcome and timing per request
//! - Automatic parameter sanitization (redacting credentials)
//! - Truncation of long free-text fields

mod entry;
mod logger;
mod sanitize;

pub use entry::{AuditEntry, AuditResult};
pub use logger::{AuditLogger, AuditSink, NullAuditLogger};
pub use sanitize::sanitize_params;
