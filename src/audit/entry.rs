//! Audit entry types.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// A single audit log entry.
///
/// Records one dispatched request: where it went, who sent it, what the
/// controller committed and how long it took.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// RFC 3339 timestamp when the entry was created.
    pub timestamp: String,
    /// Unique identifier for the request.
    pub request_id: Uuid,
    /// Domain path of the controller (e.g., "user/order").
    pub domain: String,
    /// Resolved command name, if one was extracted.
    pub command: Option<String>,
    /// Sanitized request parameters.
    pub params: serde_json::Value,
    /// Id of the logged-in user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// What the controller committed.
    pub result: AuditResult,
    /// Handling duration in milliseconds.
    pub duration_ms: u64,
}

impl AuditEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(
        request_id: Uuid,
        domain: impl Into<String>,
        command: Option<String>,
        params: serde_json::Value,
        user_id: Option<String>,
        result: AuditResult,
        duration_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            request_id,
            domain: domain.into(),
            command,
            params,
            user_id,
            result,
            duration_ms,
        }
    }

    /// Whether this entry records a failed execution.
    pub fn is_failure(&self) -> bool {
        matches!(self.result, AuditResult::Failure { .. })
    }
}

/// Committed result of a request for audit purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditResult {
    /// A view was rendered.
    Forward { view: String },
    /// The client was redirected.
    Redirect { location: String },
    /// The command wrote the response itself.
    Handled { status_code: u16 },
    /// No command matched the request.
    NotFound,
    /// The auth gate sent an anonymous client to log in.
    AuthDenied { location: String },
    /// A logged-in user lacked the required role.
    Forbidden,
    /// Execution or commit failed.
    Failure {
        error_code: String,
        error_message: String,
    },
}
