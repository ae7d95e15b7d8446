//! Buffered response written by commands and committed by controllers.

use axum::http::StatusCode;
use tracing::debug;

/// Client-facing text for an error status.
///
/// Internal failure detail never reaches the client; it is logged
/// server-side instead.
fn sanitize_error_message(status: StatusCode, message: &str) -> String {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
            message.to_string()
        }
        StatusCode::FORBIDDEN => "Access denied".to_string(),
        _ if status.is_server_error() => "Internal server error".to_string(),
        _ => "An error occurred".to_string(),
    }
}

/// A buffered HTTP response.
///
/// Nothing reaches the wire until the controller hands the response back to
/// the adapter, so a failed command's partial output can still be discarded
/// with [`HttpResponse::reset`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    committed: bool,
}

impl HttpResponse {
    /// Create an empty `200 OK` response.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: Vec::new(),
            committed: false,
        }
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Response body as text (lossy).
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether a final response (error, redirect, body) has been written.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Set the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Set a header, replacing any existing value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Append a header without replacing existing values.
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.push((name.to_string(), value.into()));
    }

    /// Set the `Content-Type` header.
    pub fn set_content_type(&mut self, content_type: &str) {
        self.set_header("content-type", content_type);
    }

    /// Append bytes to the body and mark the response committed.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
        self.committed = true;
    }

    /// Commit an error status with a short plain-text body.
    pub fn send_error(&mut self, status: StatusCode, message: &str) {
        let text = sanitize_error_message(status, message);
        debug!(status = status.as_u16(), message = %message, "Error response");

        self.body.clear();
        self.status = status;
        self.set_content_type("text/plain; charset=utf-8");
        self.body.extend_from_slice(text.as_bytes());
        self.committed = true;
    }

    /// Commit a `302 Found` redirect.
    pub fn send_redirect(&mut self, location: &str) {
        self.body.clear();
        self.status = StatusCode::FOUND;
        self.set_header("location", location);
        self.committed = true;
    }

    /// Commit a JSON body.
    pub fn send_json(&mut self, value: &serde_json::Value) {
        self.body.clear();
        self.set_content_type("application/json; charset=utf-8");
        self.body.extend_from_slice(value.to_string().as_bytes());
        self.committed = true;
    }

    /// Commit a rendered HTML page.
    pub fn send_html(&mut self, html: String) {
        self.body.clear();
        self.status = StatusCode::OK;
        self.set_content_type("text/html; charset=utf-8");
        self.body = html.into_bytes();
        self.committed = true;
    }

    /// Split into status, headers and body for the wire.
    pub fn into_parts(self) -> (StatusCode, Vec<(String, String)>, Vec<u8>) {
        (self.status, self.headers, self.body)
    }

    /// Discard everything written so far.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}
