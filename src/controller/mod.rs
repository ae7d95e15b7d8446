//! Controllers and request routing.
//!
//! A [`Dispatcher`] routes each request to the controller owning the longest
//! matching path prefix. [`DomainController`] takes the command name from
//! the request; [`FileDownloadController`] always runs `download` with an id
//! taken from the path. Both share one pipeline: gate, resolve, execute,
//! commit, audit.

mod dispatcher;
mod domain;
mod file;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::audit::AuditSink;
use crate::auth::SessionStore;
use crate::protocol::{HttpRequest, HttpResponse};
use crate::templates::ViewRenderer;

pub use dispatcher::{Dispatcher, HOME_LOCATION};
pub use domain::DomainController;
pub use file::FileDownloadController;

/// Entry point for one path prefix.
pub trait Controller: Send + Sync {
    /// Path prefix owned by this controller (e.g. `/user/order`).
    fn prefix(&self) -> &str;

    /// Handle one request routed to this prefix.
    fn handle(&self, request: HttpRequest) -> HttpResponse;
}

/// Collaborators shared by every controller.
#[derive(Clone)]
pub struct ControllerEnv {
    pub sessions: Arc<dyn SessionStore>,
    pub views: Arc<dyn ViewRenderer>,
    pub audit: Arc<dyn AuditSink>,
    /// Where gated requests without a suitable session are sent.
    pub login_path: String,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl ControllerEnv {
    /// `Set-Cookie` value binding the client to `session_id`.
    pub fn session_cookie(&self, session_id: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.cookie_name, session_id
        )
    }
}
