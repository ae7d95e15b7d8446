//! Execution context handed to commands.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::{Session, SessionStore, SessionUser};
use crate::error::DispatchError;
use crate::protocol::{HttpRequest, Method, UploadedFile};

/// Default login location used when a context is built without one.
const DEFAULT_LOGIN_PATH: &str = "/user/login";

/// Request-scoped state for one command execution.
///
/// Holds the request, the session binding and the view model the
/// controller renders for [`crate::protocol::Outcome::Forward`].
pub struct ExecutionContext {
    /// Unique request ID for correlation.
    pub request_id: Uuid,
    /// Domain name of the controller (e.g. "user/order").
    pub domain: String,
    /// Resolved command name.
    pub command: String,
    request: HttpRequest,
    resource_id: Option<String>,
    login_path: String,
    sessions: Arc<dyn SessionStore>,
    /// Id of a live session bound to this request.
    session_id: Option<String>,
    /// Set when this request created a session the client must learn about.
    issued_session: Option<String>,
    model: Map<String, Value>,
}

impl ExecutionContext {
    /// Create a context for `request`.
    ///
    /// The session cookie is checked against the store once here; an
    /// unknown or expired id binds no session.
    pub fn new(
        request: HttpRequest,
        domain: impl Into<String>,
        command: impl Into<String>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let session_id = request
            .session_id()
            .filter(|id| sessions.touch(id))
            .map(str::to_string);

        Self {
            request_id: Uuid::new_v4(),
            domain: domain.into(),
            command: command.into(),
            request,
            resource_id: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            sessions,
            session_id,
            issued_session: None,
            model: Map::new(),
        }
    }

    /// Attach a resource identifier extracted from the URL path.
    pub fn with_resource_id(mut self, resource_id: Option<String>) -> Self {
        self.resource_id = resource_id;
        self
    }

    /// Set where unauthenticated users are sent.
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Use a fixed request id.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// The underlying request.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn method(&self) -> Method {
        self.request.method()
    }

    pub fn is_post(&self) -> bool {
        self.request.method() == Method::Post
    }

    /// Whether the request came from script (`X-Requested-With: XMLHttpRequest`).
    pub fn is_ajax(&self) -> bool {
        self.request
            .header("x-requested-with")
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
    }

    /// A parameter value, trimmed. Blank values read as absent.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.request
            .param(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// A parameter value, untrimmed. Used for passwords.
    pub fn raw_param(&self, key: &str) -> Option<&str> {
        self.request.param(key).filter(|v| !v.is_empty())
    }

    /// A required parameter.
    pub fn require_param(&self, key: &str) -> Result<&str, DispatchError> {
        self.param(key)
            .ok_or_else(|| DispatchError::missing_parameter(key))
    }

    /// An integer parameter. Unparsable values read as absent.
    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.param(key).and_then(|v| v.parse().ok())
    }

    /// Uploaded file for a form field.
    pub fn upload(&self, field: &str) -> Option<&UploadedFile> {
        self.request.upload(field)
    }

    /// Resource identifier from the URL path, if the controller extracts one.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Where unauthenticated users are sent.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// The session bound to this request, without creating one.
    pub fn existing_session(&self) -> Option<Session> {
        self.session_id
            .as_ref()
            .map(|id| Session::new(id.clone(), Arc::clone(&self.sessions)))
    }

    /// The bound session, creating one if `create` is set.
    pub fn session(&mut self, create: bool) -> Option<Session> {
        if self.session_id.is_none() && create {
            self.bind_new_session();
        }
        self.existing_session()
    }

    /// Replace any bound session with a fresh one.
    ///
    /// Used at login so a pre-login session id never becomes authenticated.
    pub fn renew_session(&mut self) -> Session {
        if let Some(id) = self.session_id.take() {
            self.sessions.invalidate(&id);
        }
        let id = self.bind_new_session();
        Session::new(id, Arc::clone(&self.sessions))
    }

    /// Drop the bound session, if any.
    pub fn invalidate_session(&mut self) {
        if let Some(id) = self.session_id.take() {
            self.sessions.invalidate(&id);
        }
        self.issued_session = None;
    }

    fn bind_new_session(&mut self) -> String {
        let id = self.sessions.create();
        self.session_id = Some(id.clone());
        self.issued_session = Some(id.clone());
        id
    }

    /// The authenticated user of the bound session.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.existing_session().and_then(|session| session.user())
    }

    /// Session id created during this request, to be sent as a cookie.
    pub fn issued_session_id(&self) -> Option<&str> {
        self.issued_session.as_deref()
    }

    /// Put a value into the view model.
    pub fn set_attribute<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), DispatchError> {
        self.model.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// A view model value.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.model.get(key)
    }

    /// The view model, with the current user under `user` unless a command set one.
    pub fn model(&self) -> Value {
        let mut model = self.model.clone();
        if !model.contains_key("user") {
            if let Some(user) = self.current_user() {
                if let Ok(value) = serde_json::to_value(user) {
                    model.insert("user".to_string(), value);
                }
            }
        }
        Value::Object(model)
    }
}
