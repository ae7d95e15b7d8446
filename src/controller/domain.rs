//! Domain controller and the per-request pipeline.

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

use crate::audit::{sanitize_params, AuditEntry, AuditResult};
use crate::auth::{Access, AuthGate, AuthRequirement};
use crate::commands::{CommandFactory, ExecutionContext};
use crate::error::DispatchError;
use crate::protocol::{HttpRequest, HttpResponse, Method, Outcome};

use super::{Controller, ControllerEnv};

/// Where a request is in its lifecycle. Early exits jump straight to
/// `ResponseCommitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    AuthChecked,
    CommandResolved,
    Executed,
    ResponseCommitted,
}

/// Gate, resolve, execute and commit for one domain.
pub(super) struct Pipeline {
    domain: String,
    factory: Box<dyn CommandFactory>,
    gate: Option<AuthGate>,
    env: Arc<ControllerEnv>,
}

impl Pipeline {
    pub(super) fn new(domain: String, factory: Box<dyn CommandFactory>, env: Arc<ControllerEnv>) -> Self {
        Self {
            domain,
            factory,
            gate: None,
            env,
        }
    }

    pub(super) fn set_gate(&mut self, requirement: AuthRequirement) {
        self.gate = Some(AuthGate::new(requirement));
    }

    pub(super) fn gate(&self) -> Option<AuthRequirement> {
        self.gate.map(|gate| gate.requirement())
    }

    pub(super) fn domain(&self) -> &str {
        &self.domain
    }

    pub(super) fn factory(&self) -> &dyn CommandFactory {
        self.factory.as_ref()
    }

    /// Handle one request and return the committed response.
    pub(super) fn run(
        &self,
        request: HttpRequest,
        name: Option<String>,
        resource_id: Option<String>,
    ) -> HttpResponse {
        let start_time = Instant::now();
        let params = request.params_json();

        let mut ctx = ExecutionContext::new(
            request,
            self.domain.clone(),
            name.clone().unwrap_or_default(),
            Arc::clone(&self.env.sessions),
        )
        .with_login_path(self.env.login_path.clone())
        .with_resource_id(resource_id);
        let request_id = ctx.request_id;

        debug!(
            request_id = %request_id,
            domain = %self.domain,
            command = name.as_deref().unwrap_or(""),
            stage = ?Stage::Received,
            "Received request"
        );

        let user_before = ctx.current_user().map(|user| user.user_id);
        let mut response = HttpResponse::new();
        let (result, audit) = self.drive(&mut ctx, &mut response, name.as_deref());

        if let Some(session_id) = ctx.issued_session_id() {
            response.append_header("set-cookie", self.env.session_cookie(session_id));
        }

        if audit {
            // After login the new user is known; after logout the old one is.
            let user_id = ctx.current_user().map(|user| user.user_id).or(user_before);
            let entry = AuditEntry::new(
                request_id,
                self.domain.clone(),
                name,
                sanitize_params(&params),
                user_id,
                result,
                start_time.elapsed().as_millis() as u64,
            );
            if let Err(e) = self.env.audit.log(&entry) {
                error!(error = %e, "Failed to write audit log entry");
            }
        }

        response
    }

    /// Walk the request through the stages. Returns the audit result and
    /// whether it must be recorded.
    fn drive(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
        name: Option<&str>,
    ) -> (AuditResult, bool) {
        if let Some(gate) = &self.gate {
            let session = ctx.existing_session();
            if gate.check(session.as_ref()) == Access::Denied {
                if session.as_ref().is_some_and(|s| s.user().is_some()) {
                    warn!(
                        request_id = %ctx.request_id,
                        domain = %self.domain,
                        requirement = ?gate.requirement(),
                        "Role not permitted for domain"
                    );
                    response.send_error(StatusCode::FORBIDDEN, "Administrators only");
                    return (AuditResult::Forbidden, true);
                }

                let location = self.login_location(ctx.request());
                info!(
                    request_id = %ctx.request_id,
                    domain = %self.domain,
                    requirement = ?gate.requirement(),
                    location = %location,
                    "Authentication required, redirecting to login"
                );
                response.send_redirect(&location);
                return (AuditResult::AuthDenied { location }, true);
            }
        }
        let mut stage = Stage::AuthChecked;

        let Some(command) = name.and_then(|name| self.factory.get_command(name)) else {
            debug!(
                request_id = %ctx.request_id,
                domain = %self.domain,
                command = name.unwrap_or(""),
                stage = ?stage,
                "Unknown command"
            );
            response.send_error(StatusCode::NOT_FOUND, "Unknown command");
            return (AuditResult::NotFound, true);
        };
        stage = Stage::CommandResolved;

        let result = command.execute(ctx, response).and_then(|outcome| {
            stage = Stage::Executed;
            self.commit(ctx, response, outcome)
        });

        match result {
            Ok(result) => {
                info!(
                    request_id = %ctx.request_id,
                    domain = %self.domain,
                    command = %ctx.command,
                    status = response.status().as_u16(),
                    stage = ?Stage::ResponseCommitted,
                    "Command executed"
                );
                (result, command.requires_audit())
            }
            Err(e) => {
                error!(
                    request_id = %ctx.request_id,
                    domain = %self.domain,
                    command = %ctx.command,
                    stage = ?stage,
                    error = %e,
                    "Command execution failed"
                );
                response.reset();
                response.send_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
                let failure = AuditResult::Failure {
                    error_code: e.code().to_string(),
                    error_message: e.to_string(),
                };
                (failure, true)
            }
        }
    }

    /// Login page URL carrying the page to return to. Only GETs are replayable,
    /// so other methods get the bare login path.
    fn login_location(&self, request: &HttpRequest) -> String {
        let login_path = &self.env.login_path;
        if request.method() != Method::Get {
            return login_path.clone();
        }

        let next = form_urlencoded::Serializer::new(String::new())
            .append_pair("next", &request.target())
            .finish();
        let separator = if login_path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", login_path, separator, next)
    }

    /// Turn an outcome into the final response.
    fn commit(
        &self,
        ctx: &ExecutionContext,
        response: &mut HttpResponse,
        outcome: Outcome,
    ) -> Result<AuditResult, DispatchError> {
        outcome.validate()?;

        if response.is_committed() && outcome != Outcome::Handled {
            return Err(DispatchError::malformed_directive(format!(
                "{} after the response was already committed",
                outcome.kind()
            )));
        }

        match outcome {
            Outcome::Forward(view) => {
                let html = self.env.views.render(&view, &ctx.model())?;
                response.send_html(html);
                Ok(AuditResult::Forward { view })
            }
            Outcome::Redirect(location) => {
                response.send_redirect(&location);
                Ok(AuditResult::Redirect { location })
            }
            Outcome::Handled => {
                if !response.is_committed() {
                    warn!(
                        request_id = %ctx.request_id,
                        command = %ctx.command,
                        "Command reported handled without writing a response"
                    );
                }
                Ok(AuditResult::Handled {
                    status_code: response.status().as_u16(),
                })
            }
        }
    }
}

/// Controller for one domain prefix whose command comes from the request.
///
/// The command name is the `command` parameter if present, otherwise the
/// single path segment after the prefix (`/user/order/list.do` gives
/// `list.do`).
pub struct DomainController {
    prefix: String,
    pipeline: Pipeline,
}

impl DomainController {
    /// Create a public controller for `prefix`.
    pub fn new(
        prefix: impl Into<String>,
        factory: impl CommandFactory + 'static,
        env: Arc<ControllerEnv>,
    ) -> Self {
        let prefix = prefix.into();
        let domain = prefix.trim_matches('/').to_string();
        Self {
            prefix,
            pipeline: Pipeline::new(domain, Box::new(factory), env),
        }
    }

    /// Require a session satisfying `requirement` before any command runs.
    pub fn with_gate(mut self, requirement: AuthRequirement) -> Self {
        self.pipeline.set_gate(requirement);
        self
    }

    /// Domain name used in logs and audit entries (prefix without slashes).
    pub fn domain(&self) -> &str {
        self.pipeline.domain()
    }

    /// The gate requirement, if the domain is protected.
    pub fn requirement(&self) -> Option<AuthRequirement> {
        self.pipeline.gate()
    }

    /// Names this controller can resolve.
    pub fn command_names(&self) -> Vec<&'static str> {
        self.pipeline.factory().command_names()
    }

    /// Extract the command name from a request.
    ///
    /// Empty names and names spanning several path segments yield `None`.
    pub fn command_name(&self, request: &HttpRequest) -> Option<String> {
        let name = match request.param("command").map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => {
                let rest = request.path().strip_prefix(self.prefix.as_str())?;
                rest.strip_prefix('/').unwrap_or(rest)
            }
        };

        if name.is_empty() || name.contains('/') {
            None
        } else {
            Some(name.to_string())
        }
    }
}

impl Controller for DomainController {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn handle(&self, request: HttpRequest) -> HttpResponse {
        let name = self.command_name(&request);
        self.pipeline.run(request, name, None)
    }
}
