//! Login command.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{verify_password, ADMIN_ATTRIBUTE, USER_ATTRIBUTE};
use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::{AuthErrorKind, DispatchError};
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{User, UserRepository};
use crate::validation::local_redirect_target;

use super::set_no_cache;

const VIEW: &str = "user/login";

/// Authenticate with email and password.
///
/// A successful login replaces any existing session with a new one holding
/// the user and the administrator flag, then returns to the `next` page if
/// the form carried a local one.
pub struct LoginCommand {
    users: Arc<dyn UserRepository>,
}

impl LoginCommand {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<User, DispatchError> {
        let user = self
            .users
            .find_by_email(email)?
            .ok_or(DispatchError::Auth {
                kind: AuthErrorKind::InvalidCredentials,
            })?;

        if user.is_withdrawn() {
            return Err(DispatchError::Auth {
                kind: AuthErrorKind::AccountWithdrawn,
            });
        }

        if !verify_password(password, &user.password_hash) {
            return Err(DispatchError::Auth {
                kind: AuthErrorKind::InvalidCredentials,
            });
        }

        Ok(user)
    }
}

/// Where to go after login. Off-site targets and the login page itself are
/// dropped.
fn return_target(ctx: &ExecutionContext) -> Option<String> {
    let target = ctx.param("next").and_then(local_redirect_target)?;
    let path = target.split('?').next().unwrap_or(target);
    if path == ctx.login_path() {
        return None;
    }
    Some(target.to_string())
}

impl Command for LoginCommand {
    fn name(&self) -> &'static str {
        "login"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let next = return_target(ctx);

        if !ctx.is_post() {
            if ctx.current_user().is_some() {
                return Ok(Outcome::redirect(next.unwrap_or_else(|| "/".to_string())));
            }
            if let Some(next) = &next {
                ctx.set_attribute("next", next)?;
            }
            set_no_cache(response);
            return Ok(Outcome::forward(VIEW));
        }

        if let Some(next) = &next {
            ctx.set_attribute("next", next)?;
        }

        let (Some(email), Some(password)) = (ctx.param("email"), ctx.raw_param("password")) else {
            ctx.set_attribute("errorMessage", "Enter both email and password")?;
            return Ok(Outcome::forward(VIEW));
        };
        let email = email.to_string();

        match self.authenticate(&email, password) {
            Ok(user) => {
                let session = ctx.renew_session();
                session.set(USER_ATTRIBUTE, &user.to_session_user())?;
                session.set(ADMIN_ATTRIBUTE, &user.is_admin())?;
                info!(user_id = %user.user_id, is_admin = user.is_admin(), "Login succeeded");
                Ok(Outcome::redirect(next.unwrap_or_else(|| "/".to_string())))
            }
            Err(DispatchError::Auth { kind }) if !matches!(kind, AuthErrorKind::PasswordHash { .. }) => {
                warn!(email = %email, reason = %kind, "Login failed");
                ctx.set_attribute("errorMessage", kind.to_string())?;
                ctx.set_attribute("email", &email)?;
                Ok(Outcome::forward(VIEW))
            }
            Err(e) => Err(e),
        }
    }
}
