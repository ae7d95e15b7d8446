//! Modify account command.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, SessionUser, USER_ATTRIBUTE};
use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::{AuthErrorKind, DispatchError};
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{User, UserRepository};
use crate::validation::{validate_mobile_number, validate_password, validate_user_name};

const VIEW: &str = "user/modify";

/// Update the logged-in user's name, mobile number and optionally password.
///
/// Changing the password requires both `currentPassword` and `newPassword`.
pub struct ModifyCommand {
    users: Arc<dyn UserRepository>,
}

impl ModifyCommand {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    fn apply(&self, ctx: &ExecutionContext, account: &mut User) -> Result<(), DispatchError> {
        if let Some(name) = ctx.param("userName") {
            account.user_name = validate_user_name(name)?.to_string();
        }
        if let Some(mobile) = ctx.param("mobileNumber") {
            account.mobile_number = Some(validate_mobile_number(mobile)?.to_string());
        }

        match (ctx.raw_param("currentPassword"), ctx.raw_param("newPassword")) {
            (None, None) => {}
            (Some(current), Some(new)) => {
                if !verify_password(current, &account.password_hash) {
                    return Err(DispatchError::Auth {
                        kind: AuthErrorKind::InvalidCredentials,
                    });
                }
                account.password_hash = hash_password(validate_password(new)?)?;
            }
            _ => {
                return Err(DispatchError::invalid_parameter(
                    "newPassword",
                    "Enter both the current and the new password",
                ))
            }
        }

        self.users.update(account)
    }
}

impl Command for ModifyCommand {
    fn name(&self) -> &'static str {
        "modify"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(session_user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let mut account = self
            .users
            .find_by_id(&session_user.user_id)?
            .ok_or_else(|| DispatchError::not_found("User", &session_user.user_id))?;

        if ctx.is_post() {
            match self.apply(ctx, &mut account) {
                Ok(()) => {
                    let refreshed: SessionUser = account.to_session_user();
                    if let Some(session) = ctx.existing_session() {
                        session.set(USER_ATTRIBUTE, &refreshed)?;
                    }
                    info!(user_id = %account.user_id, "Account modified");
                    ctx.set_attribute("successMessage", "Account updated")?;
                }
                Err(e) => {
                    let Some(message) = e.user_message() else {
                        return Err(e);
                    };
                    warn!(user_id = %account.user_id, error = %e, "Account modification rejected");
                    ctx.set_attribute("errorMessage", message)?;
                    // Show what is stored, not the rejected input.
                    if let Some(stored) = self.users.find_by_id(&account.user_id)? {
                        account = stored;
                    }
                }
            }
        }

        ctx.set_attribute("account", &account)?;
        Ok(Outcome::forward(VIEW))
    }
}
