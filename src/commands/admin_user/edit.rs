//! Admin account editing.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Method, Outcome};
use crate::services::{User, UserRepository, UserRole, UserStatus};
use crate::validation::{validate_mobile_number, validate_user_name};

const VIEW: &str = "admin/user/edit";

/// GET shows account `userId`, POST updates its name, mobile number, role
/// (`userType`) and status.
///
/// Admins cannot demote or withdraw their own account.
pub struct AdminUserEditCommand {
    users: Arc<dyn UserRepository>,
}

impl AdminUserEditCommand {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    fn save(&self, ctx: &ExecutionContext, account: &mut User) -> Result<(), DispatchError> {
        if let Some(name) = ctx.param("userName") {
            account.user_name = validate_user_name(name)?.to_string();
        }
        account.mobile_number = match ctx.param("mobileNumber") {
            Some(mobile) => Some(validate_mobile_number(mobile)?.to_string()),
            None => None,
        };

        let role = match ctx.param("userType") {
            Some(raw) => UserRole::parse(raw)
                .ok_or_else(|| DispatchError::invalid_parameter("userType", "Unknown user type"))?,
            None => account.role,
        };
        if let Some(raw) = ctx.param("status") {
            account.status = UserStatus::parse(raw)
                .ok_or_else(|| DispatchError::invalid_parameter("status", "Unknown account status"))?;
        }

        let is_self = ctx
            .current_user()
            .is_some_and(|admin| admin.user_id == account.user_id);
        if is_self && (role != UserRole::Admin || account.is_withdrawn()) {
            return Err(DispatchError::invalid_parameter(
                "userType",
                "You cannot remove your own admin access",
            ));
        }

        self.users.update(account)?;
        if role != account.role {
            self.users.update_role(&account.user_id, role)?;
            account.role = role;
        }
        Ok(())
    }
}

impl Command for AdminUserEditCommand {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if ctx.method() == Method::Other {
            response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Unsupported method");
            return Ok(Outcome::Handled);
        }

        let account = match ctx.param("userId") {
            Some(user_id) => self.users.find_by_id(user_id)?,
            None => None,
        };
        let Some(mut account) = account else {
            response.send_error(StatusCode::NOT_FOUND, "User not found");
            return Ok(Outcome::Handled);
        };

        if ctx.is_post() {
            match self.save(ctx, &mut account) {
                Ok(()) => {
                    info!(user_id = %account.user_id, role = ?account.role, status = ?account.status, "Account updated by admin");
                    ctx.set_attribute("successMessage", "Account updated")?;
                }
                Err(e) => {
                    let Some(message) = e.user_message() else {
                        return Err(e);
                    };
                    warn!(user_id = %account.user_id, error = %e, "Admin account update rejected");
                    ctx.set_attribute("errorMessage", message)?;
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
