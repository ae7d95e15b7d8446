//! Withdraw account command.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::verify_password;
use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{UserRepository, UserStatus};

const VIEW: &str = "user/withdraw";

/// Close the logged-in user's account.
///
/// Requires the password and `confirmWithdraw=yes`. The account is marked
/// withdrawn and the session invalidated.
pub struct WithdrawCommand {
    users: Arc<dyn UserRepository>,
}

impl WithdrawCommand {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

impl Command for WithdrawCommand {
    fn name(&self) -> &'static str {
        "withdraw"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(session_user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        if !ctx.is_post() {
            return Ok(Outcome::forward(VIEW));
        }

        let Some(password) = ctx.raw_param("password").map(str::to_string) else {
            ctx.set_attribute("errorMessage", "Enter your password")?;
            return Ok(Outcome::forward(VIEW));
        };

        if ctx.param("confirmWithdraw") != Some("yes") {
            ctx.set_attribute("errorMessage", "Confirm that you want to withdraw")?;
            return Ok(Outcome::forward(VIEW));
        }

        let mut account = self
            .users
            .find_by_id(&session_user.user_id)?
            .ok_or_else(|| DispatchError::not_found("User", &session_user.user_id))?;

        if !verify_password(&password, &account.password_hash) {
            warn!(user_id = %account.user_id, "Withdrawal rejected: wrong password");
            ctx.set_attribute("errorMessage", "Password does not match")?;
            return Ok(Outcome::forward(VIEW));
        }

        account.status = UserStatus::Withdrawn;
        self.users.update(&account)?;
        ctx.invalidate_session();

        info!(user_id = %account.user_id, "Account withdrawn");
        Ok(Outcome::redirect(format!(
            "{}?withdrawn=true",
            ctx.login_path()
        )))
    }
}
