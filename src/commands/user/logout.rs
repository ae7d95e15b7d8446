//! Logout command.

use tracing::info;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};

/// End the current session. Idempotent: without a session it only redirects.
pub struct LogoutCommand;

impl Command for LogoutCommand {
    fn name(&self) -> &'static str {
        "logout"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if let Some(session) = ctx.existing_session() {
            if let Some(user) = session.user() {
                info!(user_id = %user.user_id, "User logged out");
            }
            ctx.invalidate_session();
        }

        Ok(Outcome::redirect("/"))
    }
}
