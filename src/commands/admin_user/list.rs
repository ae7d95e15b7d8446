//! Admin account listing.

use std::sync::Arc;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::UserRepository;

/// List accounts, optionally filtered by a `keyword` matched against name and email.
pub struct AdminUserListCommand {
    users: Arc<dyn UserRepository>,
}

impl AdminUserListCommand {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

impl Command for AdminUserListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let keyword = ctx.param("keyword").map(str::to_lowercase);
        let users: Vec<_> = self
            .users
            .list()?
            .into_iter()
            .filter(|user| {
                keyword.as_deref().map_or(true, |k| {
                    user.email.to_lowercase().contains(k) || user.user_name.to_lowercase().contains(k)
                })
            })
            .collect();

        ctx.set_attribute("users", &users)?;
        ctx.set_attribute("keyword", keyword)?;
        Ok(Outcome::forward("admin/user/list"))
    }
}
