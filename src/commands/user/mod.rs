//! Account commands (`/user`).
//!
//! Commands for joining, logging in and out, modifying and withdrawing
//! accounts. The domain is public; commands that need a login check the
//! session themselves.

mod join;
mod login;
mod logout;
mod modify;
mod withdraw;

use std::sync::Arc;

use crate::protocol::HttpResponse;
use crate::services::ServiceRegistry;

use super::factory::CommandTable;

pub use join::JoinCommand;
pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use modify::ModifyCommand;
pub use withdraw::WithdrawCommand;

/// Command table for the `/user` domain.
pub fn user_commands(services: &ServiceRegistry) -> CommandTable {
    CommandTable::new(
        "user",
        vec![
            Arc::new(JoinCommand::new(services.users.clone())),
            Arc::new(LoginCommand::new(services.users.clone())),
            Arc::new(LogoutCommand),
            Arc::new(ModifyCommand::new(services.users.clone())),
            Arc::new(WithdrawCommand::new(services.users.clone())),
        ],
    )
}

/// Keep account forms out of browser and proxy caches.
fn set_no_cache(response: &mut HttpResponse) {
    response.set_header("Cache-Control", "no-cache, no-store, must-revalidate");
    response.set_header("Pragma", "no-cache");
    response.set_header("Expires", "0");
}
