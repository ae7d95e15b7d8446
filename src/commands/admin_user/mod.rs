//! Admin account management (`/admin/user`).

mod edit;
mod list;

use std::sync::Arc;

use crate::services::ServiceRegistry;

use super::factory::CommandTable;

pub use edit::AdminUserEditCommand;
pub use list::AdminUserListCommand;

/// Command table for the `/admin/user` domain.
pub fn admin_user_commands(services: &ServiceRegistry) -> CommandTable {
    CommandTable::new(
        "admin/user",
        vec![
            Arc::new(AdminUserListCommand::new(services.users.clone())),
            Arc::new(AdminUserEditCommand::new(services.users.clone())),
        ],
    )
}
