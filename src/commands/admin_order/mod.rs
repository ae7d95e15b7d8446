//! Admin order management (`/admin/order`).
//!
//! Resolved by [`AdminOrderCommandFactory`], a switch over the closed
//! [`AdminOrderAction`] set.

mod detail;
mod list;
mod update;

use std::sync::Arc;

use crate::commands::factory::CommandFactory;
use crate::commands::traits::Command;
use crate::services::ServiceRegistry;

pub use detail::AdminOrderDetailCommand;
pub use list::AdminOrderListCommand;
pub use update::AdminOrderUpdateCommand;

/// Orders per page in the admin listing.
pub const ORDER_PAGE_SIZE: usize = 10;

/// Admin order operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOrderAction {
    List,
    Detail,
    Update,
}

impl AdminOrderAction {
    pub const ALL: [AdminOrderAction; 3] = [
        AdminOrderAction::List,
        AdminOrderAction::Detail,
        AdminOrderAction::Update,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "list" => Some(AdminOrderAction::List),
            "detail" => Some(AdminOrderAction::Detail),
            "update" => Some(AdminOrderAction::Update),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminOrderAction::List => "list",
            AdminOrderAction::Detail => "detail",
            AdminOrderAction::Update => "update",
        }
    }
}

/// Switch-based factory for the admin order domain.
pub struct AdminOrderCommandFactory {
    list: Arc<dyn Command>,
    detail: Arc<dyn Command>,
    update: Arc<dyn Command>,
}

impl AdminOrderCommandFactory {
    pub fn new(services: &ServiceRegistry) -> Self {
        Self {
            list: Arc::new(AdminOrderListCommand::new(services.orders.clone())),
            detail: Arc::new(AdminOrderDetailCommand::new(services.orders.clone())),
            update: Arc::new(AdminOrderUpdateCommand::new(services.orders.clone())),
        }
    }
}

impl CommandFactory for AdminOrderCommandFactory {
    fn get_command(&self, name: &str) -> Option<Arc<dyn Command>> {
        let command = match AdminOrderAction::parse(name)? {
            AdminOrderAction::List => &self.list,
            AdminOrderAction::Detail => &self.detail,
            AdminOrderAction::Update => &self.update,
        };
        Some(Arc::clone(command))
    }

    fn command_names(&self) -> Vec<&'static str> {
        AdminOrderAction::ALL.iter().map(AdminOrderAction::as_str).collect()
    }
}
