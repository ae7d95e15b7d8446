//! Basket commands (`/user/basket.do`).
//!
//! Resolved by [`BasketCommandFactory`], which maps names onto the closed
//! [`BasketAction`] set instead of a table.

mod add;
mod clear;
mod delete;
mod list;
mod update;

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::commands::factory::CommandFactory;
use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::ServiceRegistry;

pub use add::BasketAddCommand;
pub use clear::BasketClearCommand;
pub use delete::BasketDeleteCommand;
pub use list::BasketListCommand;
pub use update::BasketUpdateCommand;

/// Where basket mutations send the browser afterwards.
pub(crate) const BASKET_PAGE: &str = "/user/basket.do?command=list";

/// Answer a basket mutation.
///
/// Script requests get `{"success": .., "message": ..}` plus any extra
/// fields; others go back to the basket page, or to the error view when the
/// input was rejected. Internal failures propagate.
fn finish(
    ctx: &mut ExecutionContext,
    response: &mut HttpResponse,
    result: Result<Map<String, Value>, DispatchError>,
    success_message: &str,
) -> Result<Outcome, DispatchError> {
    let (success, message, extra) = match result {
        Ok(extra) => (true, success_message.to_string(), extra),
        Err(e) => {
            let Some(message) = e.user_message() else {
                return Err(e);
            };
            warn!(domain = %ctx.domain, command = %ctx.command, error = %e, "Basket request rejected");
            (false, message, Map::new())
        }
    };

    if ctx.is_ajax() {
        let mut body = json!({ "success": success, "message": message });
        if let Value::Object(fields) = &mut body {
            fields.extend(extra);
        }
        response.send_json(&body);
        return Ok(Outcome::Handled);
    }

    if success {
        Ok(Outcome::redirect(BASKET_PAGE))
    } else {
        ctx.set_attribute("errorMessage", message)?;
        Ok(Outcome::forward("common/error"))
    }
}

/// Basket operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasketAction {
    List,
    Add,
    Update,
    Delete,
    Clear,
}

impl BasketAction {
    pub const ALL: [BasketAction; 5] = [
        BasketAction::List,
        BasketAction::Add,
        BasketAction::Update,
        BasketAction::Delete,
        BasketAction::Clear,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "list" => Some(BasketAction::List),
            "add" => Some(BasketAction::Add),
            "update" => Some(BasketAction::Update),
            "delete" => Some(BasketAction::Delete),
            "clear" => Some(BasketAction::Clear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BasketAction::List => "list",
            BasketAction::Add => "add",
            BasketAction::Update => "update",
            BasketAction::Delete => "delete",
            BasketAction::Clear => "clear",
        }
    }
}

/// Switch-based factory for the basket domain.
pub struct BasketCommandFactory {
    list: Arc<dyn Command>,
    add: Arc<dyn Command>,
    update: Arc<dyn Command>,
    delete: Arc<dyn Command>,
    clear: Arc<dyn Command>,
}

impl BasketCommandFactory {
    pub fn new(services: &ServiceRegistry) -> Self {
        Self {
            list: Arc::new(BasketListCommand::new(services.baskets.clone())),
            add: Arc::new(BasketAddCommand::new(
                services.baskets.clone(),
                services.products.clone(),
            )),
            update: Arc::new(BasketUpdateCommand::new(services.baskets.clone())),
            delete: Arc::new(BasketDeleteCommand::new(services.baskets.clone())),
            clear: Arc::new(BasketClearCommand::new(services.baskets.clone())),
        }
    }

    fn command_for(&self, action: BasketAction) -> &Arc<dyn Command> {
        match action {
            BasketAction::List => &self.list,
            BasketAction::Add => &self.add,
            BasketAction::Update => &self.update,
            BasketAction::Delete => &self.delete,
            BasketAction::Clear => &self.clear,
        }
    }
}

impl CommandFactory for BasketCommandFactory {
    fn get_command(&self, name: &str) -> Option<Arc<dyn Command>> {
        BasketAction::parse(name).map(|action| Arc::clone(self.command_for(action)))
    }

    fn command_names(&self) -> Vec<&'static str> {
        BasketAction::ALL.iter().map(BasketAction::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::factory::CommandTable;

    #[test]
    fn test_every_action_resolves_to_its_command() {
        let dir = tempfile::tempdir().unwrap();
        let services = ServiceRegistry::in_memory(dir.path()).unwrap();
        let factory = BasketCommandFactory::new(&services);

        for action in BasketAction::ALL {
            let command = factory.get_command(action.as_str()).unwrap();
            assert_eq!(command.name(), action.as_str());
            assert!(Arc::ptr_eq(
                &command,
                &factory.get_command(action.as_str()).unwrap()
            ));
        }
        assert!(factory.get_command("checkout").is_none());
        assert!(factory.get_command("list.do").is_none());
    }

    #[test]
    fn test_switch_matches_equivalent_table() {
        let dir = tempfile::tempdir().unwrap();
        let services = ServiceRegistry::in_memory(dir.path()).unwrap();
        let factory = BasketCommandFactory::new(&services);
        let table = CommandTable::new(
            "user/basket.do",
            BasketAction::ALL
                .iter()
                .map(|action| Arc::clone(factory.command_for(*action)))
                .collect(),
        );

        for name in ["list", "add", "update", "delete", "clear", "nope", ""] {
            let from_switch = factory.get_command(name);
            let from_table = table.get_command(name);
            match (from_switch, from_table) {
                (Some(a), Some(b)) => assert!(Arc::ptr_eq(&a, &b)),
                (None, None) => {}
                _ => panic!("factories disagree on '{}'", name),
            }
        }
        assert_eq!(table.command_names().len(), factory.command_names().len());
    }
}
