//! Order history command.

use std::sync::Arc;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::OrderStore;

/// List the caller's orders, newest first.
pub struct OrderListCommand {
    orders: Arc<dyn OrderStore>,
}

impl OrderListCommand {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }
}

impl Command for OrderListCommand {
    fn name(&self) -> &'static str {
        "list.do"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let orders = self.orders.list_by_user(&user.user_id)?;
        ctx.set_attribute("orders", &orders)?;
        Ok(Outcome::forward("order/list"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;
    use crate::services::UserRole;

    #[test]
    fn test_lists_only_own_orders() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        let other = fixture.add_user("lee@example.com", "Secret12", UserRole::Customer);
        let product = fixture.add_product("P-1", 1000, 5);
        fixture.place_order(&user.user_id, &product, 1);
        fixture.place_order(&other.user_id, &product, 2);
        fixture.place_order(&user.user_id, &product, 3);

        let command = OrderListCommand::new(fixture.services.orders.clone());
        let request = HttpRequest::get("/user/order/list.do").with_session_id(session);
        let mut ctx = fixture.context("user/order", "list.do", request);
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward("order/list"));
        let orders = ctx.attribute("orders").unwrap().as_array().unwrap().clone();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o["user_id"] == user.user_id.as_str()));
    }
}
