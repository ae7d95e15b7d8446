//! Order detail command.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::OrderStore;

use super::owned_order;

/// Show one of the caller's orders.
pub struct OrderDetailCommand {
    orders: Arc<dyn OrderStore>,
}

impl OrderDetailCommand {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }
}

impl Command for OrderDetailCommand {
    fn name(&self) -> &'static str {
        "detail.do"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let Some(order) = owned_order(self.orders.as_ref(), ctx, &user.user_id)? else {
            response.send_error(StatusCode::NOT_FOUND, "Order not found");
            return Ok(Outcome::Handled);
        };

        ctx.set_attribute("cancellable", order.status.is_cancellable())?;
        ctx.set_attribute("paymentAmount", order.total_amount())?;
        ctx.set_attribute("order", &order)?;
        Ok(Outcome::forward("order/detail"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;
    use crate::services::UserRole;

    #[test]
    fn test_shows_own_order() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        let product = fixture.add_product("P-1", 1000, 5);
        let order = fixture.place_order(&user.user_id, &product, 2);

        let command = OrderDetailCommand::new(fixture.services.orders.clone());
        let request = HttpRequest::get("/user/order/detail.do")
            .with_query(&format!("orderId={}", order.order_id))
            .with_session_id(session);
        let mut ctx = fixture.context("user/order", "detail.do", request);
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward("order/detail"));
        assert_eq!(ctx.attribute("order").unwrap()["order_id"], order.order_id.as_str());
        assert_eq!(ctx.attribute("cancellable").unwrap(), true);
    }

    #[test]
    fn test_foreign_order_is_not_found() {
        let fixture = Fixture::new();
        let (_, session) = fixture.customer_session();
        let other = fixture.add_user("lee@example.com", "Secret12", UserRole::Customer);
        let product = fixture.add_product("P-1", 1000, 5);
        let order = fixture.place_order(&other.user_id, &product, 1);

        let command = OrderDetailCommand::new(fixture.services.orders.clone());
        for query in [format!("orderId={}", order.order_id), "orderId=../etc".to_string(), String::new()] {
            let request = HttpRequest::get("/user/order/detail.do")
                .with_query(&query)
                .with_session_id(session.clone());
            let mut ctx = fixture.context("user/order", "detail.do", request);
            let mut response = HttpResponse::new();
            let outcome = command.execute(&mut ctx, &mut response).unwrap();

            assert_eq!(outcome, Outcome::Handled);
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }
}
