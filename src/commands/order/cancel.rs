//! Order cancellation command.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{error, info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{OrderStatus, OrderStore, ProductCatalog};

use super::{detail_location, owned_order};

/// Cancel one of the caller's orders and put its stock back.
///
/// Only orders that have not shipped yet can be cancelled; anything else
/// re-renders the detail page with a message.
pub struct OrderCancelCommand {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductCatalog>,
}

impl OrderCancelCommand {
    pub fn new(orders: Arc<dyn OrderStore>, products: Arc<dyn ProductCatalog>) -> Self {
        Self { orders, products }
    }
}

impl Command for OrderCancelCommand {
    fn name(&self) -> &'static str {
        "cancel.do"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if !ctx.is_post() {
            response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Orders are cancelled with POST");
            return Ok(Outcome::Handled);
        }
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let Some(order) = owned_order(self.orders.as_ref(), ctx, &user.user_id)? else {
            response.send_error(StatusCode::NOT_FOUND, "Order not found");
            return Ok(Outcome::Handled);
        };

        if !order.status.is_cancellable() {
            warn!(order_id = %order.order_id, status = order.status.code(), "Cancellation refused");
            ctx.set_attribute("errorMessage", "This order can no longer be cancelled")?;
            ctx.set_attribute("cancellable", false)?;
            ctx.set_attribute("paymentAmount", order.total_amount())?;
            ctx.set_attribute("order", &order)?;
            return Ok(Outcome::forward("order/detail"));
        }

        self.orders.update_status(&order.order_id, OrderStatus::Cancelled)?;
        for item in &order.items {
            if let Err(e) = self.products.release_stock(&item.product_code, item.quantity) {
                // The product may have been deleted since the order was placed.
                error!(order_id = %order.order_id, product_code = %item.product_code, error = %e, "Failed to restock");
            }
        }

        info!(user_id = %user.user_id, order_id = %order.order_id, "Order cancelled");
        Ok(Outcome::redirect(detail_location(&order.order_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;

    fn cancel_request(session: &str, order_id: &str) -> HttpRequest {
        HttpRequest::post("/user/order/cancel.do")
            .with_session_id(session)
            .with_form_body(format!("orderId={}", order_id).as_bytes())
    }

    #[test]
    fn test_cancel_releases_stock() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        let product = fixture.add_product("P-1", 1000, 5);
        let order = fixture.place_order(&user.user_id, &product, 2);

        let command = OrderCancelCommand::new(
            fixture.services.orders.clone(),
            fixture.services.products.clone(),
        );
        let mut ctx = fixture.context("user/order", "cancel.do", cancel_request(&session, &order.order_id));
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::redirect(detail_location(&order.order_id)));
        let stored = fixture.services.orders.find(&order.order_id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert_eq!(fixture.services.products.find("P-1").unwrap().unwrap().stock, 7);
    }

    #[test]
    fn test_shipped_order_not_cancellable() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        let product = fixture.add_product("P-1", 1000, 5);
        let order = fixture.place_order(&user.user_id, &product, 2);
        fixture
            .services
            .orders
            .update_status(&order.order_id, OrderStatus::Shipping)
            .unwrap();

        let command = OrderCancelCommand::new(
            fixture.services.orders.clone(),
            fixture.services.products.clone(),
        );
        let mut ctx = fixture.context("user/order", "cancel.do", cancel_request(&session, &order.order_id));
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward("order/detail"));
        assert!(ctx.attribute("errorMessage").is_some());
        assert_eq!(fixture.services.products.find("P-1").unwrap().unwrap().stock, 5);
    }

    #[test]
    fn test_get_not_allowed() {
        let fixture = Fixture::new();
        let (_, session) = fixture.customer_session();
        let command = OrderCancelCommand::new(
            fixture.services.orders.clone(),
            fixture.services.products.clone(),
        );
        let request = HttpRequest::get("/user/order/cancel.do").with_session_id(session);
        let mut ctx = fixture.context("user/order", "cancel.do", request);
        let mut response = HttpResponse::new();
        command.execute(&mut ctx, &mut response).unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
