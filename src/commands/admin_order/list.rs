//! Admin order listing.

use std::sync::Arc;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{OrderStatus, OrderStore, Page};

use super::ORDER_PAGE_SIZE;

/// Page through all orders, newest first, optionally filtered by `status`.
pub struct AdminOrderListCommand {
    orders: Arc<dyn OrderStore>,
}

impl AdminOrderListCommand {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }
}

impl Command for AdminOrderListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let status = ctx.param("status").and_then(OrderStatus::parse);
        let requested = ctx.param_i64("page").unwrap_or(1).max(1) as usize;

        let orders = self.orders.list(status)?;
        let total = orders.len();
        let bounds: Page<()> = Page::new(Vec::new(), requested, ORDER_PAGE_SIZE, total);
        let items = orders
            .into_iter()
            .skip((bounds.current_page - 1) * ORDER_PAGE_SIZE)
            .take(ORDER_PAGE_SIZE)
            .collect();
        let page = Page::new(items, bounds.current_page, ORDER_PAGE_SIZE, total);

        ctx.set_attribute("page", &page)?;
        ctx.set_attribute("status", status)?;
        Ok(Outcome::forward("admin/order/list"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;

    #[test]
    fn test_pages_and_filters() {
        let fixture = Fixture::new();
        let (user, _) = fixture.customer_session();
        let product = fixture.add_product("P-1", 1000, 50);
        for _ in 0..12 {
            fixture.place_order(&user.user_id, &product, 1);
        }
        let shipped = fixture.place_order(&user.user_id, &product, 1);
        fixture
            .services
            .orders
            .update_status(&shipped.order_id, OrderStatus::Shipping)
            .unwrap();

        let command = AdminOrderListCommand::new(fixture.services.orders.clone());
        let mut ctx = fixture.context(
            "admin/order",
            "list",
            HttpRequest::get("/admin/order/list").with_query("page=2"),
        );
        command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();
        let page = ctx.attribute("page").unwrap();
        assert_eq!(page["total_count"], 13);
        assert_eq!(page["items"].as_array().unwrap().len(), 3);

        let mut ctx = fixture.context(
            "admin/order",
            "list",
            HttpRequest::get("/admin/order/list").with_query("status=ORD3"),
        );
        command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();
        assert_eq!(ctx.attribute("page").unwrap()["total_count"], 1);
        assert_eq!(ctx.attribute("status").unwrap(), "shipping");
    }
}
