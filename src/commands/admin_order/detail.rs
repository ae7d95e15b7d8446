//! Admin order detail.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{Order, OrderStatus, OrderStore};
use crate::validation::validate_order_id;

/// Every status an admin can pick, in lifecycle order.
const STATUSES: [OrderStatus; 6] = [
    OrderStatus::Placed,
    OrderStatus::Preparing,
    OrderStatus::Shipping,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
    OrderStatus::Refunded,
];

/// Show any order with the status change form.
pub struct AdminOrderDetailCommand {
    orders: Arc<dyn OrderStore>,
}

impl AdminOrderDetailCommand {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }
}

/// Look up the `orderId` order. Invalid ids read as absent.
pub(super) fn find_order(orders: &dyn OrderStore, ctx: &ExecutionContext) -> Result<Option<Order>, DispatchError> {
    match ctx.param("orderId").map(validate_order_id) {
        Some(Ok(order_id)) => orders.find(order_id),
        _ => Ok(None),
    }
}

/// Put an order and the status choices into the view model.
pub(super) fn set_order_model(ctx: &mut ExecutionContext, order: &Order) -> Result<(), DispatchError> {
    ctx.set_attribute("order", order)?;
    ctx.set_attribute("paymentAmount", order.total_amount())?;
    ctx.set_attribute("statuses", STATUSES)?;
    ctx.set_attribute("editable", !order.status.is_final())?;
    Ok(())
}

impl Command for AdminOrderDetailCommand {
    fn name(&self) -> &'static str {
        "detail"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(order) = find_order(self.orders.as_ref(), ctx)? else {
            response.send_error(StatusCode::NOT_FOUND, "Order not found");
            return Ok(Outcome::Handled);
        };

        let success = ctx.param("success").map(str::to_string);
        ctx.set_attribute("success", success)?;
        set_order_model(ctx, &order)?;
        Ok(Outcome::forward("admin/order/detail"))
    }
}
