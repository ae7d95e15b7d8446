//! Admin order status update.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{OrderStatus, OrderStore};

use super::detail::find_order;

/// Move an order to `newStatus`.
///
/// Cancelled and refunded orders keep their status; re-submitting the same
/// final status is accepted as a no-op.
pub struct AdminOrderUpdateCommand {
    orders: Arc<dyn OrderStore>,
}

impl AdminOrderUpdateCommand {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }
}

fn reject(ctx: &mut ExecutionContext, message: &str) -> Result<Outcome, DispatchError> {
    ctx.set_attribute("errorMessage", message)?;
    Ok(Outcome::forward("common/error"))
}

impl Command for AdminOrderUpdateCommand {
    fn name(&self) -> &'static str {
        "update"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if !ctx.is_post() {
            response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Order status is changed with POST");
            return Ok(Outcome::Handled);
        }

        let Some(new_status) = ctx.param("newStatus").and_then(OrderStatus::parse) else {
            return reject(ctx, "An order id and a valid new status are required");
        };
        let Some(order) = find_order(self.orders.as_ref(), ctx)? else {
            return reject(ctx, "Order not found");
        };

        if order.status.is_final() && order.status != new_status {
            warn!(
                order_id = %order.order_id,
                from = order.status.code(),
                to = new_status.code(),
                "Status change refused for closed order"
            );
            return reject(ctx, "Cancelled or refunded orders cannot change status");
        }

        let updated = self.orders.update_status(&order.order_id, new_status)?;
        info!(
            order_id = %updated.order_id,
            from = order.status.code(),
            to = updated.status.code(),
            "Order status updated"
        );
        Ok(Outcome::redirect(format!(
            "/admin/order/detail?orderId={}&success=update",
            updated.order_id
        )))
    }
}
