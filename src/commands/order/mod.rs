//! Order commands (`/user/order`).
//!
//! The domain sits behind the user gate; commands still read the session
//! user to scope every lookup to the caller's own orders.

mod cancel;
mod create;
mod detail;
mod form;
mod list;

use std::sync::Arc;

use crate::error::DispatchError;
use crate::services::{Basket, Order, OrderStore, ServiceRegistry};
use crate::validation::validate_order_id;

use super::factory::CommandTable;
use super::types::ExecutionContext;

pub use cancel::OrderCancelCommand;
pub use create::OrderCreateCommand;
pub use detail::OrderDetailCommand;
pub use form::OrderFormCommand;
pub use list::OrderListCommand;

/// Command table for the `/user/order` domain.
pub fn order_commands(services: &ServiceRegistry) -> CommandTable {
    CommandTable::new(
        "user/order",
        vec![
            Arc::new(OrderFormCommand::new(services.baskets.clone())),
            Arc::new(OrderCreateCommand::new(
                services.baskets.clone(),
                services.products.clone(),
                services.orders.clone(),
            )),
            Arc::new(OrderListCommand::new(services.orders.clone())),
            Arc::new(OrderDetailCommand::new(services.orders.clone())),
            Arc::new(OrderCancelCommand::new(
                services.orders.clone(),
                services.products.clone(),
            )),
        ],
    )
}

/// Location of an order's detail page.
fn detail_location(order_id: &str) -> String {
    format!("/user/order/detail.do?orderId={}", order_id)
}

/// Put a basket and its totals into the view model.
fn set_basket_model(ctx: &mut ExecutionContext, basket: &Basket) -> Result<(), DispatchError> {
    let total = basket.total_amount();
    let delivery_fee = basket.delivery_fee();
    ctx.set_attribute("basket", basket)?;
    ctx.set_attribute("totalAmount", total)?;
    ctx.set_attribute("deliveryFee", delivery_fee)?;
    ctx.set_attribute("paymentAmount", total + u64::from(delivery_fee))?;
    Ok(())
}

/// The `orderId` order, if it exists and belongs to `user_id`.
///
/// Other users' orders read as absent so their existence is not revealed.
fn owned_order(
    orders: &dyn OrderStore,
    ctx: &ExecutionContext,
    user_id: &str,
) -> Result<Option<Order>, DispatchError> {
    let Some(order_id) = ctx.param("orderId") else {
        return Ok(None);
    };
    let Ok(order_id) = validate_order_id(order_id) else {
        return Ok(None);
    };
    Ok(orders.find(order_id)?.filter(|order| order.user_id == user_id))
}
