//! Order placement command.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{error, info, warn};

use crate::commands::basket::BASKET_PAGE;
use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{
    Basket, BasketItem, BasketStore, DeliveryInfo, Order, OrderStore, ProductCatalog,
};
use crate::validation::{validate_mobile_number, validate_user_name};

use super::{detail_location, set_basket_model};

/// Longest accepted address, in characters.
const MAX_ADDRESS_LENGTH: usize = 200;

/// Place an order for the whole basket.
///
/// Stock is reserved for every line before the order is recorded. If any
/// line is short, reservations already taken are released and the form is
/// shown again.
pub struct OrderCreateCommand {
    baskets: Arc<dyn BasketStore>,
    products: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderStore>,
}

impl OrderCreateCommand {
    pub fn new(
        baskets: Arc<dyn BasketStore>,
        products: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            baskets,
            products,
            orders,
        }
    }

    fn delivery_info(ctx: &ExecutionContext) -> Result<DeliveryInfo, DispatchError> {
        let receiver_name = validate_user_name(ctx.require_param("receiverName")?)?;
        let receiver_phone = validate_mobile_number(ctx.require_param("receiverPhone")?)?;
        let zip_code = ctx.require_param("zipCode")?;
        if zip_code.len() > 10 || !zip_code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DispatchError::invalid_parameter("zipCode", "Invalid zip code"));
        }
        let address = ctx.require_param("address")?;
        if address.chars().count() > MAX_ADDRESS_LENGTH {
            return Err(DispatchError::invalid_parameter("address", "Address is too long"));
        }

        Ok(DeliveryInfo {
            receiver_name: receiver_name.to_string(),
            receiver_phone: receiver_phone.to_string(),
            zip_code: zip_code.to_string(),
            address: address.to_string(),
        })
    }

    /// Reserve stock for every basket line, all or nothing.
    fn reserve_all(&self, basket: &Basket) -> Result<(), DispatchError> {
        for (index, item) in basket.items.iter().enumerate() {
            if let Err(e) = self.products.reserve_stock(&item.product_code, item.quantity) {
                self.release(&basket.items[..index]);
                return Err(e);
            }
        }
        Ok(())
    }

    fn release(&self, items: &[BasketItem]) {
        for item in items {
            if let Err(e) = self.products.release_stock(&item.product_code, item.quantity) {
                error!(product_code = %item.product_code, error = %e, "Failed to release reserved stock");
            }
        }
    }

    fn place(&self, ctx: &ExecutionContext, basket: &Basket) -> Result<Order, DispatchError> {
        let delivery = Self::delivery_info(ctx)?;
        self.reserve_all(basket)?;

        let order = Order::from_basket(basket, delivery);
        if let Err(e) = self.orders.insert(order.clone()) {
            self.release(&basket.items);
            return Err(e);
        }
        Ok(order)
    }
}

impl Command for OrderCreateCommand {
    fn name(&self) -> &'static str {
        "create.do"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if !ctx.is_post() {
            response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Orders are placed with POST");
            return Ok(Outcome::Handled);
        }
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let basket = self.baskets.get(&user.user_id)?;
        if basket.is_empty() {
            return Ok(Outcome::redirect(BASKET_PAGE));
        }

        match self.place(ctx, &basket) {
            Ok(order) => {
                self.baskets.clear(&user.user_id)?;
                info!(
                    user_id = %user.user_id,
                    order_id = %order.order_id,
                    amount = order.total_amount(),
                    "Order placed"
                );
                Ok(Outcome::redirect(detail_location(&order.order_id)))
            }
            Err(e) => {
                let Some(message) = e.user_message() else {
                    return Err(e);
                };
                warn!(user_id = %user.user_id, error = %e, "Order rejected");
                set_basket_model(ctx, &basket)?;
                ctx.set_attribute("errorMessage", message)?;
                for field in ["receiverName", "receiverPhone", "zipCode", "address"] {
                    let value = ctx.param(field).map(str::to_string);
                    ctx.set_attribute(field, value)?;
                }
                Ok(Outcome::forward("order/form"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;

    const DELIVERY: &str =
        "receiverName=Kim&receiverPhone=010-1234-5678&zipCode=04524&address=1+Main+Street";

    fn command(fixture: &Fixture) -> OrderCreateCommand {
        OrderCreateCommand::new(
            fixture.services.baskets.clone(),
            fixture.services.products.clone(),
            fixture.services.orders.clone(),
        )
    }

    fn fill_basket(fixture: &Fixture, user_id: &str, lines: &[(&str, u32, u32)]) {
        for (code, stock, quantity) in lines {
            let product = fixture.add_product(code, 1000, *stock);
            fixture
                .services
                .baskets
                .add_item(user_id, BasketItem::from_product(&product, *quantity))
                .unwrap();
        }
    }

    #[test]
    fn test_get_not_allowed() {
        let fixture = Fixture::new();
        let (_, session) = fixture.customer_session();
        let request = HttpRequest::get("/user/order/create.do").with_session_id(session);
        let mut ctx = fixture.context("user/order", "create.do", request);
        let mut response = HttpResponse::new();

        let outcome = command(&fixture).execute(&mut ctx, &mut response).unwrap();
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_places_order_and_clears_basket() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        fill_basket(&fixture, &user.user_id, &[("P-1", 5, 2), ("P-2", 1, 1)]);

        let request = HttpRequest::post("/user/order/create.do")
            .with_session_id(session)
            .with_form_body(DELIVERY.as_bytes());
        let mut ctx = fixture.context("user/order", "create.do", request);
        let outcome = command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        let orders = fixture.services.orders.list_by_user(&user.user_id).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(outcome, Outcome::redirect(detail_location(&orders[0].order_id)));
        assert_eq!(orders[0].order_amount, 3000);
        assert!(fixture.services.baskets.get(&user.user_id).unwrap().is_empty());
        assert_eq!(fixture.services.products.find("P-1").unwrap().unwrap().stock, 3);
        assert_eq!(fixture.services.products.find("P-2").unwrap().unwrap().stock, 0);
    }

    #[test]
    fn test_shortage_rolls_back_reservations() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        fill_basket(&fixture, &user.user_id, &[("P-1", 5, 2), ("P-2", 1, 4)]);

        let request = HttpRequest::post("/user/order/create.do")
            .with_session_id(session)
            .with_form_body(DELIVERY.as_bytes());
        let mut ctx = fixture.context("user/order", "create.do", request);
        let outcome = command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward("order/form"));
        assert!(ctx.attribute("errorMessage").is_some());
        assert_eq!(ctx.attribute("receiverName").unwrap(), "Kim");
        assert_eq!(fixture.services.products.find("P-1").unwrap().unwrap().stock, 5);
        assert_eq!(fixture.services.baskets.get(&user.user_id).unwrap().items.len(), 2);
        assert!(fixture.services.orders.list_by_user(&user.user_id).unwrap().is_empty());
    }

    #[test]
    fn test_missing_delivery_fields_rerender_form() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        fill_basket(&fixture, &user.user_id, &[("P-1", 5, 1)]);

        let request = HttpRequest::post("/user/order/create.do")
            .with_session_id(session)
            .with_form_body(b"receiverName=Kim");
        let mut ctx = fixture.context("user/order", "create.do", request);
        let outcome = command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward("order/form"));
        assert_eq!(fixture.services.products.find("P-1").unwrap().unwrap().stock, 5);
    }
}
