//! Order form command.

use std::sync::Arc;

use crate::commands::basket::BASKET_PAGE;
use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::BasketStore;

use super::set_basket_model;

/// Show the checkout form for the current basket.
pub struct OrderFormCommand {
    baskets: Arc<dyn BasketStore>,
}

impl OrderFormCommand {
    pub fn new(baskets: Arc<dyn BasketStore>) -> Self {
        Self { baskets }
    }
}

impl Command for OrderFormCommand {
    fn name(&self) -> &'static str {
        "form.do"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let basket = self.baskets.get(&user.user_id)?;
        if basket.is_empty() {
            return Ok(Outcome::redirect(BASKET_PAGE));
        }

        set_basket_model(ctx, &basket)?;
        ctx.set_attribute("receiverName", &user.user_name)?;
        Ok(Outcome::forward("order/form"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;
    use crate::services::BasketItem;

    #[test]
    fn test_empty_basket_redirects_back() {
        let fixture = Fixture::new();
        let (_, session) = fixture.customer_session();
        let command = OrderFormCommand::new(fixture.services.baskets.clone());

        let request = HttpRequest::get("/user/order/form.do").with_session_id(session);
        let mut ctx = fixture.context("user/order", "form.do", request);
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();
        assert_eq!(outcome, Outcome::redirect(BASKET_PAGE));
    }

    #[test]
    fn test_form_shows_payment_amount() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        let product = fixture.add_product("P-1", 1000, 5);
        fixture
            .services
            .baskets
            .add_item(&user.user_id, BasketItem::from_product(&product, 3))
            .unwrap();
        let command = OrderFormCommand::new(fixture.services.baskets.clone());

        let request = HttpRequest::get("/user/order/form.do").with_session_id(session);
        let mut ctx = fixture.context("user/order", "form.do", request);
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward("order/form"));
        assert_eq!(ctx.attribute("totalAmount").unwrap(), 3000);
        assert_eq!(ctx.attribute("paymentAmount").unwrap(), 5500);
    }
}
