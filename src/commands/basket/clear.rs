//! Basket clear command.

use std::sync::Arc;

use serde_json::Map;
use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::BasketStore;

use super::finish;

/// Empty the basket.
pub struct BasketClearCommand {
    baskets: Arc<dyn BasketStore>,
}

impl BasketClearCommand {
    pub fn new(baskets: Arc<dyn BasketStore>) -> Self {
        Self { baskets }
    }
}

impl Command for BasketClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        self.baskets.clear(&user.user_id)?;
        debug!(user_id = %user.user_id, "Basket cleared");
        finish(ctx, response, Ok(Map::new()), "Basket cleared")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::basket::BASKET_PAGE;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;
    use crate::services::BasketItem;

    #[test]
    fn test_clear_empties_basket() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        let product = fixture.add_product("P-1", 1000, 5);
        fixture
            .services
            .baskets
            .add_item(&user.user_id, BasketItem::from_product(&product, 2))
            .unwrap();

        let command = BasketClearCommand::new(fixture.services.baskets.clone());
        let request = HttpRequest::post("/user/basket.do").with_session_id(session);
        let mut ctx = fixture.context("user/basket.do", "clear", request);
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::redirect(BASKET_PAGE));
        assert!(fixture.services.baskets.get(&user.user_id).unwrap().is_empty());
    }
}
