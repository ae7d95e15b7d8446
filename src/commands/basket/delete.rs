//! Basket line removal command.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::BasketStore;
use crate::validation::validate_product_code;

use super::finish;

/// Remove one or more lines (`productCode` may repeat).
pub struct BasketDeleteCommand {
    baskets: Arc<dyn BasketStore>,
}

impl BasketDeleteCommand {
    pub fn new(baskets: Arc<dyn BasketStore>) -> Self {
        Self { baskets }
    }

    fn delete(&self, ctx: &ExecutionContext, user_id: &str) -> Result<Map<String, Value>, DispatchError> {
        let codes = ctx.request().param_values("productCode");
        if codes.is_empty() {
            return Err(DispatchError::missing_parameter("productCode"));
        }

        for code in codes {
            let code = validate_product_code(code.trim())?;
            self.baskets.remove_item(user_id, code)?;
        }

        let mut extra = Map::new();
        extra.insert("removed".to_string(), codes.len().into());
        Ok(extra)
    }
}

impl Command for BasketDeleteCommand {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let result = self.delete(ctx, &user.user_id);
        finish(ctx, response, result, "Removed from basket")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;
    use crate::services::BasketItem;

    #[test]
    fn test_delete_several_lines() {
        let fixture = Fixture::new();
        let (user, session) = fixture.customer_session();
        for code in ["P-1", "P-2", "P-3"] {
            let product = fixture.add_product(code, 1000, 5);
            fixture
                .services
                .baskets
                .add_item(&user.user_id, BasketItem::from_product(&product, 1))
                .unwrap();
        }

        let command = BasketDeleteCommand::new(fixture.services.baskets.clone());
        let request = HttpRequest::post("/user/basket.do")
            .with_session_id(session)
            .with_header("X-Requested-With", "XMLHttpRequest")
            .with_form_body(b"productCode=P-1&productCode=P-3");
        let mut ctx = fixture.context("user/basket.do", "delete", request);
        let mut response = HttpResponse::new();
        command.execute(&mut ctx, &mut response).unwrap();

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["removed"], 2);
        let basket = fixture.services.baskets.get(&user.user_id).unwrap();
        assert_eq!(basket.items.len(), 1);
        assert_eq!(basket.items[0].product_code, "P-2");
    }

    #[test]
    fn test_delete_requires_code() {
        let fixture = Fixture::new();
        let (_, session) = fixture.customer_session();

        let command = BasketDeleteCommand::new(fixture.services.baskets.clone());
        let request = HttpRequest::post("/user/basket.do").with_session_id(session);
        let mut ctx = fixture.context("user/basket.do", "delete", request);
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();
        assert_eq!(outcome, Outcome::forward("common/error"));
    }
}
