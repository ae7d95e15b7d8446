//! Basket quantity update command.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::BasketStore;
use crate::validation::{validate_product_code, validate_quantity};

use super::finish;

/// Set the quantity of a basket line.
pub struct BasketUpdateCommand {
    baskets: Arc<dyn BasketStore>,
}

impl BasketUpdateCommand {
    pub fn new(baskets: Arc<dyn BasketStore>) -> Self {
        Self { baskets }
    }

    fn update(&self, ctx: &ExecutionContext, user_id: &str) -> Result<Map<String, Value>, DispatchError> {
        let code = validate_product_code(ctx.require_param("productCode")?)?;
        let quantity = ctx
            .param_i64("quantity")
            .ok_or_else(|| DispatchError::invalid_parameter("quantity", "Quantity must be a number"))?;
        let quantity = validate_quantity(quantity)?;

        self.baskets.update_quantity(user_id, code, quantity)?;
        Ok(Map::new())
    }
}

impl Command for BasketUpdateCommand {
    fn name(&self) -> &'static str {
        "update"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let result = self.update(ctx, &user.user_id);
        finish(ctx, response, result, "Quantity updated")
    }
}
