//! Basket listing command.

use std::sync::Arc;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::BasketStore;

/// Show the user's basket with totals.
pub struct BasketListCommand {
    baskets: Arc<dyn BasketStore>,
}

impl BasketListCommand {
    pub fn new(baskets: Arc<dyn BasketStore>) -> Self {
        Self { baskets }
    }
}

impl Command for BasketListCommand {
    fn name(&self) -> &'static str {
        "list"
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
        ctx.set_attribute("totalAmount", basket.total_amount())?;
        ctx.set_attribute("deliveryFee", basket.delivery_fee())?;
        ctx.set_attribute("basket", &basket)?;
        Ok(Outcome::forward("basket/list"))
    }
}
