//! Add-to-basket command.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{BasketItem, BasketStore, ProductCatalog};
use crate::validation::{parse_quantity_or_default, validate_product_code, validate_quantity};

use super::finish;

/// Add a product to the basket.
///
/// An unparsable `quantity` counts as 1; zero or negative quantities and
/// unknown products are rejected. Script requests (`X-Requested-With:
/// XMLHttpRequest`) get a JSON answer instead of a redirect.
pub struct BasketAddCommand {
    baskets: Arc<dyn BasketStore>,
    products: Arc<dyn ProductCatalog>,
}

impl BasketAddCommand {
    pub fn new(baskets: Arc<dyn BasketStore>, products: Arc<dyn ProductCatalog>) -> Self {
        Self { baskets, products }
    }

    fn add(&self, ctx: &ExecutionContext, user_id: &str) -> Result<Map<String, Value>, DispatchError> {
        let code = validate_product_code(ctx.require_param("productCode")?)?;
        let quantity = validate_quantity(parse_quantity_or_default(ctx.param("quantity")))?;

        let product = self
            .products
            .find(code)?
            .filter(|p| p.is_on_sale())
            .ok_or_else(|| DispatchError::not_found("Product", code))?;

        let basket = self
            .baskets
            .add_item(user_id, BasketItem::from_product(&product, quantity))?;
        debug!(user_id = %user_id, product_code = %code, quantity, "Basket item added");

        let mut extra = Map::new();
        extra.insert("basketCount".to_string(), basket.total_quantity().into());
        Ok(extra)
    }
}

impl Command for BasketAddCommand {
    fn name(&self) -> &'static str {
        "add"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(user) = ctx.current_user() else {
            return Ok(Outcome::redirect(ctx.login_path()));
        };

        let result = self.add(ctx, &user.user_id);
        finish(ctx, response, result, "Added to basket")
    }
}
