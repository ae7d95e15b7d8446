//! Product detail command.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::ProductCatalog;
use crate::validation::validate_product_code;

/// Show one product on sale. Unknown or hidden products answer 404.
pub struct ProductDetailCommand {
    products: Arc<dyn ProductCatalog>,
}

impl ProductDetailCommand {
    pub fn new(products: Arc<dyn ProductCatalog>) -> Self {
        Self { products }
    }
}

impl Command for ProductDetailCommand {
    fn name(&self) -> &'static str {
        "detail.do"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(code) = ctx.param("productCode") else {
            response.send_error(StatusCode::BAD_REQUEST, "Missing productCode");
            return Ok(Outcome::Handled);
        };

        let product = match validate_product_code(code) {
            Ok(code) => self.products.find(code)?,
            Err(_) => None,
        };

        match product.filter(|p| p.is_on_sale()) {
            Some(product) => {
                ctx.set_attribute("product", &product)?;
                Ok(Outcome::forward("product/detail"))
            }
            None => {
                debug!(product_code = %code, "Product not available");
                response.send_error(StatusCode::NOT_FOUND, "Product not found");
                Ok(Outcome::Handled)
            }
        }
    }
}
