//! Admin product creation.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Method, Outcome};
use crate::services::{FileStore, Product, ProductCatalog};
use crate::validation::validate_product_code;

use super::{
    apply_form, blank_product, discard_file, generate_product_code, store_upload, FORM_VIEW,
    LIST_PAGE,
};

/// GET shows an empty product form, POST registers the product.
pub struct ProductCreateCommand {
    products: Arc<dyn ProductCatalog>,
    files: Arc<dyn FileStore>,
}

impl ProductCreateCommand {
    pub fn new(products: Arc<dyn ProductCatalog>, files: Arc<dyn FileStore>) -> Self {
        Self { products, files }
    }

    fn create(&self, ctx: &ExecutionContext, product: &mut Product) -> Result<(), DispatchError> {
        product.product_code = match ctx.param("productCode") {
            Some(code) => validate_product_code(code)?.to_string(),
            None => generate_product_code(),
        };
        apply_form(ctx, product)?;

        product.file_id = store_upload(ctx, self.files.as_ref())?;
        if let Err(e) = self.products.save(product.clone()) {
            if let Some(file_id) = product.file_id.take() {
                discard_file(self.files.as_ref(), &file_id);
            }
            return Err(e);
        }
        Ok(())
    }
}

impl Command for ProductCreateCommand {
    fn name(&self) -> &'static str {
        "create"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let mut product = blank_product();

        match ctx.method() {
            Method::Get => {}
            Method::Post => match self.create(ctx, &mut product) {
                Ok(()) => {
                    info!(product_code = %product.product_code, "Product created");
                    return Ok(Outcome::redirect(format!("{}?success=create", LIST_PAGE)));
                }
                Err(e) => {
                    let Some(message) = e.user_message() else {
                        return Err(e);
                    };
                    warn!(error = %e, "Product creation rejected");
                    ctx.set_attribute("errorMessage", message)?;
                }
            },
            Method::Other => {
                response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Unsupported method");
                return Ok(Outcome::Handled);
            }
        }

        ctx.set_attribute("mode", "create")?;
        ctx.set_attribute("product", &product)?;
        Ok(Outcome::forward(FORM_VIEW))
    }
}
