//! Admin product deletion.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};
use url::form_urlencoded;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{CategoryMappingStore, FileStore, ProductCatalog};

use super::{discard_file, product_code_param, LIST_PAGE};

/// Delete a product, its image and its category mappings, then return to
/// the listing.
///
/// The listing's `page`, `sortBy` and `keyword` survive the redirect.
pub struct ProductDeleteCommand {
    products: Arc<dyn ProductCatalog>,
    files: Arc<dyn FileStore>,
    mappings: Arc<dyn CategoryMappingStore>,
}

impl ProductDeleteCommand {
    pub fn new(
        products: Arc<dyn ProductCatalog>,
        files: Arc<dyn FileStore>,
        mappings: Arc<dyn CategoryMappingStore>,
    ) -> Self {
        Self {
            products,
            files,
            mappings,
        }
    }

    fn delete(&self, ctx: &ExecutionContext) -> Result<(), DispatchError> {
        let product = self.products.delete(product_code_param(ctx)?)?;
        if let Some(file_id) = &product.file_id {
            discard_file(self.files.as_ref(), file_id);
        }
        let unmapped = self.mappings.delete_by_product(&product.product_code)?;
        info!(product_code = %product.product_code, unmapped, "Product deleted");
        Ok(())
    }
}

fn list_location(ctx: &ExecutionContext, succeeded: bool) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if succeeded {
        query.append_pair("success", "delete");
    } else {
        query.append_pair("error", "delete");
    }
    for key in ["page", "sortBy", "keyword"] {
        if let Some(value) = ctx.param(key) {
            query.append_pair(key, value);
        }
    }
    format!("{}?{}", LIST_PAGE, query.finish())
}

impl Command for ProductDeleteCommand {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if !ctx.is_post() {
            response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Products are deleted with POST");
            return Ok(Outcome::Handled);
        }

        match self.delete(ctx) {
            Ok(()) => Ok(Outcome::redirect(list_location(ctx, true))),
            Err(e) if e.user_message().is_some() => {
                warn!(error = %e, "Product deletion rejected");
                Ok(Outcome::redirect(list_location(ctx, false)))
            }
            Err(e) => Err(e),
        }
    }
}
