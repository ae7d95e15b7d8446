//! Admin mapping creation.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Method, Outcome};
use crate::services::{CategoryMapping, CategoryMappingStore, CategoryStore, ProductCatalog};

use super::{apply_form, render_form, FORM_VIEW, LIST_PAGE};

/// GET shows an empty mapping form, POST places the product in the category.
pub struct MappingCreateCommand {
    mappings: Arc<dyn CategoryMappingStore>,
    products: Arc<dyn ProductCatalog>,
    categories: Arc<dyn CategoryStore>,
}

impl MappingCreateCommand {
    pub fn new(
        mappings: Arc<dyn CategoryMappingStore>,
        products: Arc<dyn ProductCatalog>,
        categories: Arc<dyn CategoryStore>,
    ) -> Self {
        Self {
            mappings,
            products,
            categories,
        }
    }

    fn create(
        &self,
        ctx: &ExecutionContext,
        mapping: &mut CategoryMapping,
    ) -> Result<(), DispatchError> {
        apply_form(ctx, self.products.as_ref(), self.categories.as_ref(), mapping)?;
        if let Some(user) = ctx.current_user() {
            mapping.registered_by = user.user_id;
        }
        self.mappings.insert(mapping.clone())
    }
}

impl Command for MappingCreateCommand {
    fn name(&self) -> &'static str {
        "create"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let mut mapping = CategoryMapping::new("", 0);

        match ctx.method() {
            Method::Get => {}
            Method::Post => match self.create(ctx, &mut mapping) {
                Ok(()) => {
                    info!(
                        product_code = %mapping.product_code,
                        category_id = mapping.category_id,
                        "Mapping created"
                    );
                    return Ok(Outcome::redirect(format!("{}?success=create", LIST_PAGE)));
                }
                Err(e) => {
                    let Some(message) = e.user_message() else {
                        return Err(e);
                    };
                    warn!(error = %e, "Mapping creation rejected");
                    ctx.set_attribute("errorMessage", message)?;
                }
            },
            Method::Other => {
                response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Unsupported method");
                return Ok(Outcome::Handled);
            }
        }

        render_form(
            ctx,
            self.products.as_ref(),
            self.categories.as_ref(),
            "create",
            &mapping,
        )?;
        Ok(Outcome::forward(FORM_VIEW))
    }
}
