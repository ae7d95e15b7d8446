//! Admin category deletion.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};
use url::form_urlencoded;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{CategoryMappingStore, CategoryStore};

use super::{category_id_param, LIST_PAGE};

/// Delete a category with its subcategories and their product mappings.
pub struct CategoryDeleteCommand {
    categories: Arc<dyn CategoryStore>,
    mappings: Arc<dyn CategoryMappingStore>,
}

impl CategoryDeleteCommand {
    pub fn new(categories: Arc<dyn CategoryStore>, mappings: Arc<dyn CategoryMappingStore>) -> Self {
        Self {
            categories,
            mappings,
        }
    }

    fn delete(&self, ctx: &ExecutionContext) -> Result<(), DispatchError> {
        let category_id = category_id_param(ctx)?;
        let removed = self.categories.delete(category_id)?;
        let unmapped = self.mappings.delete_by_categories(&removed)?;
        info!(
            category_id,
            categories = removed.len(),
            unmapped,
            "Category deleted"
        );
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
    for key in ["page", "keyword"] {
        if let Some(value) = ctx.param(key) {
            query.append_pair(key, value);
        }
    }
    format!("{}?{}", LIST_PAGE, query.finish())
}

impl Command for CategoryDeleteCommand {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if !ctx.is_post() {
            response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Categories are deleted with POST");
            return Ok(Outcome::Handled);
        }

        match self.delete(ctx) {
            Ok(()) => Ok(Outcome::redirect(list_location(ctx, true))),
            Err(e) if e.user_message().is_some() => {
                warn!(error = %e, "Category deletion rejected");
                Ok(Outcome::redirect(list_location(ctx, false)))
            }
            Err(e) => Err(e),
        }
    }
}
