//! Admin mapping deletion.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};
use url::form_urlencoded;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::CategoryMappingStore;

use super::{pair_params, LIST_PAGE};

/// Remove the mapping named by `productCode` and `categoryId`.
pub struct MappingDeleteCommand {
    mappings: Arc<dyn CategoryMappingStore>,
}

impl MappingDeleteCommand {
    pub fn new(mappings: Arc<dyn CategoryMappingStore>) -> Self {
        Self { mappings }
    }

    fn delete(&self, ctx: &ExecutionContext) -> Result<(), DispatchError> {
        let (product_code, category_id) = pair_params(ctx, "productCode", "categoryId")?;
        self.mappings.delete(product_code, category_id)?;
        info!(product_code = %product_code, category_id, "Mapping deleted");
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
    for key in ["page", "pageSize", "keyword"] {
        if let Some(value) = ctx.param(key) {
            query.append_pair(key, value);
        }
    }
    format!("{}?{}", LIST_PAGE, query.finish())
}

impl Command for MappingDeleteCommand {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if !ctx.is_post() {
            response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Mappings are deleted with POST");
            return Ok(Outcome::Handled);
        }

        match self.delete(ctx) {
            Ok(()) => Ok(Outcome::redirect(list_location(ctx, true))),
            Err(e) if e.user_message().is_some() => {
                warn!(error = %e, "Mapping deletion rejected");
                Ok(Outcome::redirect(list_location(ctx, false)))
            }
            Err(e) => Err(e),
        }
    }
}
