//! Admin product listing.

use std::sync::Arc;

use crate::commands::product::query_from_params;
use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::ProductCatalog;

use super::ADMIN_PAGE_SIZE;

/// Page through all products, hidden ones included.
pub struct AdminProductListCommand {
    products: Arc<dyn ProductCatalog>,
}

impl AdminProductListCommand {
    pub fn new(products: Arc<dyn ProductCatalog>) -> Self {
        Self { products }
    }
}

impl Command for AdminProductListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let mut query = query_from_params(ctx, ADMIN_PAGE_SIZE);
        query.include_hidden = true;
        let page = self.products.search(&query)?;

        let success = ctx.param("success").map(str::to_string);
        let error = ctx.param("error").map(str::to_string);
        ctx.set_attribute("page", &page)?;
        ctx.set_attribute("sortBy", query.sort.as_str())?;
        ctx.set_attribute("keyword", &query.keyword)?;
        ctx.set_attribute("success", success)?;
        ctx.set_attribute("error", error)?;
        Ok(Outcome::forward("admin/product/list"))
    }

    fn requires_audit(&self) -> bool {
        false
    }
}
