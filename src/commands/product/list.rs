//! Product listing command.

use std::sync::Arc;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{ProductCatalog, ProductQuery, ProductSort};

use super::SHOP_PAGE_SIZE;

/// Page through products on sale, with optional keyword search and price sort.
///
/// Parameters: `page` (default 1), `sortBy` (`priceAsc`, `priceDesc`),
/// `keyword`.
pub struct ProductListCommand {
    products: Arc<dyn ProductCatalog>,
}

impl ProductListCommand {
    pub fn new(products: Arc<dyn ProductCatalog>) -> Self {
        Self { products }
    }
}

/// Build a catalog query from the standard listing parameters.
pub(crate) fn query_from_params(ctx: &ExecutionContext, page_size: usize) -> ProductQuery {
    let page = ctx.param_i64("page").unwrap_or(1).max(1) as usize;
    let mut query = ProductQuery::new(page, page_size);
    query.sort = ProductSort::parse(ctx.param("sortBy"));
    query.keyword = ctx.param("keyword").map(str::to_string);
    query
}

impl Command for ProductListCommand {
    fn name(&self) -> &'static str {
        "list.do"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let query = query_from_params(ctx, SHOP_PAGE_SIZE);
        let page = self.products.search(&query)?;

        ctx.set_attribute("page", &page)?;
        ctx.set_attribute("sortBy", query.sort.as_str())?;
        ctx.set_attribute("keyword", &query.keyword)?;
        Ok(Outcome::forward("product/list"))
    }

    fn requires_audit(&self) -> bool {
        // Browsing is high-frequency, skip audit logging
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;

    #[test]
    fn test_lists_sixteen_per_page() {
        let fixture = Fixture::new();
        for i in 0..20 {
            fixture.add_product(&format!("P-{:02}", i), 1000 + i, 5);
        }
        let command = ProductListCommand::new(fixture.services.products.clone());

        let mut ctx = fixture.context(
            "user/product",
            "list.do",
            HttpRequest::get("/user/product/list.do").with_query("page=2"),
        );
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward("product/list"));
        let page = ctx.attribute("page").unwrap();
        assert_eq!(page["current_page"], 2);
        assert_eq!(page["total_pages"], 2);
        assert_eq!(page["items"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_sort_and_keyword() {
        let fixture = Fixture::new();
        fixture.add_product("APPLE-1", 3000, 5);
        fixture.add_product("APPLE-2", 1000, 5);
        fixture.add_product("PEAR-1", 500, 5);
        let command = ProductListCommand::new(fixture.services.products.clone());

        let mut ctx = fixture.context(
            "user/product",
            "list.do",
            HttpRequest::get("/user/product/list.do").with_query("sortBy=priceAsc&keyword=apple"),
        );
        command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        let items = ctx.attribute("page").unwrap()["items"].as_array().unwrap().clone();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["product_code"], "APPLE-2");
        assert_eq!(ctx.attribute("sortBy").unwrap(), "priceAsc");
    }

    #[test]
    fn test_invalid_page_falls_back_to_first() {
        let fixture = Fixture::new();
        fixture.add_product("P-1", 1000, 5);
        let command = ProductListCommand::new(fixture.services.products.clone());

        let mut ctx = fixture.context(
            "user/product",
            "list.do",
            HttpRequest::get("/user/product/list.do").with_query("page=-3"),
        );
        command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();
        assert_eq!(ctx.attribute("page").unwrap()["current_page"], 1);
    }

    #[test]
    fn test_not_audited_on_success() {
        let fixture = Fixture::new();
        assert!(!ProductListCommand::new(fixture.services.products.clone()).requires_audit());
    }
}
