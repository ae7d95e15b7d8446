//! Admin category listing.

use std::sync::Arc;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::CategoryStore;

use super::CATEGORY_PAGE_SIZE;

/// Page through categories ordered by full name, optionally filtered by `keyword`.
pub struct CategoryListCommand {
    categories: Arc<dyn CategoryStore>,
}

impl CategoryListCommand {
    pub fn new(categories: Arc<dyn CategoryStore>) -> Self {
        Self { categories }
    }
}

impl Command for CategoryListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let page_number = ctx.param_i64("page").unwrap_or(1).max(1) as usize;
        let keyword = ctx.param("keyword").map(str::to_string);
        let page = self
            .categories
            .search(keyword.as_deref(), page_number, CATEGORY_PAGE_SIZE)?;

        let success = ctx.param("success").map(str::to_string);
        let error = ctx.param("error").map(str::to_string);
        ctx.set_attribute("page", &page)?;
        ctx.set_attribute("keyword", keyword)?;
        ctx.set_attribute("success", success)?;
        ctx.set_attribute("error", error)?;
        Ok(Outcome::forward("admin/category/list"))
    }

    fn requires_audit(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;
    use crate::services::Category;

    #[test]
    fn test_lists_second_page_with_keyword() {
        let fixture = Fixture::new();
        for n in 0..12 {
            fixture
                .services
                .categories
                .insert(Category::draft(format!("Desk {:02}", n), None))
                .unwrap();
        }
        fixture
            .services
            .categories
            .insert(Category::draft("Chairs", None))
            .unwrap();

        let command = CategoryListCommand::new(fixture.services.categories.clone());
        let mut ctx = fixture.context(
            "admin/category",
            "list",
            HttpRequest::get("/admin/category/list").with_query("page=2&keyword=desk&success=create"),
        );
        let outcome = command.execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward("admin/category/list"));
        let page = ctx.attribute("page").unwrap();
        assert_eq!(page["total_count"], 12);
        assert_eq!(page["items"].as_array().unwrap().len(), 2);
        assert_eq!(page["items"][0]["full_name"], "Desk 10");
        assert_eq!(ctx.attribute("success").unwrap(), "create");
    }
}
