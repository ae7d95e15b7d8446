//! Admin mapping listing.

use std::collections::HashMap;
use std::sync::Arc;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::{CategoryMappingStore, CategoryStore, Page, ProductCatalog};

use super::{MappingRow, MAPPING_PAGE_SIZE, MAX_MAPPING_PAGE_SIZE};

/// Page through mappings with product and category names filled in.
///
/// `keyword` matches the product code, product name or category full name.
pub struct MappingListCommand {
    mappings: Arc<dyn CategoryMappingStore>,
    products: Arc<dyn ProductCatalog>,
    categories: Arc<dyn CategoryStore>,
}

impl MappingListCommand {
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

    fn rows(&self) -> Result<Vec<MappingRow>, DispatchError> {
        let product_names: HashMap<String, String> = self
            .products
            .list()?
            .into_iter()
            .map(|p| (p.product_code, p.product_name))
            .collect();
        let category_names: HashMap<u64, String> = self
            .categories
            .list()?
            .into_iter()
            .map(|c| (c.category_id, c.full_name))
            .collect();

        Ok(self
            .mappings
            .list()?
            .into_iter()
            .map(|mapping| MappingRow {
                product_name: product_names.get(&mapping.product_code).cloned(),
                category_name: category_names.get(&mapping.category_id).cloned(),
                mapping,
            })
            .collect())
    }
}

impl Command for MappingListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let page_number = ctx.param_i64("page").unwrap_or(1).max(1) as usize;
        let page_size = ctx
            .param_i64("pageSize")
            .unwrap_or(MAPPING_PAGE_SIZE as i64)
            .clamp(1, MAX_MAPPING_PAGE_SIZE as i64) as usize;
        let keyword = ctx.param("keyword").map(str::to_string);

        let needle = keyword.as_deref().map(str::to_lowercase);
        let matches: Vec<MappingRow> = self
            .rows()?
            .into_iter()
            .filter(|row| needle.as_deref().map_or(true, |k| row.matches(k)))
            .collect();

        let page = Page::new(Vec::new(), page_number, page_size, matches.len());
        let items = matches
            .into_iter()
            .skip((page.current_page - 1) * page.page_size)
            .take(page.page_size)
            .collect();
        let page = Page { items, ..page };

        let success = ctx.param("success").map(str::to_string);
        let error = ctx.param("error").map(str::to_string);
        ctx.set_attribute("page", &page)?;
        ctx.set_attribute("pageSize", page_size)?;
        ctx.set_attribute("keyword", keyword)?;
        ctx.set_attribute("success", success)?;
        ctx.set_attribute("error", error)?;
        Ok(Outcome::forward("admin/mapping/list"))
    }

    fn requires_audit(&self) -> bool {
        false
    }
}
