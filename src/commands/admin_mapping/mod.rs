//! Admin product to category mapping (`/admin/mapping`).
//!
//! A mapping is identified by its product code and category id. Edit forms
//! carry the pair being edited as `originalProductCode` and
//! `originalCategoryId` so either half can change.

mod create;
mod delete;
mod edit;
mod list;

use std::sync::Arc;

use serde::Serialize;

use crate::error::DispatchError;
use crate::services::{
    Category, CategoryMapping, CategoryStore, Product, ProductCatalog, ServiceRegistry,
};
use crate::validation::{parse_category_id, validate_product_code};

use super::factory::CommandTable;
use super::types::ExecutionContext;

pub use create::MappingCreateCommand;
pub use delete::MappingDeleteCommand;
pub use edit::MappingEditCommand;
pub use list::MappingListCommand;

/// Default mappings per page in the admin listing.
pub const MAPPING_PAGE_SIZE: usize = 10;

/// Largest page size a listing request may ask for.
pub const MAX_MAPPING_PAGE_SIZE: usize = 100;

const FORM_VIEW: &str = "admin/mapping/edit";
const LIST_PAGE: &str = "/admin/mapping/list";

/// Command table for the `/admin/mapping` domain.
pub fn admin_mapping_commands(services: &ServiceRegistry) -> CommandTable {
    CommandTable::new(
        "admin/mapping",
        vec![
            Arc::new(MappingListCommand::new(
                services.mappings.clone(),
                services.products.clone(),
                services.categories.clone(),
            )),
            Arc::new(MappingCreateCommand::new(
                services.mappings.clone(),
                services.products.clone(),
                services.categories.clone(),
            )),
            Arc::new(MappingEditCommand::new(
                services.mappings.clone(),
                services.products.clone(),
                services.categories.clone(),
            )),
            Arc::new(MappingDeleteCommand::new(services.mappings.clone())),
        ],
    )
}

/// A mapping joined with the names shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct MappingRow {
    #[serde(flatten)]
    pub mapping: CategoryMapping,
    pub product_name: Option<String>,
    pub category_name: Option<String>,
}

impl MappingRow {
    fn matches(&self, keyword: &str) -> bool {
        let contains = |value: &str| value.to_lowercase().contains(keyword);
        contains(&self.mapping.product_code)
            || self.product_name.as_deref().is_some_and(contains)
            || self.category_name.as_deref().is_some_and(contains)
    }
}

/// Product code and category id read from `code_key` and `category_key`.
fn pair_params<'a>(
    ctx: &'a ExecutionContext,
    code_key: &str,
    category_key: &str,
) -> Result<(&'a str, u64), DispatchError> {
    let product_code = validate_product_code(ctx.require_param(code_key)?)?;
    let category_id = parse_category_id(ctx.require_param(category_key)?)?;
    Ok((product_code, category_id))
}

/// Read the mapping form onto `mapping`. Both ends must exist.
fn apply_form(
    ctx: &ExecutionContext,
    products: &dyn ProductCatalog,
    categories: &dyn CategoryStore,
    mapping: &mut CategoryMapping,
) -> Result<(), DispatchError> {
    let (product_code, category_id) = pair_params(ctx, "productCode", "categoryId")?;
    mapping.product_code = product_code.to_string();
    mapping.category_id = category_id;
    mapping.display_order = match ctx.param("displayOrder") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| DispatchError::invalid_parameter("displayOrder", "Enter a whole number"))?,
        None => 1,
    };

    if products.find(&mapping.product_code)?.is_none() {
        return Err(DispatchError::not_found("Product", mapping.product_code.clone()));
    }
    if categories.find(mapping.category_id)?.is_none() {
        return Err(DispatchError::not_found("Category", mapping.category_id.to_string()));
    }
    Ok(())
}

/// Expose the form state with the product and category choices.
fn render_form(
    ctx: &mut ExecutionContext,
    products: &dyn ProductCatalog,
    categories: &dyn CategoryStore,
    mode: &str,
    mapping: &CategoryMapping,
) -> Result<(), DispatchError> {
    let products: Vec<Product> = products.list()?;
    let categories: Vec<Category> = categories.list()?;
    ctx.set_attribute("mode", mode)?;
    ctx.set_attribute("mapping", mapping)?;
    ctx.set_attribute("products", &products)?;
    ctx.set_attribute("categories", &categories)?;
    Ok(())
}
