//! Admin category management (`/admin/category`).
//!
//! Categories form a tree. The store keeps each node's full name and level
//! in step with its parent; deleting a node removes its subtree and every
//! product mapping into it.

mod create;
mod delete;
mod edit;
mod list;

use std::sync::Arc;

use crate::error::DispatchError;
use crate::services::{Category, CategoryStore, ServiceRegistry};
use crate::validation::parse_category_id;

use super::factory::CommandTable;
use super::types::ExecutionContext;

pub use create::CategoryCreateCommand;
pub use delete::CategoryDeleteCommand;
pub use edit::CategoryEditCommand;
pub use list::CategoryListCommand;

/// Categories per page in the admin listing.
pub const CATEGORY_PAGE_SIZE: usize = 10;

const FORM_VIEW: &str = "admin/category/edit";
const LIST_PAGE: &str = "/admin/category/list";
const MAX_NAME_LENGTH: usize = 50;
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Command table for the `/admin/category` domain.
pub fn admin_category_commands(services: &ServiceRegistry) -> CommandTable {
    CommandTable::new(
        "admin/category",
        vec![
            Arc::new(CategoryListCommand::new(services.categories.clone())),
            Arc::new(CategoryCreateCommand::new(services.categories.clone())),
            Arc::new(CategoryEditCommand::new(services.categories.clone())),
            Arc::new(CategoryDeleteCommand::new(
                services.categories.clone(),
                services.mappings.clone(),
            )),
        ],
    )
}

/// The `categoryId` parameter, validated.
fn category_id_param(ctx: &ExecutionContext) -> Result<u64, DispatchError> {
    parse_category_id(ctx.require_param("categoryId")?)
}

/// Apply the category form fields onto `category`.
///
/// `name` is required. A blank `parentId` places the category at the top
/// level; `useYn=Y` marks it in use.
fn apply_form(ctx: &ExecutionContext, category: &mut Category) -> Result<(), DispatchError> {
    let name = ctx.require_param("name")?;
    if name.chars().count() > MAX_NAME_LENGTH || name.chars().any(char::is_control) {
        return Err(DispatchError::invalid_parameter(
            "name",
            "Category name must be at most 50 characters",
        ));
    }
    category.name = name.to_string();

    let description = ctx.param("description").unwrap_or_default();
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(DispatchError::invalid_parameter(
            "description",
            "Description must be at most 500 characters",
        ));
    }
    category.description = description.to_string();

    category.parent_id = ctx.param("parentId").map(parse_category_id).transpose()?;
    category.display_order = match ctx.param("order") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| DispatchError::invalid_parameter("order", "Enter a whole number"))?,
        None => 1,
    };
    category.in_use = ctx.param("useYn") == Some("Y");
    Ok(())
}

/// Expose the form state plus the parent choices. An edited category is not
/// offered as its own parent.
fn render_form(
    ctx: &mut ExecutionContext,
    categories: &dyn CategoryStore,
    mode: &str,
    category: &Category,
) -> Result<(), DispatchError> {
    let parents: Vec<Category> = categories
        .list()?
        .into_iter()
        .filter(|c| mode == "create" || c.category_id != category.category_id)
        .collect();
    ctx.set_attribute("mode", mode)?;
    ctx.set_attribute("category", category)?;
    ctx.set_attribute("parents", &parents)?;
    Ok(())
}
