//! Catalog browsing commands (`/user/product`).

mod detail;
mod list;

use std::sync::Arc;

use crate::services::ServiceRegistry;

use super::factory::CommandTable;

pub use detail::ProductDetailCommand;
pub use list::ProductListCommand;
pub(crate) use list::query_from_params;

/// Products per page in the shop listing.
pub const SHOP_PAGE_SIZE: usize = 16;

/// Command table for the `/user/product` domain.
pub fn product_commands(services: &ServiceRegistry) -> CommandTable {
    CommandTable::new(
        "user/product",
        vec![
            Arc::new(ProductListCommand::new(services.products.clone())),
            Arc::new(ProductDetailCommand::new(services.products.clone())),
        ],
    )
}
