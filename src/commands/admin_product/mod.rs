//! Admin product management (`/admin/product`).
//!
//! Create and edit share one form view (`admin/product/edit`) and one
//! parser; image uploads arrive as the `productImage` multipart field.

mod create;
mod delete;
mod edit;
mod file_info;
mod list;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::services::{FileStore, Product, ProductStatus, ServiceRegistry};
use crate::validation::validate_product_code;

use super::factory::CommandTable;
use super::types::ExecutionContext;

pub use create::ProductCreateCommand;
pub use delete::ProductDeleteCommand;
pub use edit::ProductEditCommand;
pub use file_info::ProductFileInfoCommand;
pub use list::AdminProductListCommand;

/// Products per page in the admin listing.
pub const ADMIN_PAGE_SIZE: usize = 10;

const FORM_VIEW: &str = "admin/product/edit";
const LIST_PAGE: &str = "/admin/product/list";
const MAX_NAME_LENGTH: usize = 100;

/// Command table for the `/admin/product` domain.
pub fn admin_product_commands(services: &ServiceRegistry) -> CommandTable {
    CommandTable::new(
        "admin/product",
        vec![
            Arc::new(AdminProductListCommand::new(services.products.clone())),
            Arc::new(ProductCreateCommand::new(
                services.products.clone(),
                services.files.clone(),
            )),
            Arc::new(ProductEditCommand::new(
                services.products.clone(),
                services.files.clone(),
            )),
            Arc::new(ProductDeleteCommand::new(
                services.products.clone(),
                services.files.clone(),
                services.mappings.clone(),
            )),
            Arc::new(ProductFileInfoCommand::new(services.files.clone())),
        ],
    )
}

fn parse_amount(ctx: &ExecutionContext, key: &str, default: Option<u32>) -> Result<u32, DispatchError> {
    match ctx.param(key) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| DispatchError::invalid_parameter(key, "Enter a whole number of zero or more")),
        None => default.ok_or_else(|| DispatchError::missing_parameter(key)),
    }
}

/// Starting point for the create form.
fn blank_product() -> Product {
    Product {
        product_code: String::new(),
        product_name: String::new(),
        detail_explain: String::new(),
        file_id: None,
        customer_price: 0,
        sale_price: 0,
        stock: 0,
        delivery_fee: 0,
        status: ProductStatus::OnSale,
        registered_at: Utc::now(),
    }
}

/// Generated code for products created without one.
fn generate_product_code() -> String {
    format!("P{}", Utc::now().format("%Y%m%d%H%M%S%3f"))
}

/// Apply the product form fields onto `product`.
///
/// `productName` and `salePrice` are required; `customerPrice` defaults to
/// the sale price.
fn apply_form(ctx: &ExecutionContext, product: &mut Product) -> Result<(), DispatchError> {
    let name = ctx.require_param("productName")?;
    if name.chars().count() > MAX_NAME_LENGTH || name.chars().any(char::is_control) {
        return Err(DispatchError::invalid_parameter(
            "productName",
            "Product name must be at most 100 characters",
        ));
    }

    product.product_name = name.to_string();
    product.detail_explain = ctx.param("detailExplain").unwrap_or_default().to_string();

    let sale_price = parse_amount(ctx, "salePrice", None)?;
    product.sale_price = sale_price;
    product.customer_price = parse_amount(ctx, "customerPrice", Some(sale_price))?;
    product.stock = parse_amount(ctx, "stock", Some(product.stock))?;
    product.delivery_fee = parse_amount(ctx, "deliveryFee", Some(product.delivery_fee))?;
    if let Some(status) = ctx.param("status") {
        product.status = ProductStatus::parse(status)
            .ok_or_else(|| DispatchError::invalid_parameter("status", "Unknown product status"))?;
    }
    Ok(())
}

/// The `productCode` parameter, validated.
fn product_code_param(ctx: &ExecutionContext) -> Result<&str, DispatchError> {
    validate_product_code(ctx.require_param("productCode")?)
}

/// Store the `productImage` upload, if any, and return its file id.
fn store_upload(ctx: &ExecutionContext, files: &dyn FileStore) -> Result<Option<String>, DispatchError> {
    let Some(upload) = ctx.upload("productImage") else {
        return Ok(None);
    };
    let stored = files.save(&upload.file_name, &upload.bytes)?;
    debug!(file_id = %stored.file_id, name = %upload.file_name, "Product image stored");
    Ok(Some(stored.file_id))
}

/// Remove a file that is no longer referenced. Failures are only logged.
fn discard_file(files: &dyn FileStore, file_id: &str) {
    if let Err(e) = files.delete(file_id) {
        warn!(file_id = %file_id, error = %e, "Failed to remove product image");
    }
}
