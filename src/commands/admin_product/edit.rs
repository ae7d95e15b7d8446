//! Admin product editing.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Method, Outcome};
use crate::services::{FileStore, Product, ProductCatalog};

use super::{apply_form, discard_file, product_code_param, store_upload, FORM_VIEW, LIST_PAGE};

/// GET shows the form for `productCode`, POST saves it.
///
/// A new `productImage` replaces the old image; `fileDeleteOption=delete`
/// removes it.
pub struct ProductEditCommand {
    products: Arc<dyn ProductCatalog>,
    files: Arc<dyn FileStore>,
}

impl ProductEditCommand {
    pub fn new(products: Arc<dyn ProductCatalog>, files: Arc<dyn FileStore>) -> Self {
        Self { products, files }
    }

    fn save(&self, ctx: &ExecutionContext, product: &mut Product) -> Result<(), DispatchError> {
        apply_form(ctx, product)?;

        let previous = product.file_id.clone();
        if ctx.param("fileDeleteOption") == Some("delete") {
            product.file_id = None;
        } else if let Some(file_id) = store_upload(ctx, self.files.as_ref())? {
            product.file_id = Some(file_id);
        }

        if let Err(e) = self.products.update(product) {
            if product.file_id != previous {
                if let Some(file_id) = &product.file_id {
                    discard_file(self.files.as_ref(), file_id);
                }
            }
            return Err(e);
        }

        if product.file_id != previous {
            if let Some(old) = &previous {
                discard_file(self.files.as_ref(), old);
            }
        }
        Ok(())
    }
}

impl Command for ProductEditCommand {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        if ctx.method() == Method::Other {
            response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Unsupported method");
            return Ok(Outcome::Handled);
        }

        let product = match product_code_param(ctx) {
            Ok(code) => self.products.find(code)?,
            Err(_) => None,
        };
        let Some(mut product) = product else {
            response.send_error(StatusCode::NOT_FOUND, "Product not found");
            return Ok(Outcome::Handled);
        };

        if ctx.is_post() {
            match self.save(ctx, &mut product) {
                Ok(()) => {
                    info!(product_code = %product.product_code, "Product updated");
                    return Ok(Outcome::redirect(format!("{}?success=update", LIST_PAGE)));
                }
                Err(e) => {
                    let Some(message) = e.user_message() else {
                        return Err(e);
                    };
                    warn!(product_code = %product.product_code, error = %e, "Product update rejected");
                    ctx.set_attribute("errorMessage", message)?;
                }
            }
        }

        ctx.set_attribute("mode", "edit")?;
        ctx.set_attribute("product", &product)?;
        Ok(Outcome::forward(FORM_VIEW))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;

    fn command(fixture: &Fixture) -> ProductEditCommand {
        ProductEditCommand::new(fixture.services.products.clone(), fixture.services.files.clone())
    }

    #[test]
    fn test_unknown_product_is_not_found() {
        let fixture = Fixture::new();
        let request = HttpRequest::get("/admin/product/edit").with_query("productCode=NOPE");
        let mut ctx = fixture.context("admin/product", "edit", request);
        let mut response = HttpResponse::new();
        let outcome = command(&fixture).execute(&mut ctx, &mut response).unwrap();

        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_get_shows_product() {
        let fixture = Fixture::new();
        fixture.add_product("P-1", 1000, 5);
        let request = HttpRequest::get("/admin/product/edit").with_query("productCode=P-1");
        let mut ctx = fixture.context("admin/product", "edit", request);
        let outcome = command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward(FORM_VIEW));
        assert_eq!(ctx.attribute("product").unwrap()["product_code"], "P-1");
    }

    #[test]
    fn test_new_image_replaces_old() {
        let fixture = Fixture::new();
        let mut product = fixture.add_product("P-1", 1000, 5);
        let old = fixture.services.files.save("old.png", b"old").unwrap();
        product.file_id = Some(old.file_id.clone());
        fixture.services.products.update(&product).unwrap();

        let request = HttpRequest::post("/admin/product/edit")
            .with_form_body(b"productCode=P-1&productName=Renamed&salePrice=900&status=hidden")
            .with_upload("productImage", "new.png", b"new".to_vec());
        let mut ctx = fixture.context("admin/product", "edit", request);
        let outcome = command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::redirect("/admin/product/list?success=update"));
        let updated = fixture.services.products.find("P-1").unwrap().unwrap();
        assert_eq!(updated.product_name, "Renamed");
        assert_eq!(updated.sale_price, 900);
        assert!(!updated.is_on_sale());
        assert_ne!(updated.file_id.as_deref(), Some(old.file_id.as_str()));
        assert!(fixture.services.files.find(&old.file_id).unwrap().is_none());
    }

    #[test]
    fn test_delete_option_removes_image() {
        let fixture = Fixture::new();
        let mut product = fixture.add_product("P-1", 1000, 5);
        let old = fixture.services.files.save("old.png", b"old").unwrap();
        product.file_id = Some(old.file_id.clone());
        fixture.services.products.update(&product).unwrap();

        let request = HttpRequest::post("/admin/product/edit")
            .with_form_body(b"productCode=P-1&productName=P&salePrice=900&fileDeleteOption=delete");
        let mut ctx = fixture.context("admin/product", "edit", request);
        command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        let updated = fixture.services.products.find("P-1").unwrap().unwrap();
        assert!(updated.file_id.is_none());
        assert!(fixture.services.files.find(&old.file_id).unwrap().is_none());
    }
}
