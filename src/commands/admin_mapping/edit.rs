//! Admin mapping editing.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Method, Outcome};
use crate::services::{CategoryMapping, CategoryMappingStore, CategoryStore, ProductCatalog};

use super::{apply_form, pair_params, render_form, FORM_VIEW, LIST_PAGE};

/// GET shows the mapping named by `productCode` and `categoryId`; POST
/// replaces the mapping named by `originalProductCode` and
/// `originalCategoryId` with the submitted one.
pub struct MappingEditCommand {
    mappings: Arc<dyn CategoryMappingStore>,
    products: Arc<dyn ProductCatalog>,
    categories: Arc<dyn CategoryStore>,
}

impl MappingEditCommand {
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

    fn save(
        &self,
        ctx: &ExecutionContext,
        original: &CategoryMapping,
    ) -> Result<CategoryMapping, DispatchError> {
        let mut mapping = original.clone();
        apply_form(ctx, self.products.as_ref(), self.categories.as_ref(), &mut mapping)?;
        self.mappings
            .replace(&original.product_code, original.category_id, mapping.clone())?;
        Ok(mapping)
    }
}

impl Command for MappingEditCommand {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let (code_key, category_key) = match ctx.method() {
            Method::Get => ("productCode", "categoryId"),
            Method::Post => ("originalProductCode", "originalCategoryId"),
            Method::Other => {
                response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Unsupported method");
                return Ok(Outcome::Handled);
            }
        };

        let original = match pair_params(ctx, code_key, category_key) {
            Ok((product_code, category_id)) => self.mappings.find(product_code, category_id)?,
            Err(_) => None,
        };
        let Some(original) = original else {
            response.send_error(StatusCode::NOT_FOUND, "Mapping not found");
            return Ok(Outcome::Handled);
        };

        let mut shown = original.clone();
        if ctx.is_post() {
            match self.save(ctx, &original) {
                Ok(mapping) => {
                    info!(
                        product_code = %mapping.product_code,
                        category_id = mapping.category_id,
                        "Mapping updated"
                    );
                    return Ok(Outcome::redirect(format!("{}?success=update", LIST_PAGE)));
                }
                Err(e) => {
                    let Some(message) = e.user_message() else {
                        return Err(e);
                    };
                    warn!(
                        product_code = %original.product_code,
                        category_id = original.category_id,
                        error = %e,
                        "Mapping update rejected"
                    );
                    ctx.set_attribute("errorMessage", message)?;
                    if let Some(order) = ctx.param("displayOrder").and_then(|raw| raw.parse().ok()) {
                        shown.display_order = order;
                    }
                }
            }
        }

        ctx.set_attribute("original", &original)?;
        render_form(
            ctx,
            self.products.as_ref(),
            self.categories.as_ref(),
            "edit",
            &shown,
        )?;
        Ok(Outcome::forward(FORM_VIEW))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Fixture;
    use crate::protocol::HttpRequest;
    use crate::services::Category;

    fn command(fixture: &Fixture) -> MappingEditCommand {
        MappingEditCommand::new(
            fixture.services.mappings.clone(),
            fixture.services.products.clone(),
            fixture.services.categories.clone(),
        )
    }

    /// Two categories with `LAMP-1` mapped into the first.
    fn seeded() -> (Fixture, u64, u64) {
        let fixture = Fixture::new();
        fixture.add_product("LAMP-1", 1000, 1);
        let categories = &fixture.services.categories;
        let first = categories.insert(Category::draft("Lighting", None)).unwrap().category_id;
        let second = categories.insert(Category::draft("Desk", None)).unwrap().category_id;
        fixture
            .services
            .mappings
            .insert(CategoryMapping::new("LAMP-1", first))
            .unwrap();
        (fixture, first, second)
    }

    #[test]
    fn test_get_shows_mapping() {
        let (fixture, first, _) = seeded();
        let request = HttpRequest::get("/admin/mapping/edit")
            .with_query(&format!("productCode=LAMP-1&categoryId={}", first));
        let mut ctx = fixture.context("admin/mapping", "edit", request);
        let outcome = command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward(FORM_VIEW));
        assert_eq!(ctx.attribute("mapping").unwrap()["product_code"], "LAMP-1");
        assert_eq!(ctx.attribute("categories").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_post_moves_mapping_to_other_category() {
        let (fixture, first, second) = seeded();
        let body = format!(
            "originalProductCode=LAMP-1&originalCategoryId={}&productCode=LAMP-1&categoryId={}&displayOrder=2",
            first, second
        );
        let request = HttpRequest::post("/admin/mapping/edit").with_form_body(body.as_bytes());
        let mut ctx = fixture.context("admin/mapping", "edit", request);
        let outcome = command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::redirect("/admin/mapping/list?success=update"));
        let mappings = &fixture.services.mappings;
        assert!(mappings.find("LAMP-1", first).unwrap().is_none());
        assert_eq!(mappings.find("LAMP-1", second).unwrap().unwrap().display_order, 2);
    }

    #[test]
    fn test_move_onto_existing_pair_keeps_original() {
        let (fixture, first, second) = seeded();
        fixture
            .services
            .mappings
            .insert(CategoryMapping::new("LAMP-1", second))
            .unwrap();

        let body = format!(
            "originalProductCode=LAMP-1&originalCategoryId={}&productCode=LAMP-1&categoryId={}",
            first, second
        );
        let request = HttpRequest::post("/admin/mapping/edit").with_form_body(body.as_bytes());
        let mut ctx = fixture.context("admin/mapping", "edit", request);
        let outcome = command(&fixture).execute(&mut ctx, &mut HttpResponse::new()).unwrap();

        assert_eq!(outcome, Outcome::forward(FORM_VIEW));
        assert!(ctx.attribute("errorMessage").is_some());
        assert!(fixture.services.mappings.find("LAMP-1", first).unwrap().is_some());
        assert_eq!(fixture.services.mappings.list().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_mapping_is_not_found() {
        let (fixture, _, second) = seeded();
        let request = HttpRequest::get("/admin/mapping/edit")
            .with_query(&format!("productCode=LAMP-1&categoryId={}", second));
        let mut ctx = fixture.context("admin/mapping", "edit", request);
        let mut response = HttpResponse::new();
        let outcome = command(&fixture).execute(&mut ctx, &mut response).unwrap();

        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
