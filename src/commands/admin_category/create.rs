//! Admin category creation.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Method, Outcome};
use crate::services::{Category, CategoryStore};

use super::{apply_form, render_form, FORM_VIEW, LIST_PAGE};

/// GET shows an empty category form, POST stores the category.
pub struct CategoryCreateCommand {
    categories: Arc<dyn CategoryStore>,
}

impl CategoryCreateCommand {
    pub fn new(categories: Arc<dyn CategoryStore>) -> Self {
        Self { categories }
    }

    fn create(&self, ctx: &ExecutionContext, category: &mut Category) -> Result<(), DispatchError> {
        apply_form(ctx, category)?;
        if let Some(user) = ctx.current_user() {
            category.registered_by = user.user_id;
        }
        *category = self.categories.insert(category.clone())?;
        Ok(())
    }
}

impl Command for CategoryCreateCommand {
    fn name(&self) -> &'static str {
        "create"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let mut category = Category::draft("", None);

        match ctx.method() {
            Method::Get => {
                category.parent_id = ctx.param("parentId").and_then(|raw| raw.parse().ok());
            }
            Method::Post => match self.create(ctx, &mut category) {
                Ok(()) => {
                    info!(
                        category_id = category.category_id,
                        full_name = %category.full_name,
                        "Category created"
                    );
                    return Ok(Outcome::redirect(format!("{}?success=create", LIST_PAGE)));
                }
                Err(e) => {
                    let Some(message) = e.user_message() else {
                        return Err(e);
                    };
                    warn!(error = %e, "Category creation rejected");
                    ctx.set_attribute("errorMessage", message)?;
                }
            },
            Method::Other => {
                response.send_error(StatusCode::METHOD_NOT_ALLOWED, "Unsupported method");
                return Ok(Outcome::Handled);
            }
        }

        render_form(ctx, self.categories.as_ref(), "create", &category)?;
        Ok(Outcome::forward(FORM_VIEW))
    }
}
