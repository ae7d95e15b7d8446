//! Admin category editing.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, warn};

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Method, Outcome};
use crate::services::{Category, CategoryStore};

use super::{apply_form, category_id_param, render_form, FORM_VIEW, LIST_PAGE};

/// GET shows the form for `categoryId`, POST saves it.
///
/// Renaming or moving a category re-derives the full names of everything
/// below it.
pub struct CategoryEditCommand {
    categories: Arc<dyn CategoryStore>,
}

impl CategoryEditCommand {
    pub fn new(categories: Arc<dyn CategoryStore>) -> Self {
        Self { categories }
    }

    fn save(&self, ctx: &ExecutionContext, category: &mut Category) -> Result<(), DispatchError> {
        apply_form(ctx, category)?;
        *category = self.categories.update(category)?;
        Ok(())
    }
}

impl Command for CategoryEditCommand {
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

        let category = match category_id_param(ctx) {
            Ok(id) => self.categories.find(id)?,
            Err(_) => None,
        };
        let Some(mut category) = category else {
            response.send_error(StatusCode::NOT_FOUND, "Category not found");
            return Ok(Outcome::Handled);
        };

        if ctx.is_post() {
            match self.save(ctx, &mut category) {
                Ok(()) => {
                    info!(
                        category_id = category.category_id,
                        full_name = %category.full_name,
                        "Category updated"
                    );
                    return Ok(Outcome::redirect(format!("{}?success=update", LIST_PAGE)));
                }
                Err(e) => {
                    let Some(message) = e.user_message() else {
                        return Err(e);
                    };
                    warn!(category_id = category.category_id, error = %e, "Category update rejected");
                    ctx.set_attribute("errorMessage", message)?;
                }
            }
        }

        render_form(ctx, self.categories.as_ref(), "edit", &category)?;
        Ok(Outcome::forward(FORM_VIEW))
    }
}
