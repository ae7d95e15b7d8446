//! Tera-backed view rendering.

use std::path::Path;
use std::sync::Arc;

use tera::{Context, Tera};
use tracing::{debug, info};

use crate::error::DispatchError;

/// Renders a named view with a JSON model.
///
/// Controllers call this for [`crate::protocol::Outcome::Forward`].
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, model: &serde_json::Value) -> Result<String, DispatchError>;
}

/// Template engine for rendering views.
///
/// View `user/login` is rendered from template `user/login.html.tera`.
#[derive(Clone)]
pub struct TemplateEngine {
    tera: Arc<Tera>,
}

impl TemplateEngine {
    /// Create a new template engine, loading templates from the specified directory.
    ///
    /// Templates are loaded recursively from the directory with `.tera` extension.
    pub fn new(template_dir: &Path) -> Result<Self, DispatchError> {
        let pattern = template_dir.join("**/*.tera");
        let pattern_str = pattern.to_string_lossy();

        debug!(pattern = %pattern_str, "Loading view templates");

        let mut tera = Tera::new(&pattern_str).map_err(|e| DispatchError::Template {
            message: format!(
                "Failed to load templates from '{}': {}",
                template_dir.display(),
                e
            ),
        })?;
        // Tera only escapes `.html` by default
        tera.autoescape_on(vec![".html.tera", ".html"]);

        info!(
            directory = %template_dir.display(),
            count = tera.get_template_names().count(),
            "View engine initialized"
        );

        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Create a template engine with no templates.
    pub fn empty() -> Self {
        Self {
            tera: Arc::new(Tera::default()),
        }
    }

    /// Template name backing a view.
    pub fn template_name(view: &str) -> String {
        format!("{}.html.tera", view)
    }

    /// Check if a view has a template.
    pub fn has_view(&self, view: &str) -> bool {
        let name = Self::template_name(view);
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Get the number of loaded templates.
    pub fn template_count(&self) -> usize {
        self.tera.get_template_names().count()
    }
}

impl ViewRenderer for TemplateEngine {
    fn render(&self, view: &str, model: &serde_json::Value) -> Result<String, DispatchError> {
        let context = Context::from_serialize(model).map_err(|e| DispatchError::Template {
            message: format!("Invalid view model: {}", e),
        })?;

        let name = Self::template_name(view);
        self.tera
            .render(&name, &context)
            .map_err(|e| DispatchError::Template {
                message: format!("Failed to render view '{}': {}", view, e),
            })
    }
}
