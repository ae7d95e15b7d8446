//! Command outcomes.

use crate::error::DispatchError;

/// What the controller should do after a command returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Render the named view with the request's model.
    Forward(String),
    /// Send the client to another location.
    Redirect(String),
    /// The command wrote the response itself.
    Handled,
}

impl Outcome {
    /// Render a view.
    pub fn forward(view: impl Into<String>) -> Self {
        Outcome::Forward(view.into())
    }

    /// Redirect the client.
    pub fn redirect(location: impl Into<String>) -> Self {
        Outcome::Redirect(location.into())
    }

    /// Check that the controller can commit this outcome.
    pub fn validate(&self) -> Result<(), DispatchError> {
        match self {
            Outcome::Forward(view) => {
                if view.trim().is_empty() {
                    return Err(DispatchError::malformed_directive("empty view name"));
                }
                if view.split('/').any(|segment| segment == "..") || view.starts_with('/') {
                    return Err(DispatchError::malformed_directive(format!(
                        "view name '{}' escapes the views directory",
                        view
                    )));
                }
                Ok(())
            }
            Outcome::Redirect(location) => {
                let allowed = location.starts_with('/')
                    || location.starts_with("http://")
                    || location.starts_with("https://");
                if !allowed || location.contains(['\r', '\n']) {
                    return Err(DispatchError::malformed_directive(format!(
                        "unusable redirect target '{}'",
                        location
                    )));
                }
                Ok(())
            }
            Outcome::Handled => Ok(()),
        }
    }

    /// Short label for logs and audit entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Forward(_) => "forward",
            Outcome::Redirect(_) => "redirect",
            Outcome::Handled => "handled",
        }
    }
}
