//! Stored file download command.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::FileStore;
use crate::validation::validate_file_id;

use super::DOWNLOAD_COMMAND;

/// Stream a stored file identified by the URL path.
pub struct FileDownloadCommand {
    files: Arc<dyn FileStore>,
}

impl FileDownloadCommand {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }
}

/// Original name reduced to characters safe inside a quoted header value.
fn disposition_name(original_name: &str) -> String {
    let name: String = original_name
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/'))
        .collect();
    if name.trim().is_empty() {
        "download".to_string()
    } else {
        name
    }
}

impl Command for FileDownloadCommand {
    fn name(&self) -> &'static str {
        DOWNLOAD_COMMAND
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(file_id) = ctx.resource_id() else {
            response.send_error(StatusCode::BAD_REQUEST, "Missing file id");
            return Ok(Outcome::Handled);
        };

        let stored = match validate_file_id(file_id) {
            Ok(file_id) => self.files.find(file_id)?,
            Err(_) => None,
        };
        let Some(stored) = stored else {
            debug!(file_id = %file_id, "File not found");
            response.send_error(StatusCode::NOT_FOUND, "File not found");
            return Ok(Outcome::Handled);
        };

        let bytes = match self.files.read(&stored.file_id) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                response.send_error(StatusCode::NOT_FOUND, "File not found");
                return Ok(Outcome::Handled);
            }
            Err(e) => return Err(e),
        };

        response.set_content_type(stored.content_type());
        response.set_header("content-length", bytes.len().to_string());
        response.set_header(
            "content-disposition",
            format!("inline; filename=\"{}\"", disposition_name(&stored.original_name)),
        );
        response.write(&bytes);
        Ok(Outcome::Handled)
    }

    fn requires_audit(&self) -> bool {
        // Images on every product page
        false
    }
}
