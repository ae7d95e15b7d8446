//! Product image metadata lookup.

use std::sync::Arc;

use serde_json::json;

use crate::commands::traits::Command;
use crate::commands::types::ExecutionContext;
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::services::FileStore;
use crate::validation::validate_file_id;

/// Answer JSON metadata for `fileId`, used by the edit form's image preview.
pub struct ProductFileInfoCommand {
    files: Arc<dyn FileStore>,
}

impl ProductFileInfoCommand {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }
}

impl Command for ProductFileInfoCommand {
    fn name(&self) -> &'static str {
        "file-info"
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        let Some(file_id) = ctx.param("fileId") else {
            response.send_json(&json!({ "error": "Missing file id" }));
            return Ok(Outcome::Handled);
        };

        let stored = match validate_file_id(file_id) {
            Ok(file_id) => self.files.find(file_id)?,
            Err(_) => None,
        };

        let body = match stored {
            Some(stored) => json!({
                "fileId": stored.file_id,
                "originalFileName": stored.original_name,
                "fileExtension": stored.extension,
                "fileType": stored.content_type(),
                "size": stored.size,
            }),
            None => json!({ "error": "File not found" }),
        };
        response.send_json(&body);
        Ok(Outcome::Handled)
    }

    fn requires_audit(&self) -> bool {
        false
    }
}
