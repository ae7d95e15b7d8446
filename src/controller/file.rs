//! Stored file controller (`/file/<id>`).

use std::sync::Arc;

use crate::commands::file::DOWNLOAD_COMMAND;
use crate::commands::CommandFactory;
use crate::protocol::{HttpRequest, HttpResponse};

use super::domain::Pipeline;
use super::{Controller, ControllerEnv};

const PREFIX: &str = "/file";

/// Runs the download command for every request; the path segment after
/// `/file/` is the file id.
pub struct FileDownloadController {
    pipeline: Pipeline,
}

impl FileDownloadController {
    pub fn new(factory: impl CommandFactory + 'static, env: Arc<ControllerEnv>) -> Self {
        Self {
            pipeline: Pipeline::new("file".to_string(), Box::new(factory), env),
        }
    }

    /// File id from the path. `/file`, `/file/` and nested paths carry none.
    pub fn resource_id(path: &str) -> Option<String> {
        let id = path.strip_prefix(PREFIX)?.strip_prefix('/')?;
        if id.is_empty() || id.contains('/') {
            None
        } else {
            Some(id.to_string())
        }
    }
}

impl Controller for FileDownloadController {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn handle(&self, request: HttpRequest) -> HttpResponse {
        let resource_id = Self::resource_id(request.path());
        self.pipeline
            .run(request, Some(DOWNLOAD_COMMAND.to_string()), resource_id)
    }
}
