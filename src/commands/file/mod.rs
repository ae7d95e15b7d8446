//! File download (`/file/<id>`).

mod download;

use std::sync::Arc;

use crate::services::ServiceRegistry;

use super::factory::CommandTable;

pub use download::FileDownloadCommand;

/// The only command of the file domain.
pub const DOWNLOAD_COMMAND: &str = "download";

/// Command table for the `/file` domain.
pub fn file_commands(services: &ServiceRegistry) -> CommandTable {
    CommandTable::new(
        "file",
        vec![Arc::new(FileDownloadCommand::new(services.files.clone()))],
    )
}
