//! Audit sinks.
//!
//! The file logger writes structured audit entries as JSON lines (one JSON
//! object per line) for easy parsing by log analysis tools.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::DispatchError;

use super::entry::AuditEntry;

/// Destination for audit entries.
///
/// Recording is fire-and-forget from the controller's point of view: an
/// error returned here is logged and never changes the response.
pub trait AuditSink: Send + Sync {
    fn log(&self, entry: &AuditEntry) -> Result<(), DispatchError>;
}

/// Logger for audit entries.
///
/// Writes audit entries to a file in JSON lines format.
/// Thread-safe via internal mutex.
pub struct AuditLogger {
    /// The file handle wrapped in a mutex for thread safety.
    file: Mutex<File>,
    /// Path to the audit log file.
    path: PathBuf,
}

impl AuditLogger {
    /// Create a new audit logger that writes to the specified path.
    ///
    /// Creates the parent directory if it doesn't exist.
    /// Opens the file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory cannot be created
    /// - File cannot be opened for appending
    pub fn new(path: &Path) -> Result<Self, DispatchError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!(path = %parent.display(), "Creating audit log directory");
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        debug!(path = %path.display(), "Audit logger initialized");

        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the audit log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for AuditLogger {
    /// Serializes the entry to JSON and writes it as a single line.
    /// Syncs the file after writing for durability.
    fn log(&self, entry: &AuditEntry) -> Result<(), DispatchError> {
        let json = serde_json::to_string(entry)?;

        let mut file = self.file.lock().map_err(|e| DispatchError::Server {
            message: format!("Failed to acquire audit log lock: {}", e),
        })?;

        writeln!(file, "{}", json)?;

        if let Err(e) = file.sync_data() {
            warn!(error = %e, "Failed to sync audit log");
        }

        debug!(
            request_id = %entry.request_id,
            domain = %entry.domain,
            "Audit entry logged"
        );

        Ok(())
    }
}

/// A no-op audit sink for when audit logging is disabled.
pub struct NullAuditLogger;

impl NullAuditLogger {
    /// Create a new null audit logger.
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullAuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for NullAuditLogger {
    fn log(&self, _entry: &AuditEntry) -> Result<(), DispatchError> {
        Ok(())
    }
}
