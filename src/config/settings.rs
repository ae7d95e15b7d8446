//! Configuration settings for the dispatch server.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::DispatchError;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Idle time after which a session expires.
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    /// Interval of the background sweep of expired sessions.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

/// Paths configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory containing view templates.
    #[serde(default = "default_views_dir")]
    pub views_dir: PathBuf,
    /// Directory for uploaded files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Whether audit logging is enabled.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Path to the audit log file.
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Where the auth gate sends requests without a valid session.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Administrator account created at startup if absent.
    pub admin_email: Option<String>,
    /// Password for the bootstrap administrator.
    pub admin_password: Option<String>,
}

// Default value functions
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1_048_576 // 10MB
}

fn default_cookie_name() -> String {
    "SESSIONID".to_string()
}

fn default_session_ttl() -> u64 {
    1800
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_views_dir() -> PathBuf {
    PathBuf::from("views")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("logs/audit.log")
}

fn default_login_path() -> String {
    "/user/login".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_seconds: default_session_ttl(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            views_dir: default_views_dir(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            admin_email: None,
            admin_password: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DispatchError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DispatchError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        Self::parse(&content).map_err(|e| DispatchError::Config {
            message: format!("Invalid config file '{}': {}", path.display(), e),
        })
    }

    /// Parse and validate settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, DispatchError> {
        let settings: Settings = toml::from_str(content).map_err(|e| DispatchError::Config {
            message: format!("Failed to parse settings: {}", e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, DispatchError> {
        self.server
            .bind
            .parse()
            .map_err(|e| DispatchError::Config {
                message: format!("Invalid bind address '{}': {}", self.server.bind, e),
            })
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), DispatchError> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(DispatchError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        // Validate log format
        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(DispatchError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        self.bind_addr()?;

        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DispatchError::Config {
                message: format!(
                    "Invalid session cookie name '{}'",
                    self.session.cookie_name
                ),
            });
        }

        if self.session.ttl_seconds == 0 {
            return Err(DispatchError::Config {
                message: "Session ttl_seconds must be greater than zero".to_string(),
            });
        }

        if !self.auth.login_path.starts_with('/') {
            return Err(DispatchError::Config {
                message: format!(
                    "Login path '{}' must start with '/'",
                    self.auth.login_path
                ),
            });
        }

        if self.auth.admin_email.is_some() != self.auth.admin_password.is_some() {
            return Err(DispatchError::Config {
                message: "admin_email and admin_password must be set together".to_string(),
            });
        }

        Ok(())
    }
}
