//! Error types for the dispatch layer.

use thiserror::Error;

/// Main error type for the dispatch layer.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP server errors.
    #[error("Server error: {message}")]
    Server { message: String },

    /// Authentication errors.
    #[error("Authentication error: {kind}")]
    Auth { kind: AuthErrorKind },

    /// Validation errors.
    #[error("Validation error: {kind}")]
    Validation { kind: ValidationErrorKind },

    /// Command execution errors.
    #[error("Command error: {kind}")]
    Command { kind: CommandErrorKind },

    /// Errors reported by a domain collaborator (repository, store).
    #[error("Service error: {kind}")]
    Service { kind: ServiceErrorKind },

    /// Session store errors.
    #[error("Session error: {message}")]
    Session { message: String },

    /// View template errors.
    #[error("Template error: {message}")]
    Template { message: String },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Authentication error kinds.
#[derive(Error, Debug)]
pub enum AuthErrorKind {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account has been withdrawn")]
    AccountWithdrawn,

    #[error("Password hashing failed: {message}")]
    PasswordHash { message: String },
}

/// Validation error kinds.
#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("Missing required parameter: {param}")]
    MissingParameter { param: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("Password does not meet requirements: {message}")]
    WeakPassword { message: String },

    #[error("Invalid {kind} identifier: {value}")]
    InvalidIdentifier { kind: &'static str, value: String },
}

/// Command error kinds.
#[derive(Error, Debug)]
pub enum CommandErrorKind {
    #[error("Command execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("Cannot commit outcome: {message}")]
    MalformedDirective { message: String },
}

/// Service error kinds.
#[derive(Error, Debug)]
pub enum ServiceErrorKind {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Insufficient stock for {product_code}: requested {requested}, available {available}")]
    InsufficientStock {
        product_code: String,
        requested: u32,
        available: u32,
    },

    #[error("Storage failure: {message}")]
    Storage { message: String },
}

impl DispatchError {
    /// Shorthand for a missing request parameter.
    pub fn missing_parameter(param: impl Into<String>) -> Self {
        Self::Validation {
            kind: ValidationErrorKind::MissingParameter {
                param: param.into(),
            },
        }
    }

    /// Shorthand for an unusable request parameter.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            kind: ValidationErrorKind::InvalidParameter {
                param: param.into(),
                message: message.into(),
            },
        }
    }

    /// Shorthand for a missing domain entity.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Service {
            kind: ServiceErrorKind::NotFound {
                entity,
                id: id.into(),
            },
        }
    }

    /// Shorthand for a failed command.
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::Command {
            kind: CommandErrorKind::ExecutionFailed {
                message: message.into(),
            },
        }
    }

    /// Shorthand for an outcome the controller cannot commit.
    pub fn malformed_directive(message: impl Into<String>) -> Self {
        Self::Command {
            kind: CommandErrorKind::MalformedDirective {
                message: message.into(),
            },
        }
    }

    /// Stable error code used in audit entries.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Auth { .. } => "AUTH_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Command {
                kind: CommandErrorKind::MalformedDirective { .. },
            } => "MALFORMED_DIRECTIVE",
            Self::Command { .. } => "EXECUTION_ERROR",
            Self::Service { .. } => "SERVICE_ERROR",
            Self::Session { .. } => "SESSION_ERROR",
            Self::Template { .. } => "TEMPLATE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Message safe to show on a re-rendered form, for errors caused by user input.
    ///
    /// Returns `None` for internal failures, which commands propagate instead.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Validation { kind } => Some(kind.to_string()),
            Self::Auth {
                kind: AuthErrorKind::PasswordHash { .. },
            } => None,
            Self::Auth { kind } => Some(kind.to_string()),
            Self::Service {
                kind: ServiceErrorKind::Storage { .. },
            } => None,
            Self::Service { kind } => Some(kind.to_string()),
            _ => None,
        }
    }

    /// Whether this error reports a missing domain entity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Service {
                kind: ServiceErrorKind::NotFound { .. }
            }
        )
    }
}

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DispatchError::missing_parameter("email").code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            DispatchError::execution_failed("boom").code(),
            "EXECUTION_ERROR"
        );
        assert_eq!(
            DispatchError::malformed_directive("empty view").code(),
            "MALFORMED_DIRECTIVE"
        );
    }

    #[test]
    fn test_user_message() {
        let err = DispatchError::Auth {
            kind: AuthErrorKind::InvalidCredentials,
        };
        assert_eq!(err.user_message().unwrap(), "Invalid email or password");
        assert!(DispatchError::execution_failed("db down")
            .user_message()
            .is_none());
        assert!(DispatchError::Io(std::io::Error::other("disk"))
            .user_message()
            .is_none());
    }

    #[test]
    fn test_not_found_display() {
        let err = DispatchError::not_found("Product", "P-1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Service error: Product not found: P-1");
    }
}
