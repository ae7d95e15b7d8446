//! Account field validation.
//!
//! Validates join and modify form input before it reaches the user repository.

use crate::error::{DispatchError, ValidationErrorKind};

/// Password length bounds (inclusive).
const MIN_PASSWORD_LENGTH: usize = 5;
const MAX_PASSWORD_LENGTH: usize = 15;

/// Maximum length for display names.
const MAX_USER_NAME_LENGTH: usize = 50;

/// Maximum length for email addresses.
const MAX_EMAIL_LENGTH: usize = 254;

/// Validate an email address.
///
/// Accepts `local@domain.tld` where the local part uses letters, digits and
/// `._%+-`, the domain uses letters, digits, `.` and `-`, and the top-level
/// label is at least two letters.
pub fn validate_email(email: &str) -> Result<&str, DispatchError> {
    let invalid = || DispatchError::Validation {
        kind: ValidationErrorKind::InvalidEmail {
            email: email.to_string(),
        },
    };

    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;

    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return Err(invalid());
    }

    if domain.is_empty()
        || !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(invalid());
    }

    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    Ok(email)
}

/// Validate password strength.
///
/// Rules:
/// - 5 to 15 characters
/// - At least one uppercase letter, one lowercase letter and one digit
pub fn validate_password(password: &str) -> Result<&str, DispatchError> {
    let weak = |message: &str| DispatchError::Validation {
        kind: ValidationErrorKind::WeakPassword {
            message: message.to_string(),
        },
    };

    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(weak(&format!(
            "must be {} to {} characters",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(weak("must contain an uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(weak("must contain a lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(weak("must contain a digit"));
    }

    Ok(password)
}

/// Validate a display name.
pub fn validate_user_name(name: &str) -> Result<&str, DispatchError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(DispatchError::invalid_parameter(
            "userName",
            "Name cannot be empty",
        ));
    }

    if trimmed.chars().count() > MAX_USER_NAME_LENGTH {
        return Err(DispatchError::invalid_parameter(
            "userName",
            format!(
                "Name exceeds maximum length of {} characters",
                MAX_USER_NAME_LENGTH
            ),
        ));
    }

    if trimmed.chars().any(|c| c.is_control() || c == '<' || c == '>') {
        return Err(DispatchError::invalid_parameter(
            "userName",
            "Name contains invalid characters",
        ));
    }

    Ok(trimmed)
}

/// Validate a mobile number: digits with optional `-` separators.
pub fn validate_mobile_number(number: &str) -> Result<&str, DispatchError> {
    let digits = number.chars().filter(|c| c.is_ascii_digit()).count();
    if !(9..=15).contains(&digits) || !number.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Err(DispatchError::invalid_parameter(
            "mobileNumber",
            "Mobile number must contain 9 to 15 digits",
        ));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("kim@example.com").is_ok());
        assert!(validate_email("first.last+shop@mail.example.co.kr").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("kim@").is_err());
        assert!(validate_email("kim@example").is_err());
        assert!(validate_email("kim@example.c").is_err());
        assert!(validate_email("kim smith@example.com").is_err());
        assert!(validate_email("kim@exa_mple.com").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Abc12").is_ok());
        assert!(validate_password("Abc1").is_err()); // too short
        assert!(validate_password("Abcdefgh12345678").is_err()); // too long
        assert!(validate_password("abc123").is_err()); // no uppercase
        assert!(validate_password("ABC123").is_err()); // no lowercase
        assert!(validate_password("Abcdef").is_err()); // no digit
    }

    #[test]
    fn test_weak_password_kind() {
        let err = validate_password("abc").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Validation {
                kind: ValidationErrorKind::WeakPassword { .. }
            }
        ));
    }

    #[test]
    fn test_user_name() {
        assert_eq!(validate_user_name("  Kim  ").unwrap(), "Kim");
        assert!(validate_user_name("   ").is_err());
        assert!(validate_user_name("<script>").is_err());
        assert!(validate_user_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_mobile_number() {
        assert!(validate_mobile_number("010-1234-5678").is_ok());
        assert!(validate_mobile_number("01012345678").is_ok());
        assert!(validate_mobile_number("010-12").is_err());
        assert!(validate_mobile_number("+82 10 1234").is_err());
    }
}
