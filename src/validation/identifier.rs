//! Identifier validation.
//!
//! Product codes, order ids, file ids and category ids arrive from query strings and URL
//! paths. Only plain tokens are accepted, so no identifier can carry a path
//! separator or traversal sequence into a store.

use crate::error::{DispatchError, ValidationErrorKind};

/// Maximum length for product codes and order ids.
const MAX_CODE_LENGTH: usize = 30;

/// Maximum length for file ids.
const MAX_FILE_ID_LENGTH: usize = 64;

fn invalid(kind: &'static str, value: &str) -> DispatchError {
    DispatchError::Validation {
        kind: ValidationErrorKind::InvalidIdentifier {
            kind,
            value: value.to_string(),
        },
    }
}

fn validate_token<'a>(
    kind: &'static str,
    value: &'a str,
    max_length: usize,
    extra: &[char],
) -> Result<&'a str, DispatchError> {
    if value.is_empty() || value.len() > max_length {
        return Err(invalid(kind, value));
    }

    if value.contains("..")
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || extra.contains(&c))
    {
        return Err(invalid(kind, value));
    }

    Ok(value)
}

/// Validate a product code: letters, digits, `-` and `_`, up to 30 characters.
pub fn validate_product_code(code: &str) -> Result<&str, DispatchError> {
    validate_token("product", code, MAX_CODE_LENGTH, &['-', '_'])
}

/// Validate an order id: letters, digits and `-`, up to 30 characters.
pub fn validate_order_id(order_id: &str) -> Result<&str, DispatchError> {
    validate_token("order", order_id, MAX_CODE_LENGTH, &['-'])
}

/// Validate a file id: letters and digits, up to 64 characters.
pub fn validate_file_id(file_id: &str) -> Result<&str, DispatchError> {
    validate_token("file", file_id, MAX_FILE_ID_LENGTH, &[])
}

/// Parse a category id: a positive integer.
pub fn parse_category_id(raw: &str) -> Result<u64, DispatchError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid("category", raw)),
    }
}
