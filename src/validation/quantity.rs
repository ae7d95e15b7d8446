//! Basket quantity validation.

use crate::error::DispatchError;

/// Largest quantity accepted for one basket line.
pub const MAX_QUANTITY: u32 = 999;

/// Parse a quantity, falling back to 1 when the value is absent or not a number.
///
/// Only parsing is lenient; [`validate_quantity`] still rejects the result if
/// it is out of range.
pub fn parse_quantity_or_default(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

/// Validate a quantity: 1 to [`MAX_QUANTITY`].
pub fn validate_quantity(quantity: i64) -> Result<u32, DispatchError> {
    if quantity <= 0 {
        return Err(DispatchError::invalid_parameter(
            "quantity",
            "Quantity must be at least 1",
        ));
    }
    if quantity > i64::from(MAX_QUANTITY) {
        return Err(DispatchError::invalid_parameter(
            "quantity",
            format!("Quantity cannot exceed {}", MAX_QUANTITY),
        ));
    }
    Ok(quantity as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_one() {
        assert_eq!(parse_quantity_or_default(None), 1);
        assert_eq!(parse_quantity_or_default(Some("abc")), 1);
        assert_eq!(parse_quantity_or_default(Some(" 3 ")), 3);
        assert_eq!(parse_quantity_or_default(Some("-2")), -2);
    }

    #[test]
    fn test_validate_range() {
        assert_eq!(validate_quantity(1).unwrap(), 1);
        assert_eq!(validate_quantity(999).unwrap(), 999);
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
        assert!(validate_quantity(1000).is_err());
    }
}
