use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationError;

/// A validation error whose Display is the human readable message
pub fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Validate hex color format (#RRGGBB)
pub fn validate_color_hex(color: &str) -> Result<(), ValidationError> {
    if color.len() != 7 {
        return Err(invalid("invalid_length", "Color must be in #RRGGBB format"));
    }
    if !color.starts_with('#') {
        return Err(invalid("missing_hash", "Color must be in #RRGGBB format"));
    }
    if !color[1..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("invalid_hex_chars", "Color must be in #RRGGBB format"));
    }
    Ok(())
}

/// Validate that a monetary value is finite and non-negative
pub fn validate_non_negative(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            "non_negative",
            "Amounts must be finite and non-negative",
        ));
    }
    Ok(())
}

/// Validate that a monetary value is finite and strictly positive
pub fn validate_positive(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("amount_must_be_positive", "Amount must be positive"));
    }
    Ok(())
}

/// Flexible bounds only constrain each other once a maximum is set.
pub fn validate_bounds(min_amount: f64, max_amount: f64) -> Result<(), ValidationError> {
    validate_non_negative(min_amount)?;
    validate_non_negative(max_amount)?;
    if max_amount > 0.0 && min_amount > max_amount {
        return Err(invalid(
            "bounds",
            "minAmount must not exceed maxAmount",
        ));
    }
    Ok(())
}

/// Percentage of `amount` consumed by `spent`; zero when nothing is budgeted.
pub fn progress_percent(spent: f64, amount: f64) -> f64 {
    if amount > 0.0 {
        spent / amount * 100.0
    } else {
        0.0
    }
}

/// Confirmation returned by delete endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Success message
    #[schema(example = "Category deleted successfully")]
    pub message: String,
    /// Deleted resource ID
    #[schema(example = 1)]
    pub id: i64,
}

impl DeleteResponse {
    pub fn new(message: &str, id: i64) -> Self {
        Self {
            message: message.to_string(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_color_hex() {
        assert!(validate_color_hex("#4CAF50").is_ok());
        assert!(validate_color_hex("4CAF50").is_err());
        assert!(validate_color_hex("#4CAF5").is_err());
        assert!(validate_color_hex("#4CAG50").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(0.0).is_ok());
        assert!(validate_non_negative(12.5).is_ok());
        assert!(validate_non_negative(-0.01).is_err());
        assert!(validate_non_negative(f64::NAN).is_err());
        assert!(validate_non_negative(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validation_messages_are_readable() {
        let err = validate_non_negative(-1.0).expect_err("negative amount");
        assert_eq!(err.to_string(), "Amounts must be finite and non-negative");

        let err = validate_bounds(150.0, 100.0).expect_err("inverted bounds");
        assert_eq!(err.to_string(), "minAmount must not exceed maxAmount");
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(0.01).is_ok());
        assert!(validate_positive(0.0).is_err());
        assert!(validate_positive(-3.0).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds(0.0, 0.0).is_ok());
        assert!(validate_bounds(50.0, 0.0).is_ok(), "no maximum set");
        assert!(validate_bounds(50.0, 100.0).is_ok());
        assert!(validate_bounds(150.0, 100.0).is_err());
        assert!(validate_bounds(-1.0, 100.0).is_err());
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(60.0, 100.0), 60.0);
        assert_eq!(progress_percent(25.0, 50.0), 50.0);
        assert_eq!(progress_percent(10.0, 0.0), 0.0);
        assert_eq!(progress_percent(0.0, 0.0), 0.0);
    }
}
