//! Input validation shared by the create payloads.

use thiserror::Error;

use super::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    Missing(&'static str),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Trimmed value of a required text field; blank counts as missing.
pub fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(trimmed.to_string())
}

/// Trimmed value of an optional text field; blank collapses to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn too_large(field: &'static str) -> ValidationError {
    ValidationError::Invalid {
        field,
        reason: format!("must not exceed {}", Decimal::max_amount()),
    }
}

/// A money amount in `0..=max_amount()`.
pub fn bounded_amount(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value.is_negative() {
        return Err(ValidationError::Invalid {
            field,
            reason: "must not be negative".to_string(),
        });
    }
    if !value.is_within_limit() {
        return Err(too_large(field));
    }
    Ok(value)
}

/// A quantity in `(0, max_amount()]`.
pub fn positive_quantity(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value.is_negative() || value.is_zero() {
        return Err(ValidationError::Invalid {
            field,
            reason: "must be positive".to_string(),
        });
    }
    if !value.is_within_limit() {
        return Err(too_large(field));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", " a ").unwrap(), "a");
        assert_eq!(
            required_text("name", "\t\n").unwrap_err(),
            ValidationError::Missing("name")
        );
    }

    #[test]
    fn test_bounded_amount() {
        assert!(bounded_amount("amount", Decimal::from_str("0").unwrap()).is_ok());
        assert!(bounded_amount("amount", Decimal::max_amount()).is_ok());

        let err = bounded_amount("amount", Decimal::from_str("-1").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "invalid amount: must not be negative");

        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();
        let err = bounded_amount("amount", huge).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid amount: must not exceed 1000000000000000"
        );
    }

    #[test]
    fn test_positive_quantity() {
        assert!(positive_quantity("qty", Decimal::from_str("0.5").unwrap()).is_ok());
        assert!(positive_quantity("qty", Decimal::zero()).is_err());
        assert!(positive_quantity("qty", Decimal::from_str("-2").unwrap()).is_err());
        let huge = Decimal::from_str("100000000000000000000").unwrap();
        assert!(positive_quantity("qty", huge).is_err());
    }
}
