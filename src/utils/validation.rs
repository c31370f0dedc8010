use crate::utils::error::{KclError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> KclError {
    KclError::InvalidValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_contains(field_name: &str, value: &str, needle: &str) -> Result<()> {
    if !value.contains(needle) {
        return Err(invalid(
            field_name,
            value,
            format!("Value must contain '{}'", needle),
        ));
    }
    Ok(())
}

/// Fails when a value (compared case-insensitively) shows up in both lists.
pub fn validate_disjoint(field_name: &str, left: &[String], right: &[String]) -> Result<()> {
    let left_set: HashSet<String> = left.iter().map(|v| v.to_lowercase()).collect();
    if let Some(shared) = right.iter().find(|v| left_set.contains(&v.to_lowercase())) {
        return Err(invalid(
            field_name,
            shared,
            "Value is listed on both sides",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN is outside of every range
    if !(min <= value && value <= max) {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("buffer_size", 5, 1).is_ok());
        assert!(validate_positive_number("buffer_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("var_format", "${%s}").is_ok());
        assert!(validate_non_empty_string("var_format", "   ").is_err());
    }

    #[test]
    fn test_validate_contains() {
        assert!(validate_contains("var_format", "${%s}", "%s").is_ok());
        assert!(validate_contains("var_format", "${}", "%s").is_err());
    }

    #[test]
    fn test_validate_disjoint() {
        let yes = vec!["true".to_string(), "on".to_string()];
        let no = vec!["false".to_string(), "off".to_string()];
        assert!(validate_disjoint("booleans", &yes, &no).is_ok());

        let clash = vec!["ON".to_string()];
        let err = validate_disjoint("booleans", &yes, &clash).unwrap_err();
        assert!(err.to_string().contains("ON"));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("latitude", 45.0, -90.0, 90.0).is_ok());
        assert!(validate_range("latitude", 91.0, -90.0, 90.0).is_err());
        assert!(validate_range("latitude", f64::NAN, -90.0, 90.0).is_err());
        assert!(validate_range("size", 3, 1, 3).is_ok());
    }
}
