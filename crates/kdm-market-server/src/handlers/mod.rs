//! HTTP handlers, grouped per resource family.
//!
//! Handlers stay thin: decode, validate, call into the service layer or
//! the ORM, encode. Anything that can fail returns [`ApiError`] and lets
//! its `IntoResponse` impl shape the `{"error": ...}` body.

pub mod auth;
pub mod carts;
pub mod goods;
pub mod orders;
pub mod payments;
pub mod users;

use crate::error::ApiError;

/// Closed set check for enum-like string fields.
pub(crate) fn ensure_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), ApiError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ApiError::Validation(format!(
        "Недопустимое значение поля {field}: {value}."
    )))
}

pub(crate) fn ensure_positive(field: &str, value: i32) -> Result<(), ApiError> {
    if value > 0 {
        return Ok(());
    }
    Err(ApiError::Validation(format!(
        "Поле {field} должно быть больше нуля."
    )))
}

pub(crate) fn ensure_non_negative(field: &str, value: f64) -> Result<(), ApiError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(ApiError::Validation(format!(
        "Поле {field} не может быть отрицательным."
    )))
}

pub(crate) fn ensure_discount(value: f64) -> Result<(), ApiError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        return Ok(());
    }
    Err(ApiError::Validation(
        "Скидка должна быть в диапазоне от 0 до 100.".to_string(),
    ))
}

pub(crate) fn ensure_email(value: &str) -> Result<(), ApiError> {
    let trimmed = value.trim();
    let well_formed = trimmed.len() >= 3
        && trimmed.contains('@')
        && !trimmed.starts_with('@')
        && !trimmed.ends_with('@')
        && !trimmed.contains(char::is_whitespace);
    if well_formed {
        return Ok(());
    }
    Err(ApiError::Validation("Некорректный email.".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_range_is_inclusive() {
        assert!(ensure_discount(0.0).is_ok());
        assert!(ensure_discount(100.0).is_ok());
        assert!(ensure_discount(-0.1).is_err());
        assert!(ensure_discount(100.1).is_err());
        assert!(ensure_discount(f64::NAN).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(ensure_email("a@b.com").is_ok());
        assert!(ensure_email("  a@b.com  ").is_ok());
        assert!(ensure_email("plain").is_err());
        assert!(ensure_email("@b.com").is_err());
        assert!(ensure_email("a@").is_err());
        assert!(ensure_email("a b@c.com").is_err());
    }
}
