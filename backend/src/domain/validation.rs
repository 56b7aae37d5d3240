//! Field-level validation shared by the domain entities.
//!
//! Failures carry the offending field and a stable code so inbound adapters
//! can render them next to the right input. Messages are user-safe.

use serde_json::json;

use super::Error;

/// A single invalid field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    field: &'static str,
    code: &'static str,
    message: String,
}

impl FieldError {
    /// Build a field error.
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }

    /// Name of the invalid field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Stable machine-readable reason.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        Self::invalid_request(value.message.clone())
            .with_details(json!({ "field": value.field, "code": value.code }))
    }
}

/// Check that `value` holds between `min` and `max` characters (inclusive).
///
/// # Errors
/// Returns a [`FieldError`] with code `length` when out of range.
pub fn char_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), FieldError> {
    let count = value.chars().count();
    if (min..=max).contains(&count) {
        Ok(())
    } else {
        Err(FieldError::new(
            field,
            "length",
            format!("{field} must be between {min} and {max} characters"),
        ))
    }
}

/// Check that a required text field is not blank.
///
/// # Errors
/// Returns a [`FieldError`] with code `required` when blank.
pub fn required(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::new(
            field,
            "required",
            format!("{field} is required"),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("", 1, 3, false)]
    #[case("a", 1, 3, true)]
    #[case("abc", 1, 3, true)]
    #[case("abcd", 1, 3, false)]
    #[case("ñññ", 1, 3, true)]
    fn char_length_counts_characters(
        #[case] value: &str,
        #[case] min: usize,
        #[case] max: usize,
        #[case] ok: bool,
    ) {
        assert_eq!(char_length("name", value, min, max).is_ok(), ok);
    }

    #[rstest]
    fn field_error_maps_to_user_safe_error() {
        let err: Error = char_length("name", "", 1, 200)
            .expect_err("empty")
            .into();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "name must be between 1 and 200 characters");
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "name", "code": "length" }))
        );
    }

    #[rstest]
    fn required_rejects_whitespace() {
        let err = required("email", "   ").expect_err("blank");
        assert_eq!(err.field(), "email");
        assert_eq!(err.code(), "required");
    }
}
