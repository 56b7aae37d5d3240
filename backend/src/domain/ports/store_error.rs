//! Errors shared by every store port, plus their domain mapping.

use crate::domain::Error;
use crate::domain::validation::FieldError;

use super::define_port_error;

define_port_error! {
    /// Failures raised by store adapters.
    pub enum StoreError {
        /// No row with the requested key exists.
        NotFound { entity: String, key: String } => "{entity} {key} not found",
        /// The entity (or a mutator's result) violates its invariants.
        Validation { error: FieldError } => "{error}",
        /// A uniqueness or referential constraint blocked the write.
        Conflict { message: String } => "{message}",
        /// The visit code is already held by another visit.
        DuplicateVisitCode => "visit code already issued",
        /// The update mutator refused the change; carries its error verbatim.
        Rejected { error: Error } => "{error}",
        /// The store could not be reached.
        Connection { message: String } => "store connection failed: {message}",
        /// A query failed for any other reason.
        Query { message: String } => "store query failed: {message}",
    }
}

impl StoreError {
    /// Whether this is a [`StoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<FieldError> for StoreError {
    fn from(value: FieldError) -> Self {
        Self::validation(value)
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { entity, key } => {
                Self::not_found(format!("{entity} {key} not found"))
            }
            StoreError::Validation { error } => error.into(),
            StoreError::Conflict { message } => Self::conflict(message),
            StoreError::DuplicateVisitCode => Self::conflict("visit code already issued"),
            StoreError::Rejected { error } => error,
            StoreError::Connection { message } => {
                Self::service_unavailable(format!("store unavailable: {message}"))
            }
            StoreError::Query { message } => Self::internal(format!("store error: {message}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(StoreError::not_found("visit", "ABC"), ErrorCode::NotFound)]
    #[case(
        StoreError::validation(FieldError::new("name", "length", "too long")),
        ErrorCode::InvalidRequest
    )]
    #[case(StoreError::conflict("email already in use"), ErrorCode::Conflict)]
    #[case(StoreError::duplicate_visit_code(), ErrorCode::Conflict)]
    #[case(StoreError::rejected(Error::forbidden("no")), ErrorCode::Forbidden)]
    #[case(StoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(StoreError::query("syntax"), ErrorCode::InternalError)]
    fn maps_to_domain_codes(#[case] error: StoreError, #[case] expected: ErrorCode) {
        assert_eq!(Error::from(error).code(), expected);
    }

    #[rstest]
    fn rejected_errors_pass_through_unchanged() {
        let original = Error::invalid_request("visit has expired");
        assert_eq!(Error::from(StoreError::rejected(original.clone())), original);
    }

    #[rstest]
    fn not_found_message_names_the_entity() {
        let err = StoreError::not_found("condominium", "4");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "condominium 4 not found");
    }
}
