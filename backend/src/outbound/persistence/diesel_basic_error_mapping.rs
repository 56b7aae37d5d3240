//! Diesel and pool error mapping onto [`StoreError`].
//!
//! Constraint violations carry meaning for the domain (a taken email, a
//! condominium still in use), so they are classified by constraint name
//! instead of collapsing into a generic query failure.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::StoreError;

use super::pool::PoolError;

/// Map pool checkout/build failures to a connection error.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    StoreError::connection(message)
}

fn conflict_error(constraint: Option<&str>, kind: &DatabaseErrorKind) -> StoreError {
    match (kind, constraint) {
        (DatabaseErrorKind::UniqueViolation, Some("visits_pkey")) => {
            StoreError::duplicate_visit_code()
        }
        _ => StoreError::conflict(conflict_message(constraint, kind)),
    }
}

fn conflict_message(constraint: Option<&str>, kind: &DatabaseErrorKind) -> &'static str {
    match (kind, constraint) {
        (DatabaseErrorKind::UniqueViolation, Some("users_email_key")) => "email already in use",
        (DatabaseErrorKind::UniqueViolation, _) => "duplicate record",
        (DatabaseErrorKind::ForeignKeyViolation, Some(name))
            if name.starts_with("users_condominium_id")
                || name.starts_with("visits_condominium_id") =>
        {
            "condominium is missing or still has accounts or visits"
        }
        _ => "referenced record is missing or still in use",
    }
}

/// Map Diesel failures to store errors.
pub(crate) fn map_diesel_error(error: DieselError) -> StoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => StoreError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreError::connection("database connection error")
        }
        DieselError::DatabaseError(
            kind @ (DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation),
            info,
        ) => conflict_error(info.constraint_name(), &kind),
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
            StoreError::query(format!(
                "check constraint {} rejected the row",
                info.constraint_name().unwrap_or("unknown")
            ))
        }
        DieselError::DatabaseError(_, _) => StoreError::query("database error"),
        _ => StoreError::query("database error"),
    }
}

/// Error type threaded through a transaction body.
///
/// Diesel needs `From<diesel::result::Error>` on the transaction's error
/// type; domain failures raised inside the body travel in the other arm.
#[derive(Debug)]
pub(crate) enum TxError {
    Diesel(DieselError),
    Store(StoreError),
}

impl From<DieselError> for TxError {
    fn from(value: DieselError) -> Self {
        Self::Diesel(value)
    }
}

impl From<StoreError> for TxError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<TxError> for StoreError {
    fn from(value: TxError) -> Self {
        match value {
            TxError::Diesel(err) => map_diesel_error(err),
            TxError::Store(err) => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, StoreError::connection("timed out"));
    }

    #[rstest]
    #[case(DieselError::NotFound)]
    #[case(DieselError::RollbackTransaction)]
    fn other_failures_are_query_errors(#[case] error: DieselError) {
        assert!(matches!(map_diesel_error(error), StoreError::Query { .. }));
    }

    #[rstest]
    #[case(DatabaseErrorKind::UniqueViolation, Some("users_email_key"), "email already in use")]
    #[case(
        DatabaseErrorKind::ForeignKeyViolation,
        Some("users_condominium_id_fkey"),
        "condominium is missing or still has accounts or visits"
    )]
    #[case(
        DatabaseErrorKind::ForeignKeyViolation,
        Some("visits_created_by_fkey"),
        "referenced record is missing or still in use"
    )]
    fn constraint_names_pick_the_message(
        #[case] kind: DatabaseErrorKind,
        #[case] constraint: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(conflict_message(constraint, &kind), expected);
    }

    #[rstest]
    fn visit_code_clashes_get_their_own_variant() {
        assert_eq!(
            conflict_error(Some("visits_pkey"), &DatabaseErrorKind::UniqueViolation),
            StoreError::duplicate_visit_code()
        );
        assert_eq!(
            conflict_error(
                Some("visits_created_by_fkey"),
                &DatabaseErrorKind::ForeignKeyViolation
            ),
            StoreError::conflict("referenced record is missing or still in use")
        );
    }

    #[rstest]
    fn transaction_errors_unwrap_domain_failures() {
        let err: StoreError = TxError::from(StoreError::not_found("visit", "X")).into();
        assert!(err.is_not_found());
    }
}
