//! Port for visitor pass persistence.

use async_trait::async_trait;

use crate::domain::{CondominiumId, NewVisit, UserId, Visit, VisitCode};

use super::{Mutator, StoreError};

/// Visit storage keyed by code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Fetch one visit; [`StoreError::NotFound`] when absent.
    async fn get_visit(&self, code: &VisitCode) -> Result<Visit, StoreError>;

    /// Visits issued by one resident, newest first.
    async fn list_visits_by_creator(&self, creator: UserId) -> Result<Vec<Visit>, StoreError>;

    /// Visits of one condominium, newest first.
    async fn list_visits_by_condominium(
        &self,
        condominium_id: CondominiumId,
    ) -> Result<Vec<Visit>, StoreError>;

    /// Validate and insert a new visit; a code clash is a
    /// [`StoreError::DuplicateVisitCode`].
    async fn create_visit(&self, visit: NewVisit) -> Result<Visit, StoreError>;

    /// Atomically apply `mutator` to the current row, then validate and persist.
    ///
    /// Concurrent updates of the same code are serialised, so the mutator
    /// always sees the latest committed `uses`.
    async fn update_visit(
        &self,
        code: &VisitCode,
        mutator: Mutator<Visit>,
    ) -> Result<Visit, StoreError>;

    /// Remove a visit; [`StoreError::NotFound`] when absent.
    async fn delete_visit(&self, code: &VisitCode) -> Result<(), StoreError>;
}
