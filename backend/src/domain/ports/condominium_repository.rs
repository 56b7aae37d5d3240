//! Port for condominium persistence.

use async_trait::async_trait;

use crate::domain::{Condominium, CondominiumId, NewCondominium};

use super::{Mutator, StoreError};

/// Condominium storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CondominiumRepository: Send + Sync {
    /// Fetch one condominium; [`StoreError::NotFound`] when absent.
    async fn get_condominium(&self, id: CondominiumId) -> Result<Condominium, StoreError>;

    /// List every condominium, ordered by id.
    async fn list_condominiums(&self) -> Result<Vec<Condominium>, StoreError>;

    /// Validate and insert a new condominium.
    async fn create_condominium(
        &self,
        condominium: NewCondominium,
    ) -> Result<Condominium, StoreError>;

    /// Atomically apply `mutator` to the current row, then validate and persist.
    async fn update_condominium(
        &self,
        id: CondominiumId,
        mutator: Mutator<Condominium>,
    ) -> Result<Condominium, StoreError>;

    /// Remove a condominium.
    ///
    /// Fails with [`StoreError::Conflict`] while accounts or visits still
    /// reference it.
    async fn delete_condominium(&self, id: CondominiumId) -> Result<(), StoreError>;
}
