//! Condominium management for superadmins.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::ports::CondominiumRepository;
use super::{
    Condominium, CondominiumId, Error, Identity, NewCondominium, Role, require_role,
    require_role_and_condo,
};

/// Create/update payload for a condominium.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CondominiumDraft {
    #[schema(example = "Torre Norte")]
    pub name: String,
    #[schema(example = "Av. Siempre Viva 742")]
    pub address: String,
}

/// Superadmin CRUD over condominiums, plus the admin's read of their own.
pub struct CondominiumService<R: ?Sized> {
    condominiums: Arc<R>,
}

impl<R: ?Sized> Clone for CondominiumService<R> {
    fn clone(&self) -> Self {
        Self {
            condominiums: Arc::clone(&self.condominiums),
        }
    }
}

impl<R> CondominiumService<R>
where
    R: CondominiumRepository + ?Sized,
{
    /// Create the service over `condominiums`.
    pub fn new(condominiums: Arc<R>) -> Self {
        Self { condominiums }
    }

    /// Every condominium.
    ///
    /// # Errors
    /// RBAC failures and store errors.
    pub async fn list(&self, identity: Option<&Identity>) -> Result<Vec<Condominium>, Error> {
        require_role(identity, Role::Superadmin)?;
        Ok(self.condominiums.list_condominiums().await?)
    }

    /// One condominium by id.
    ///
    /// # Errors
    /// RBAC failures, [`super::ErrorCode::NotFound`], and store errors.
    pub async fn get(
        &self,
        identity: Option<&Identity>,
        id: CondominiumId,
    ) -> Result<Condominium, Error> {
        require_role(identity, Role::Superadmin)?;
        Ok(self.condominiums.get_condominium(id).await?)
    }

    /// The condominium an admin belongs to.
    ///
    /// # Errors
    /// RBAC failures; a superadmin has no condominium of their own and gets
    /// [`super::ErrorCode::NotFound`].
    pub async fn get_own(&self, identity: Option<&Identity>) -> Result<Condominium, Error> {
        let caller = require_role(identity, Role::Admin)?;
        let id = caller
            .condominium_id
            .ok_or_else(|| Error::not_found("account has no condominium"))?;
        require_role_and_condo(identity, Role::Admin, id)?;
        Ok(self.condominiums.get_condominium(id).await?)
    }

    /// Create a condominium.
    ///
    /// # Errors
    /// RBAC failures, validation errors, and store errors.
    pub async fn create(
        &self,
        identity: Option<&Identity>,
        draft: CondominiumDraft,
    ) -> Result<Condominium, Error> {
        let caller = require_role(identity, Role::Superadmin)?;
        let created = self
            .condominiums
            .create_condominium(NewCondominium {
                name: draft.name.trim().to_owned(),
                address: draft.address.trim().to_owned(),
                created_by: Some(caller.id),
            })
            .await?;
        info!(condominium_id = %created.id, created_by = %caller.id, "condominium created");
        Ok(created)
    }

    /// Replace a condominium's name and address.
    ///
    /// # Errors
    /// RBAC failures, [`super::ErrorCode::NotFound`], validation errors, and
    /// store errors.
    pub async fn update(
        &self,
        identity: Option<&Identity>,
        id: CondominiumId,
        draft: CondominiumDraft,
    ) -> Result<Condominium, Error> {
        let caller = require_role(identity, Role::Superadmin)?.id;
        let updated = self
            .condominiums
            .update_condominium(
                id,
                Box::new(move |mut condo| {
                    condo.name = draft.name.trim().to_owned();
                    condo.address = draft.address.trim().to_owned();
                    condo.updated_by = Some(caller);
                    Ok(condo)
                }),
            )
            .await?;
        Ok(updated)
    }

    /// Delete a condominium that nothing references any more.
    ///
    /// # Errors
    /// RBAC failures, [`super::ErrorCode::NotFound`],
    /// [`super::ErrorCode::Conflict`] while referenced, and store errors.
    pub async fn delete(&self, identity: Option<&Identity>, id: CondominiumId) -> Result<(), Error> {
        let caller = require_role(identity, Role::Superadmin)?;
        self.condominiums.delete_condominium(id).await?;
        info!(condominium_id = %id, deleted_by = %caller.id, "condominium deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "condominium_service_tests.rs"]
mod tests;
