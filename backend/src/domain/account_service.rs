//! Account management.
//!
//! Superadmins manage admin accounts across condominiums; admins manage the
//! guards and residents of their own condominium. Passwords are hashed
//! before the store lock is taken so the expensive Argon2 work never runs
//! inside an update.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::ports::{CondominiumRepository, StoreError, UserRepository};
use super::validation::FieldError;
use super::{
    Account, AccountFilter, CondominiumId, Error, Identity, NewAccount, PlainPassword, Role,
    UserId, hash_password, require_role, require_role_and_condo,
};

const MEMBER_ROLES: [Role; 2] = [Role::Guard, Role::User];

fn enabled_by_default() -> bool {
    true
}

/// Payload creating an admin account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDraft {
    pub condominium_id: CondominiumId,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "admin@torre-norte.test")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// Payload creating a guard or resident account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// Partial update; absent fields keep their stored value.
///
/// An empty `phone` clears the number. `role` only applies to members and
/// `condominiumId` only to admins.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub enabled: Option<bool>,
    pub role: Option<Role>,
    pub condominium_id: Option<CondominiumId>,
}

impl AccountChanges {
    fn apply(self, account: &mut Account, password_hash: Option<String>) {
        if let Some(first_name) = self.first_name {
            account.first_name = first_name.trim().to_owned();
        }
        if let Some(last_name) = self.last_name {
            account.last_name = last_name.trim().to_owned();
        }
        if let Some(email) = self.email {
            account.email = email;
        }
        if let Some(phone) = self.phone {
            account.phone = normalize_phone(Some(phone));
        }
        if let Some(enabled) = self.enabled {
            account.enabled = enabled;
        }
        if let Some(hash) = password_hash {
            account.password_hash = hash;
        }
    }
}

fn normalize_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
}

fn hash_new_password(raw: &str) -> Result<String, Error> {
    let password = PlainPassword::parse(raw)?;
    hash_password(password.expose())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

fn hash_optional_password(raw: Option<&str>) -> Result<Option<String>, Error> {
    raw.map(hash_new_password).transpose()
}

fn caller_condominium(caller: &Identity) -> Result<CondominiumId, Error> {
    caller
        .condominium_id
        .ok_or_else(|| Error::forbidden("account is not attached to a condominium"))
}

fn reject_self_delete(caller: &Identity, target: UserId) -> Result<(), Error> {
    if caller.id == target {
        return Err(Error::forbidden("you cannot delete your own account"));
    }
    Ok(())
}

fn admin_not_found(id: UserId) -> Error {
    Error::not_found(format!("admin {id} not found"))
}

fn member_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Account management service.
pub struct AccountService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> AccountService<S>
where
    S: UserRepository + CondominiumRepository + ?Sized,
{
    /// Create the service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn ensure_condominium(&self, id: CondominiumId) -> Result<(), Error> {
        match self.store.get_condominium(id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(FieldError::new(
                "condominium_id",
                "exists",
                format!("condominium {id} does not exist"),
            )
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    async fn load_admin(&self, id: UserId) -> Result<Account, Error> {
        match self.store.get_user(id).await {
            Ok(account) if account.role == Role::Admin => Ok(account),
            Ok(_) | Err(StoreError::NotFound { .. }) => Err(admin_not_found(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Load a member and check that `identity` administers its condominium.
    async fn load_member(&self, identity: Option<&Identity>, id: UserId) -> Result<Account, Error> {
        let account = match self.store.get_user(id).await {
            Ok(account) if MEMBER_ROLES.contains(&account.role) => account,
            Ok(_) | Err(StoreError::NotFound { .. }) => return Err(member_not_found(id)),
            Err(err) => return Err(err.into()),
        };
        let condo = account
            .condominium_id
            .ok_or_else(|| member_not_found(id))?;
        require_role_and_condo(identity, Role::Admin, condo)?;
        Ok(account)
    }

    /// Every visible admin account.
    ///
    /// # Errors
    /// RBAC failures and store errors.
    pub async fn list_admins(&self, identity: Option<&Identity>) -> Result<Vec<Account>, Error> {
        require_role(identity, Role::Superadmin)?;
        Ok(self
            .store
            .list_users(&AccountFilter::role(Role::Admin))
            .await?)
    }

    /// One admin account.
    ///
    /// # Errors
    /// RBAC failures and [`super::ErrorCode::NotFound`] for non-admins.
    pub async fn get_admin(
        &self,
        identity: Option<&Identity>,
        id: UserId,
    ) -> Result<Account, Error> {
        require_role(identity, Role::Superadmin)?;
        self.load_admin(id).await
    }

    /// Create an admin for an existing condominium.
    ///
    /// # Errors
    /// RBAC failures, validation errors (including an unknown condominium),
    /// a conflict for a taken email, and store errors.
    pub async fn create_admin(
        &self,
        identity: Option<&Identity>,
        draft: AdminDraft,
    ) -> Result<Account, Error> {
        let caller = *require_role(identity, Role::Superadmin)?;
        self.ensure_condominium(draft.condominium_id).await?;
        let password_hash = hash_new_password(&draft.password)?;
        let created = self
            .store
            .create_user(NewAccount {
                condominium_id: Some(draft.condominium_id),
                first_name: draft.first_name.trim().to_owned(),
                last_name: draft.last_name.trim().to_owned(),
                email: draft.email,
                phone: normalize_phone(draft.phone),
                password_hash,
                role: Role::Admin,
                enabled: draft.enabled,
                hidden: false,
                created_by: Some(caller.id),
            })
            .await?;
        info!(user_id = %created.id, created_by = %caller.id, "admin created");
        Ok(created)
    }

    /// Update an admin; `changes.condominium_id` moves them.
    ///
    /// # Errors
    /// RBAC failures, [`super::ErrorCode::NotFound`], validation errors, a
    /// conflict for a taken email, and store errors.
    pub async fn update_admin(
        &self,
        identity: Option<&Identity>,
        id: UserId,
        changes: AccountChanges,
    ) -> Result<Account, Error> {
        let caller = require_role(identity, Role::Superadmin)?.id;
        if let Some(condo) = changes.condominium_id {
            self.ensure_condominium(condo).await?;
        }
        let password_hash = hash_optional_password(changes.password.as_deref())?;
        let updated = self
            .store
            .update_user(
                id,
                Box::new(move |mut account| {
                    if account.role != Role::Admin {
                        return Err(admin_not_found(id));
                    }
                    if let Some(condo) = changes.condominium_id {
                        account.condominium_id = Some(condo);
                    }
                    changes.apply(&mut account, password_hash);
                    account.updated_by = Some(caller);
                    Ok(account)
                }),
            )
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => admin_not_found(id),
                other => other.into(),
            })?;
        Ok(updated)
    }

    /// Delete an admin.
    ///
    /// # Errors
    /// RBAC failures, self-deletion, [`super::ErrorCode::NotFound`], and
    /// store errors.
    pub async fn delete_admin(&self, identity: Option<&Identity>, id: UserId) -> Result<(), Error> {
        let caller = *require_role(identity, Role::Superadmin)?;
        reject_self_delete(&caller, id)?;
        self.load_admin(id).await?;
        self.store.delete_user(id).await?;
        info!(user_id = %id, deleted_by = %caller.id, "admin deleted");
        Ok(())
    }

    /// Guards and residents of the caller's condominium.
    ///
    /// # Errors
    /// RBAC failures and store errors.
    pub async fn list_members(&self, identity: Option<&Identity>) -> Result<Vec<Account>, Error> {
        let caller = require_role(identity, Role::Admin)?;
        let condo = caller_condominium(caller)?;
        let filter = AccountFilter {
            roles: MEMBER_ROLES.to_vec(),
            condominium_id: Some(condo),
        };
        Ok(self.store.list_users(&filter).await?)
    }

    /// One guard or resident of the caller's condominium.
    ///
    /// # Errors
    /// RBAC failures (including another condominium's member) and
    /// [`super::ErrorCode::NotFound`].
    pub async fn get_member(
        &self,
        identity: Option<&Identity>,
        id: UserId,
    ) -> Result<Account, Error> {
        require_role(identity, Role::Admin)?;
        self.load_member(identity, id).await
    }

    /// Create a guard or resident in the caller's condominium.
    ///
    /// # Errors
    /// RBAC failures, validation errors (including a non-member role), a
    /// conflict for a taken email, and store errors.
    pub async fn create_member(
        &self,
        identity: Option<&Identity>,
        draft: MemberDraft,
    ) -> Result<Account, Error> {
        let caller = *require_role(identity, Role::Admin)?;
        let condo = caller_condominium(&caller)?;
        if !MEMBER_ROLES.contains(&draft.role) {
            return Err(FieldError::new("role", "member", "role must be guard or user").into());
        }
        let password_hash = hash_new_password(&draft.password)?;
        let created = self
            .store
            .create_user(NewAccount {
                condominium_id: Some(condo),
                first_name: draft.first_name.trim().to_owned(),
                last_name: draft.last_name.trim().to_owned(),
                email: draft.email,
                phone: normalize_phone(draft.phone),
                password_hash,
                role: draft.role,
                enabled: draft.enabled,
                hidden: false,
                created_by: Some(caller.id),
            })
            .await?;
        info!(
            user_id = %created.id,
            role = %created.role,
            condominium_id = %condo,
            created_by = %caller.id,
            "member created"
        );
        Ok(created)
    }

    /// Update a guard or resident of the caller's condominium.
    ///
    /// # Errors
    /// RBAC failures, [`super::ErrorCode::NotFound`], validation errors, a
    /// conflict for a taken email, and store errors.
    pub async fn update_member(
        &self,
        identity: Option<&Identity>,
        id: UserId,
        changes: AccountChanges,
    ) -> Result<Account, Error> {
        let caller = require_role(identity, Role::Admin)?.id;
        let current = self.load_member(identity, id).await?;
        if changes
            .role
            .is_some_and(|role| !MEMBER_ROLES.contains(&role))
        {
            return Err(FieldError::new("role", "member", "role must be guard or user").into());
        }
        let password_hash = hash_optional_password(changes.password.as_deref())?;
        let expected_condo = current.condominium_id;
        let updated = self
            .store
            .update_user(
                id,
                Box::new(move |mut account| {
                    if account.condominium_id != expected_condo
                        || !MEMBER_ROLES.contains(&account.role)
                    {
                        return Err(member_not_found(id));
                    }
                    if let Some(role) = changes.role {
                        account.role = role;
                    }
                    changes.apply(&mut account, password_hash);
                    account.updated_by = Some(caller);
                    Ok(account)
                }),
            )
            .await?;
        Ok(updated)
    }

    /// Delete a guard or resident of the caller's condominium.
    ///
    /// # Errors
    /// RBAC failures, self-deletion, [`super::ErrorCode::NotFound`], and
    /// store errors.
    pub async fn delete_member(
        &self,
        identity: Option<&Identity>,
        id: UserId,
    ) -> Result<(), Error> {
        let caller = *require_role(identity, Role::Admin)?;
        reject_self_delete(&caller, id)?;
        self.load_member(identity, id).await?;
        self.store.delete_user(id).await?;
        info!(user_id = %id, deleted_by = %caller.id, "member deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
