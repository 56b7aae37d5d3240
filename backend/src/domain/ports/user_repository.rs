//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{Account, AccountFilter, NewAccount, Role, UserId};

use super::{Mutator, StoreError};

/// Account storage.
///
/// Emails are unique (compared lower-cased); a clashing create or update
/// fails with [`StoreError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch one account; [`StoreError::NotFound`] when absent.
    async fn get_user(&self, id: UserId) -> Result<Account, StoreError>;

    /// Look an account up by (normalised) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// List visible accounts matching `filter`, ordered by id.
    async fn list_users(&self, filter: &AccountFilter) -> Result<Vec<Account>, StoreError>;

    /// Validate and insert a new account.
    async fn create_user(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Atomically apply `mutator` to the current row, then validate and persist.
    ///
    /// Nothing is written when the mutator fails or its result is invalid.
    async fn update_user(
        &self,
        id: UserId,
        mutator: Mutator<Account>,
    ) -> Result<Account, StoreError>;

    /// Remove an account; [`StoreError::NotFound`] when absent.
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;

    /// Exact count of accounts holding `role`, hidden ones included.
    async fn count_users_by_role(&self, role: Role) -> Result<u64, StoreError>;

    /// Exact count of enabled superadmins.
    async fn count_superadmins(&self) -> Result<u64, StoreError>;
}
