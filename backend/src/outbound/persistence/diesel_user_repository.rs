//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{Mutator, StoreError, UserRepository};
use crate::domain::{Account, AccountFilter, NewAccount, Role, UserId, normalize_email};

use super::diesel_basic_error_mapping::{TxError, map_diesel_error};
use super::diesel_store::DieselStore;
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::schema::users;

fn user_not_found(id: UserId) -> StoreError {
    StoreError::not_found("user", id.to_string())
}

fn rows_to_accounts(rows: Vec<UserRow>) -> Result<Vec<Account>, StoreError> {
    rows.into_iter().map(Account::try_from).collect()
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl UserRepository for DieselStore {
    async fn get_user(&self, id: UserId) -> Result<Account, StoreError> {
        let mut conn = self.conn().await?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.ok_or_else(|| user_not_found(id))?.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let mut conn = self.conn().await?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(normalize_email(email)))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Account::try_from).transpose()
    }

    async fn list_users(&self, filter: &AccountFilter) -> Result<Vec<Account>, StoreError> {
        let mut conn = self.conn().await?;
        let mut query = users::table
            .filter(users::hidden.eq(false))
            .select(UserRow::as_select())
            .order_by(users::id)
            .into_boxed();
        if !filter.roles.is_empty() {
            let roles: Vec<&'static str> = filter.roles.iter().map(|r| r.as_str()).collect();
            query = query.filter(users::role.eq_any(roles));
        }
        if let Some(condo) = filter.condominium_id {
            query = query.filter(users::condominium_id.eq(condo.get()));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows_to_accounts(rows)
    }

    async fn create_user(&self, account: NewAccount) -> Result<Account, StoreError> {
        account.validate()?;
        let email = normalize_email(&account.email);
        let mut conn = self.conn().await?;
        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow::from_draft(&account, &email, self.now()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row.try_into()
    }

    async fn update_user(
        &self,
        id: UserId,
        mutator: Mutator<Account>,
    ) -> Result<Account, StoreError> {
        let now = self.now();
        let mut conn = self.conn().await?;
        let row = conn
            .transaction::<UserRow, TxError, _>(|conn| {
                async move {
                    let current: Option<UserRow> = users::table
                        .find(id.get())
                        .select(UserRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let current = Account::try_from(current.ok_or_else(|| user_not_found(id))?)?;

                    let mut next = mutator(current.clone()).map_err(StoreError::rejected)?;
                    next.id = current.id;
                    next.created_at = current.created_at;
                    next.created_by = current.created_by;
                    next.email = normalize_email(&next.email);
                    next.validate().map_err(StoreError::from)?;
                    next.updated_at = now;

                    let row = diesel::update(users::table.find(id.get()))
                        .set(UserUpdate::from_entity(&next))
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(StoreError::from)?;
        row.try_into()
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }

    async fn count_users_by_role(&self, role: Role) -> Result<u64, StoreError> {
        let mut conn = self.conn().await?;
        let count: i64 = users::table
            .filter(users::role.eq(role.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(count))
    }

    async fn count_superadmins(&self) -> Result<u64, StoreError> {
        let mut conn = self.conn().await?;
        let count: i64 = users::table
            .filter(users::role.eq(Role::Superadmin.as_str()))
            .filter(users::enabled.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(count))
    }
}
