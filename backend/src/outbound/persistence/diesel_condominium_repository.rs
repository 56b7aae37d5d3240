//! PostgreSQL-backed `CondominiumRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{CondominiumRepository, Mutator, StoreError};
use crate::domain::{Condominium, CondominiumId, NewCondominium};

use super::diesel_basic_error_mapping::{TxError, map_diesel_error};
use super::diesel_store::DieselStore;
use super::models::{CondominiumRow, CondominiumUpdate, NewCondominiumRow};
use super::schema::condominiums;

fn condominium_not_found(id: CondominiumId) -> StoreError {
    StoreError::not_found("condominium", id.to_string())
}

#[async_trait]
impl CondominiumRepository for DieselStore {
    async fn get_condominium(&self, id: CondominiumId) -> Result<Condominium, StoreError> {
        let mut conn = self.conn().await?;
        let row: Option<CondominiumRow> = condominiums::table
            .find(id.get())
            .select(CondominiumRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Condominium::from)
            .ok_or_else(|| condominium_not_found(id))
    }

    async fn list_condominiums(&self) -> Result<Vec<Condominium>, StoreError> {
        let mut conn = self.conn().await?;
        let rows: Vec<CondominiumRow> = condominiums::table
            .select(CondominiumRow::as_select())
            .order_by(condominiums::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Condominium::from).collect())
    }

    async fn create_condominium(
        &self,
        condominium: NewCondominium,
    ) -> Result<Condominium, StoreError> {
        condominium.validate()?;
        let mut conn = self.conn().await?;
        let row: CondominiumRow = diesel::insert_into(condominiums::table)
            .values(NewCondominiumRow::from_draft(&condominium, self.now()))
            .returning(CondominiumRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn update_condominium(
        &self,
        id: CondominiumId,
        mutator: Mutator<Condominium>,
    ) -> Result<Condominium, StoreError> {
        let now = self.now();
        let mut conn = self.conn().await?;
        let row = conn
            .transaction::<CondominiumRow, TxError, _>(|conn| {
                async move {
                    let current: Condominium = condominiums::table
                        .find(id.get())
                        .select(CondominiumRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .map(Condominium::from)
                        .ok_or_else(|| condominium_not_found(id))?;

                    let mut next = mutator(current.clone()).map_err(StoreError::rejected)?;
                    next.id = current.id;
                    next.created_at = current.created_at;
                    next.created_by = current.created_by;
                    next.validate().map_err(StoreError::from)?;
                    next.updated_at = now;

                    let row = diesel::update(condominiums::table.find(id.get()))
                        .set(CondominiumUpdate::from_entity(&next))
                        .returning(CondominiumRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(StoreError::from)?;
        Ok(row.into())
    }

    async fn delete_condominium(&self, id: CondominiumId) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(condominiums::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(condominium_not_found(id));
        }
        Ok(())
    }
}
