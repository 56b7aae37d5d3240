//! PostgreSQL-backed `VisitRepository`.
//!
//! `update_visit` locks the row with `SELECT … FOR UPDATE` for the length of
//! the transaction, so concurrent entries against one pass serialise and the
//! mutator always sees the latest `uses`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{Mutator, StoreError, VisitRepository};
use crate::domain::{CondominiumId, NewVisit, UserId, Visit, VisitCode};

use super::diesel_basic_error_mapping::{TxError, map_diesel_error};
use super::diesel_store::DieselStore;
use super::models::{NewVisitRow, VisitRow, VisitUpdate};
use super::schema::visits;

fn visit_not_found(code: &VisitCode) -> StoreError {
    StoreError::not_found("visit", code.as_str())
}

#[async_trait]
impl VisitRepository for DieselStore {
    async fn get_visit(&self, code: &VisitCode) -> Result<Visit, StoreError> {
        let mut conn = self.conn().await?;
        let row: Option<VisitRow> = visits::table
            .find(code.as_str())
            .select(VisitRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Visit::from).ok_or_else(|| visit_not_found(code))
    }

    async fn list_visits_by_creator(&self, creator: UserId) -> Result<Vec<Visit>, StoreError> {
        let mut conn = self.conn().await?;
        let rows: Vec<VisitRow> = visits::table
            .filter(visits::created_by.eq(creator.get()))
            .select(VisitRow::as_select())
            .order_by((visits::created_at.desc(), visits::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Visit::from).collect())
    }

    async fn list_visits_by_condominium(
        &self,
        condominium_id: CondominiumId,
    ) -> Result<Vec<Visit>, StoreError> {
        let mut conn = self.conn().await?;
        let rows: Vec<VisitRow> = visits::table
            .filter(visits::condominium_id.eq(condominium_id.get()))
            .select(VisitRow::as_select())
            .order_by((visits::created_at.desc(), visits::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Visit::from).collect())
    }

    async fn create_visit(&self, visit: NewVisit) -> Result<Visit, StoreError> {
        visit.validate()?;
        let mut conn = self.conn().await?;
        let row: VisitRow = diesel::insert_into(visits::table)
            .values(NewVisitRow::from_draft(&visit, self.now()))
            .returning(VisitRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn update_visit(
        &self,
        code: &VisitCode,
        mutator: Mutator<Visit>,
    ) -> Result<Visit, StoreError> {
        let now = self.now();
        let code = code.clone();
        let mut conn = self.conn().await?;
        let row = conn
            .transaction::<VisitRow, TxError, _>(|conn| {
                async move {
                    let current: Visit = visits::table
                        .find(code.as_str())
                        .select(VisitRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .map(Visit::from)
                        .ok_or_else(|| visit_not_found(&code))?;

                    let mut next = mutator(current.clone()).map_err(StoreError::rejected)?;
                    next.code = current.code.clone();
                    next.condominium_id = current.condominium_id;
                    next.created_by = current.created_by;
                    next.created_at = current.created_at;
                    next.validate_update(&current).map_err(StoreError::from)?;
                    next.updated_at = now;

                    let row = diesel::update(visits::table.find(code.as_str()))
                        .set(VisitUpdate::from_entity(&next))
                        .returning(VisitRow::as_returning())
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

    async fn delete_visit(&self, code: &VisitCode) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(visits::table.find(code.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(visit_not_found(code));
        }
        Ok(())
    }
}
