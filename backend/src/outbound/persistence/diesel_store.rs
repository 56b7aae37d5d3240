//! The PostgreSQL store shared by the Diesel repository implementations.

use std::sync::Arc;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::PooledConnection;
use mockable::Clock;

use crate::domain::ports::StoreError;

use super::diesel_basic_error_mapping::map_pool_error;
use super::pool::DbPool;

/// Diesel-backed implementation of every store port.
///
/// The user, condominium, and visit repositories are implemented in sibling
/// modules. Timestamps come from the injected clock so tests control them.
#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselStore {
    /// Create a store over `pool`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub(crate) async fn conn(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, StoreError> {
        self.pool.get().await.map_err(map_pool_error)
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        crate::outbound::storage_now(self.clock.as_ref())
    }
}
