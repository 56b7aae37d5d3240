//! Builders for the store behind the HTTP state.

use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use entry_watch::domain::ports::Store;
use entry_watch::outbound::memory::MemoryStore;
use entry_watch::outbound::persistence::{DbPool, DieselStore, PoolConfig, run_pending_migrations};
use entry_watch::settings::AppSettings;
use mockable::Clock;
use tracing::{info, warn};

/// Pick the store for this process.
///
/// With a database URL the schema is migrated and a pooled PostgreSQL store
/// is returned; otherwise data lives in memory for the life of the process.
///
/// # Errors
/// Fails when migrations cannot be applied or the pool cannot be built.
pub async fn build_store(settings: &AppSettings, clock: Arc<dyn Clock>) -> Result<Arc<dyn Store>> {
    let Some(database_url) = settings.database_url() else {
        warn!("no database URL configured; using the in-memory store");
        return Ok(Arc::new(MemoryStore::new(clock)));
    };

    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .map_err(|err| eyre!("migration task failed: {err}"))?
        .wrap_err("apply database migrations")?;
    info!(applied, "database migrations complete");

    let config = PoolConfig::new(database_url).with_max_size(settings.pool_max_size());
    let pool = DbPool::new(config)
        .await
        .wrap_err("build database connection pool")?;
    Ok(Arc::new(DieselStore::new(pool, clock)))
}
