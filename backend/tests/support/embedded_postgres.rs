//! Embedded PostgreSQL helpers for integration tests.
//!
//! - Each test gets its own database cloned from a template that already has
//!   every migration applied, so suites never share rows.
//! - The template name embeds a hash of `backend/migrations`, so editing a
//!   migration produces a fresh template instead of reusing a stale one.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use entry_watch::domain::ports::StoreError;
use entry_watch::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "entry_watch_template";
const TEMPLATE_PROVISION_RETRIES: usize = 5;
const TEMPLATE_PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, StoreError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| StoreError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Create the template database with migrations applied, once per name.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, StoreError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| StoreError::query(format!("template check: {err:?}")))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| StoreError::query(format!("create template: {err:?}")))?;
        let url = cluster.connection().database_url(&template_name);
        run_pending_migrations(&url)
            .map_err(|err| StoreError::query(format!("migration: {err}")))?;
    }
    Ok(template_name)
}

/// Provision a temporary database cloned from the migration template.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, StoreError> {
    let mut last_error = None;
    for attempt in 1..=TEMPLATE_PROVISION_RETRIES {
        let result = ensure_template_database(cluster).and_then(|template| {
            cluster
                .temporary_database_from_template(
                    format!("test_{}", Uuid::new_v4().simple()).as_str(),
                    template.as_str(),
                )
                .map_err(|err| {
                    StoreError::query(format!(
                        "create database from template: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {err:?}"
                    ))
                })
        });
        match result {
            Ok(database) => return Ok(database),
            Err(error) => last_error = Some(error),
        }
        if attempt < TEMPLATE_PROVISION_RETRIES {
            std::thread::sleep(TEMPLATE_PROVISION_RETRY_DELAY);
        }
    }

    Err(last_error.unwrap_or_else(|| {
        StoreError::query("create database from template: exhausted retries")
    }))
}

/// Drop the `visits` table to simulate schema loss.
pub fn drop_visits_table(url: &str) -> Result<(), StoreError> {
    let mut client = Client::connect(url, NoTls)
        .map_err(|err| StoreError::connection(format_postgres_error(&err)))?;
    client
        .batch_execute("DROP TABLE IF EXISTS visits;")
        .map_err(|err| StoreError::query(format_postgres_error(&err)))
}
