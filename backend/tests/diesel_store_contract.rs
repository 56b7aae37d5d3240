//! The shared store contract run against [`DieselStore`] on embedded
//! PostgreSQL.
//!
//! # Runtime Strategy
//!
//! Provisioning uses the blocking `postgres` client, which must not run
//! inside a Tokio runtime, so each test owns a runtime and blocks on the
//! async contract checks itself.

use std::sync::Arc;

use entry_watch::domain::VisitCode;
use entry_watch::domain::ports::{StoreError, VisitRepository};
use entry_watch::outbound::persistence::{DbPool, DieselStore, PoolConfig};
use entry_watch::test_support::MutableClock;
use entry_watch::test_support::store_contract as contract;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::embedded_postgres::drop_visits_table;
use support::{handle_cluster_setup_failure, provision_template_database};

struct TestContext {
    runtime: Runtime,
    store: Arc<DieselStore>,
    clock: Arc<MutableClock>,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let database = provision_template_database(cluster).map_err(|err| err.to_string())?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(8)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    let clock = Arc::new(MutableClock::at_fixture());
    let store = Arc::new(DieselStore::new(pool, clock.clone()));

    Ok(TestContext {
        runtime,
        store,
        clock,
        database_url,
        _database: database,
    })
}

#[fixture]
fn diesel_store() -> Option<TestContext> {
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn missing_rows_are_not_found(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime
        .block_on(contract::missing_rows_are_not_found(ctx.store.as_ref()));
}

#[rstest]
fn created_rows_read_back(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime
        .block_on(contract::created_rows_read_back(ctx.store.as_ref()));
}

#[rstest]
fn invalid_creates_are_rejected(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime
        .block_on(contract::invalid_creates_are_rejected(ctx.store.as_ref()));
}

#[rstest]
fn duplicate_email_is_a_conflict(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime
        .block_on(contract::duplicate_email_is_a_conflict(ctx.store.as_ref()));
}

#[rstest]
fn update_is_all_or_nothing(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime.block_on(contract::update_is_all_or_nothing(
        ctx.store.as_ref(),
        &ctx.clock,
    ));
}

#[rstest]
fn counts_are_exact(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime
        .block_on(contract::counts_are_exact(ctx.store.as_ref()));
}

#[rstest]
fn listings_are_filtered(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime
        .block_on(contract::listings_are_filtered(ctx.store.as_ref()));
}

#[rstest]
fn referenced_condominium_delete_conflicts(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime.block_on(contract::referenced_condominium_delete_conflicts(
        ctx.store.as_ref(),
    ));
}

#[rstest]
fn visits_by_code_creator_and_condominium(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime.block_on(contract::visits_by_code_creator_and_condominium(
        ctx.store.as_ref(),
    ));
}

#[rstest]
fn concurrent_updates_are_serialised(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime.block_on(contract::concurrent_updates_are_serialised(
        Arc::clone(&ctx.store),
        &ctx.clock,
    ));
}

#[rstest]
fn bootstrap_is_idempotent(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime
        .block_on(contract::bootstrap_is_idempotent(ctx.store.as_ref()));
}

#[rstest]
fn bootstrap_leaves_a_taken_email_alone(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    ctx.runtime
        .block_on(contract::bootstrap_leaves_a_taken_email_alone(
            ctx.store.as_ref(),
        ));
}

#[rstest]
fn missing_table_surfaces_as_a_query_error(diesel_store: Option<TestContext>) {
    let Some(ctx) = diesel_store else { return };
    drop_visits_table(&ctx.database_url).expect("drop visits table");

    let result = ctx.runtime.block_on(
        ctx.store
            .get_visit(&VisitCode::from_stored("ABCDEFGH23".to_owned())),
    );

    assert!(
        matches!(result, Err(StoreError::Query { .. })),
        "expected a query error, got {result:?}"
    );
}
