//! PostgreSQL persistence through Diesel.
//!
//! [`DieselStore`] implements every store port over a `bb8` pool of
//! `diesel-async` connections. Row structs (`models.rs`) and the table
//! definitions (`schema.rs`) stay private; only domain types cross the
//! boundary.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use entry_watch::outbound::persistence::{DbPool, DieselStore, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/entry_watch")).await?;
//! let store = DieselStore::new(pool, Arc::new(mockable::DefaultClock));
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_condominium_repository;
mod diesel_store;
mod diesel_user_repository;
mod diesel_visit_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_store::DieselStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
