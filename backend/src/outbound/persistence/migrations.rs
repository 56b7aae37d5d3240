//! Embedded schema migrations applied at startup.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Migrations compiled into the binary from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while bringing the schema up to date.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed to apply.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
}

/// Apply every pending migration and return how many ran.
///
/// Uses a blocking connection; call it from `spawn_blocking` inside a
/// runtime.
///
/// # Errors
/// Returns [`MigrationError`] when connecting or applying fails.
pub fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut connection = PgConnection::establish(database_url)?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply(err.to_string()))?;
    Ok(applied.len())
}
