//! Server entry-point: loads settings, selects the store, bootstraps the
//! superadmin, and serves the JSON API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock, DefaultEnv};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use entry_watch::domain::ensure_superadmin;
use entry_watch::inbound::http::health::HealthState;
use entry_watch::inbound::http::session_config::fingerprint::key_fingerprint;
use entry_watch::inbound::http::session_config::{BuildMode, session_settings_from_env};
use entry_watch::settings::AppSettings;
use ortho_config::OrthoConfig;
use server::{ServerConfig, build_store, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("load session settings")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = build_store(&settings, Arc::clone(&clock)).await?;

    if settings.bootstrap_superadmin {
        ensure_superadmin(store.as_ref())
            .await
            .wrap_err("bootstrap superadmin")?;
    }

    let bind_addr = settings.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig::new(session, bind_addr, store, clock),
    )?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}
