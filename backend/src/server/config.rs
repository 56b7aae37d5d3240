//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use entry_watch::domain::ports::Store;
use entry_watch::inbound::http::session_config::SessionSettings;
use mockable::Clock;

/// Everything [`super::create_server`] needs to serve requests.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: Arc<dyn Store>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ServerConfig {
    /// Combine validated session settings with the chosen store.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            store,
            clock,
        }
    }
}
