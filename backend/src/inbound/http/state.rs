//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data`. Everything in it is
//! built over the `Store` trait object, so the same handlers run against the
//! in-memory store in tests and PostgreSQL in production.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{LoginService, Store};
use crate::domain::{AccountService, CondominiumService, PasswordLoginService, VisitService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Backing store; the identity resolver reads accounts through it.
    pub store: Arc<dyn Store>,
    pub login: Arc<dyn LoginService>,
    pub condominiums: CondominiumService<dyn Store>,
    pub accounts: AccountService<dyn Store>,
    pub visits: VisitService<dyn Store>,
}

impl HttpState {
    /// Wire every service over `store`, with password login.
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        let login = Arc::new(PasswordLoginService::new(Arc::clone(&store)));
        Self::with_login(store, login, clock)
    }

    /// As [`HttpState::new`] with a caller-supplied login port.
    pub fn with_login(
        store: Arc<dyn Store>,
        login: Arc<dyn LoginService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            condominiums: CondominiumService::new(Arc::clone(&store)),
            accounts: AccountService::new(Arc::clone(&store)),
            visits: VisitService::new(Arc::clone(&store), clock),
            login,
            store,
        }
    }
}
