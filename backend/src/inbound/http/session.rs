//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Only `user_id` is trusted when a request comes back; `role`,
//! `condominium_id` and `enabled` are written alongside it for log
//! correlation and are re-read from the store on every request.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Identity, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";
pub(crate) const CONDOMINIUM_ID_KEY: &str = "condominium_id";
pub(crate) const ENABLED_KEY: &str = "enabled";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated identity in the session cookie.
    ///
    /// The session id is renewed first so a cookie issued before login can
    /// never be promoted to an authenticated one.
    pub fn persist_identity(&self, identity: &Identity) -> Result<(), Error> {
        self.0.renew();
        self.insert(USER_ID_KEY, identity.id.get())?;
        self.insert(ROLE_KEY, identity.role.as_str())?;
        self.insert(CONDOMINIUM_ID_KEY, identity.condominium_id.map(|id| id.get()))?;
        self.insert(ENABLED_KEY, identity.enabled)
    }

    fn insert<T: serde::Serialize>(&self, key: &str, value: T) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The user id recorded at login, if the cookie carries a valid one.
    ///
    /// A value that fails to decode is treated as no session at all.
    pub fn user_id(&self) -> Option<UserId> {
        match self.0.get::<i64>(USER_ID_KEY) {
            Ok(id) => id.map(UserId::new),
            Err(error) => {
                tracing::warn!(%error, "invalid user id in session cookie");
                None
            }
        }
    }

    /// Drop every value and expire the cookie in the response.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
