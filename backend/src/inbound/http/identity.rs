//! Per-request identity resolution.
//!
//! The session cookie only carries a user id. [`CurrentIdentity`] reloads
//! that account from the store on every request so deletions, role changes
//! and disablement apply immediately.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{info, warn};

use crate::domain::{Error, Identity};

use super::session::SessionContext;
use super::state::HttpState;

/// The caller's identity, or `None` for anonymous requests.
///
/// Handlers pass [`CurrentIdentity::as_ref`] straight to the RBAC gate, which
/// turns `None` into `401` and a disabled identity into `403`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentIdentity(Option<Identity>);

impl CurrentIdentity {
    /// Wrap an already resolved identity.
    pub fn new(identity: Option<Identity>) -> Self {
        Self(identity)
    }

    /// Borrow the identity for the RBAC gate.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    /// Take the identity out.
    pub fn into_inner(self) -> Option<Identity> {
        self.0
    }
}

/// Resolve the session against the store.
///
/// # Errors
/// Store failures other than a missing account; the request must not fall
/// back to anonymous when the store cannot answer.
pub async fn resolve_identity(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Option<Identity>, Error> {
    let Some(user_id) = session.user_id() else {
        return Ok(None);
    };

    match state.store.get_user(user_id).await {
        Ok(account) if account.enabled => Ok(Some(account.identity())),
        Ok(account) => {
            info!(user_id = %user_id, "session belongs to a disabled account; purging");
            session.purge();
            Ok(Some(account.identity()))
        }
        Err(err) if err.is_not_found() => {
            warn!(user_id = %user_id, "session refers to a missing account; purging");
            session.purge();
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

impl FromRequest for CurrentIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let session = session.await?;
            let identity = resolve_identity(&state, &session).await?;
            Ok(Self(identity))
        })
    }
}
