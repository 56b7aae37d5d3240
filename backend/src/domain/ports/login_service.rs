//! Driving port for the login use-case.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing store, which keeps handler tests free of persistence.

use async_trait::async_trait;

use crate::domain::{Account, Error, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated account.
    ///
    /// Unknown emails and wrong passwords are indistinguishable
    /// ([`crate::domain::ErrorCode::Unauthorized`]); disabled accounts are
    /// [`crate::domain::ErrorCode::Forbidden`].
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error>;
}
