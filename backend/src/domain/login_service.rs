//! Password login against the account store.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{error, info};

use super::ports::{LoginService, UserRepository};
use super::{Account, Error, LoginCredentials, hash_password, verify_password};

/// Hash compared against when the email is unknown, so both paths pay for
/// one Argon2 verification.
fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| hash_password("decoy-password-never-matches").ok())
        .as_deref()
}

/// [`LoginService`] that checks Argon2 hashes held by a [`UserRepository`].
pub struct PasswordLoginService<R: ?Sized> {
    users: Arc<R>,
}

impl<R: ?Sized> PasswordLoginService<R> {
    /// Create the service over `users`.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

impl<R: ?Sized> Clone for PasswordLoginService<R> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

#[async_trait]
impl<R> LoginService for PasswordLoginService<R>
where
    R: UserRepository + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error> {
        let account = self
            .users
            .find_user_by_email(credentials.email())
            .await
            .map_err(Error::from)?;

        let Some(account) = account else {
            if let Some(decoy) = decoy_hash() {
                let _ = verify_password(credentials.password(), decoy);
            }
            info!(email = credentials.email(), "login failed: unknown email");
            return Err(invalid_credentials());
        };

        let matches = verify_password(credentials.password(), &account.password_hash)
            .map_err(|err| {
                error!(user_id = %account.id, error = %err, "stored password hash unusable");
                Error::internal("password verification failed")
            })?;
        if !matches {
            info!(user_id = %account.id, "login failed: wrong password");
            return Err(invalid_credentials());
        }
        if !account.enabled {
            info!(user_id = %account.id, "login refused: account disabled");
            return Err(Error::forbidden("account is disabled"));
        }

        info!(user_id = %account.id, role = %account.role, "login succeeded");
        Ok(account)
    }
}
