//! First-run superadmin provisioning.

use tracing::{error, info, warn};

use super::ports::UserRepository;
use super::{Error, NewAccount, Role, UserId, hash_password};

/// Email of the account created on first run.
pub const BOOTSTRAP_EMAIL: &str = "superadmin@local";
/// Documented default password of the bootstrap account.
pub const BOOTSTRAP_PASSWORD: &str = "password";

/// What [`ensure_superadmin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// An enabled superadmin already existed; nothing was written.
    AlreadyPresent,
    /// The default superadmin was created.
    Created(UserId),
    /// No enabled superadmin exists but the bootstrap email is taken by a
    /// disabled or demoted account, which is left untouched.
    EmailTaken(UserId),
}

/// Create the default superadmin when no enabled superadmin exists.
///
/// Running it again is a no-op.
///
/// # Errors
/// Propagates store and hashing failures; callers treat them as fatal.
pub async fn ensure_superadmin<R>(users: &R) -> Result<BootstrapOutcome, Error>
where
    R: UserRepository + ?Sized,
{
    if users.count_superadmins().await.map_err(Error::from)? > 0 {
        info!("superadmin present; bootstrap skipped");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    if let Some(existing) = users
        .find_user_by_email(BOOTSTRAP_EMAIL)
        .await
        .map_err(Error::from)?
    {
        error!(
            user_id = %existing.id,
            "no enabled superadmin exists and {BOOTSTRAP_EMAIL} is already taken; re-enable it manually"
        );
        return Ok(BootstrapOutcome::EmailTaken(existing.id));
    }

    let password_hash = hash_password(BOOTSTRAP_PASSWORD)
        .map_err(|err| Error::internal(format!("bootstrap hashing failed: {err}")))?;
    let created = users
        .create_user(NewAccount {
            condominium_id: None,
            first_name: "Super".to_owned(),
            last_name: "Admin".to_owned(),
            email: BOOTSTRAP_EMAIL.to_owned(),
            phone: None,
            password_hash,
            role: Role::Superadmin,
            enabled: true,
            hidden: false,
            created_by: None,
        })
        .await
        .map_err(Error::from)?;

    warn!(
        user_id = %created.id,
        email = BOOTSTRAP_EMAIL,
        "created default superadmin with the documented default password; change it immediately"
    );
    Ok(BootstrapOutcome::Created(created.id))
}
