//! Role-based access control gate.
//!
//! Pure functions over an optional [`Identity`]. Superadmins pass every
//! check; everyone else must be enabled, hold the requested role, and (for
//! tenant-scoped checks) belong to the requested condominium.

use super::{CondominiumId, Error, Identity, Role};

/// Require an enabled identity holding `role` (or a superadmin).
///
/// # Errors
/// - [`super::ErrorCode::Unauthorized`] when no identity is present.
/// - [`super::ErrorCode::Forbidden`] when the identity is disabled or holds
///   another role.
///
/// # Examples
/// ```
/// use entry_watch::domain::{require_role, CondominiumId, ErrorCode, Identity, Role, UserId};
///
/// let guard = Identity {
///     id: UserId::new(3),
///     condominium_id: Some(CondominiumId::new(1)),
///     role: Role::Guard,
///     enabled: true,
/// };
/// assert!(require_role(Some(&guard), Role::Guard).is_ok());
/// let err = require_role(Some(&guard), Role::Admin).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// ```
pub fn require_role(identity: Option<&Identity>, role: Role) -> Result<&Identity, Error> {
    let identity = identity.ok_or_else(|| Error::unauthorized("user not authenticated"))?;
    if !identity.enabled {
        return Err(Error::forbidden("user is disabled"));
    }
    if identity.role != role && !identity.is_superadmin() {
        return Err(Error::forbidden("insufficient permissions"));
    }
    Ok(identity)
}

/// Require an enabled identity holding any of `roles` (or a superadmin).
///
/// # Errors
/// Same as [`require_role`].
pub fn require_any_role<'a>(
    identity: Option<&'a Identity>,
    roles: &[Role],
) -> Result<&'a Identity, Error> {
    let identity = identity.ok_or_else(|| Error::unauthorized("user not authenticated"))?;
    if !identity.enabled {
        return Err(Error::forbidden("user is disabled"));
    }
    if !roles.contains(&identity.role) && !identity.is_superadmin() {
        return Err(Error::forbidden("insufficient permissions"));
    }
    Ok(identity)
}

/// Require [`require_role`] plus membership of `condominium_id`.
///
/// # Errors
/// As [`require_role`], plus [`super::ErrorCode::Forbidden`] when a
/// non-superadmin identity belongs to another condominium (or none).
pub fn require_role_and_condo(
    identity: Option<&Identity>,
    role: Role,
    condominium_id: CondominiumId,
) -> Result<&Identity, Error> {
    let identity = require_role(identity, role)?;
    if identity.is_superadmin() || identity.condominium_id == Some(condominium_id) {
        Ok(identity)
    } else {
        Err(Error::forbidden(
            "insufficient permissions for this condominium",
        ))
    }
}
