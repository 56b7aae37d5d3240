//! Stored user accounts.
//!
//! An [`Account`] is the full persisted user row; the slimmer [`Identity`]
//! is what the access-control gate works with.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::validation::{FieldError, char_length, required};
use super::{CondominiumId, Identity, Role, UserId};

const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 255;
const PHONE_MAX: usize = 30;

/// A stored account.
///
/// ## Invariants
/// - `first_name` and `last_name` hold 1–100 characters.
/// - `email` is lower-case, has a `local@domain` shape, and fits 255 characters.
/// - Every role except [`Role::Superadmin`] belongs to a condominium.
/// - `password_hash` is an Argon2id PHC string and is never serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: UserId,
    pub condominium_id: Option<CondominiumId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub enabled: bool,
    /// Hidden accounts are excluded from listings (for example the bootstrap superadmin).
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<UserId>,
}

impl Account {
    /// Project the access-control view of this account.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            condominium_id: self.condominium_id,
            role: self.role,
            enabled: self.enabled,
        }
    }

    /// Validate the mutable fields.
    ///
    /// # Errors
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), FieldError> {
        validate_profile(&ProfileFields {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            phone: self.phone.as_deref(),
            password_hash: &self.password_hash,
            role: self.role,
            condominium_id: self.condominium_id,
        })
    }
}

/// Draft for an account that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub condominium_id: Option<CondominiumId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub enabled: bool,
    pub hidden: bool,
    pub created_by: Option<UserId>,
}

impl NewAccount {
    /// Validate the draft.
    ///
    /// # Errors
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), FieldError> {
        validate_profile(&ProfileFields {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            phone: self.phone.as_deref(),
            password_hash: &self.password_hash,
            role: self.role,
            condominium_id: self.condominium_id,
        })
    }

    /// Materialise the stored row once the store has assigned an id.
    #[must_use]
    pub fn into_account(self, id: UserId, now: DateTime<Utc>) -> Account {
        Account {
            id,
            condominium_id: self.condominium_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: normalize_email(&self.email),
            phone: self.phone,
            password_hash: self.password_hash,
            role: self.role,
            enabled: self.enabled,
            hidden: self.hidden,
            created_at: now,
            created_by: self.created_by,
            updated_at: now,
            updated_by: self.created_by,
        }
    }
}

/// Canonical form used for storage and lookups.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Filter for account listings. Hidden accounts are never listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub roles: Vec<Role>,
    pub condominium_id: Option<CondominiumId>,
}

impl AccountFilter {
    /// Accounts holding `role`.
    #[must_use]
    pub fn role(role: Role) -> Self {
        Self {
            roles: vec![role],
            condominium_id: None,
        }
    }

    /// Restrict to one condominium.
    #[must_use]
    pub fn in_condominium(mut self, condominium_id: CondominiumId) -> Self {
        self.condominium_id = Some(condominium_id);
        self
    }

    /// Whether `account` passes the filter.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        !account.hidden
            && (self.roles.is_empty() || self.roles.contains(&account.role))
            && self
                .condominium_id
                .is_none_or(|condo| account.condominium_id == Some(condo))
    }
}

struct ProfileFields<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    password_hash: &'a str,
    role: Role,
    condominium_id: Option<CondominiumId>,
}

fn validate_profile(fields: &ProfileFields<'_>) -> Result<(), FieldError> {
    char_length("first_name", fields.first_name.trim(), 1, NAME_MAX)?;
    char_length("last_name", fields.last_name.trim(), 1, NAME_MAX)?;
    validate_email(fields.email)?;
    if let Some(phone) = fields.phone {
        char_length("phone", phone, 0, PHONE_MAX)?;
    }
    if fields.password_hash.is_empty() {
        return Err(FieldError::new(
            "password",
            "required",
            "password is required",
        ));
    }
    if fields.role.requires_condominium() && fields.condominium_id.is_none() {
        return Err(FieldError::new(
            "condominium_id",
            "required",
            format!("{} accounts must belong to a condominium", fields.role),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), FieldError> {
    required("email", email)?;
    let normalized = email.trim();
    if normalized.chars().count() > EMAIL_MAX {
        return Err(FieldError::new(
            "email",
            "length",
            format!("email must be at most {EMAIL_MAX} characters"),
        ));
    }
    let well_formed = match normalized.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !normalized.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if well_formed {
        Ok(())
    } else {
        Err(FieldError::new(
            "email",
            "format",
            "email must be a valid address",
        ))
    }
}
