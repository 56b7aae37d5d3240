//! Condominium (tenant) entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{FieldError, char_length};
use super::{CondominiumId, UserId};

const NAME_MAX: usize = 200;
const ADDRESS_MAX: usize = 500;

/// A stored condominium.
///
/// ## Invariants
/// - `name` holds 1–200 characters.
/// - `address` holds 1–500 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condominium {
    pub id: CondominiumId,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<UserId>,
}

impl Condominium {
    /// Validate the mutable fields.
    ///
    /// # Errors
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), FieldError> {
        validate_fields(&self.name, &self.address)
    }
}

/// Draft for a condominium that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCondominium {
    pub name: String,
    pub address: String,
    pub created_by: Option<UserId>,
}

impl NewCondominium {
    /// Validate the draft.
    ///
    /// # Errors
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), FieldError> {
        validate_fields(&self.name, &self.address)
    }

    /// Materialise the stored row once the store has assigned an id.
    #[must_use]
    pub fn into_condominium(self, id: CondominiumId, now: DateTime<Utc>) -> Condominium {
        Condominium {
            id,
            name: self.name,
            address: self.address,
            created_at: now,
            created_by: self.created_by,
            updated_at: now,
            updated_by: self.created_by,
        }
    }
}

fn validate_fields(name: &str, address: &str) -> Result<(), FieldError> {
    char_length("name", name.trim(), 1, NAME_MAX)?;
    char_length("address", address.trim(), 1, ADDRESS_MAX)
}
