//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer; conversions to and from
//! the domain entities live next to them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::ports::StoreError;
use crate::domain::{
    Account, Condominium, CondominiumId, NewAccount, NewCondominium, NewVisit, Role, UserId,
    Visit, VisitCode,
};

use super::schema::{condominiums, users, visits};

// ---------------------------------------------------------------------------
// Condominiums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = condominiums)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CondominiumRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

impl From<CondominiumRow> for Condominium {
    fn from(row: CondominiumRow) -> Self {
        Self {
            id: CondominiumId::new(row.id),
            name: row.name,
            address: row.address,
            created_at: row.created_at,
            created_by: row.created_by.map(UserId::new),
            updated_at: row.updated_at,
            updated_by: row.updated_by.map(UserId::new),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = condominiums)]
pub(crate) struct NewCondominiumRow<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

impl<'a> NewCondominiumRow<'a> {
    pub fn from_draft(draft: &'a NewCondominium, now: DateTime<Utc>) -> Self {
        let created_by = draft.created_by.map(UserId::get);
        Self {
            name: &draft.name,
            address: &draft.address,
            created_at: now,
            created_by,
            updated_at: now,
            updated_by: created_by,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = condominiums)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CondominiumUpdate<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

impl<'a> CondominiumUpdate<'a> {
    pub fn from_entity(condo: &'a Condominium) -> Self {
        Self {
            name: &condo.name,
            address: &condo.address,
            updated_at: condo.updated_at,
            updated_by: condo.updated_by.map(UserId::get),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub condominium_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub enabled: bool,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

impl TryFrom<UserRow> for Account {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|err| StoreError::query(format!("user {}: {err}", row.id)))?;
        Ok(Self {
            id: UserId::new(row.id),
            condominium_id: row.condominium_id.map(CondominiumId::new),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            role,
            enabled: row.enabled,
            hidden: row.hidden,
            created_at: row.created_at,
            created_by: row.created_by.map(UserId::new),
            updated_at: row.updated_at,
            updated_by: row.updated_by.map(UserId::new),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub condominium_id: Option<i64>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: &'static str,
    pub enabled: bool,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

impl<'a> NewUserRow<'a> {
    /// `email` is passed separately because it must already be normalised.
    pub fn from_draft(draft: &'a NewAccount, email: &'a str, now: DateTime<Utc>) -> Self {
        let created_by = draft.created_by.map(UserId::get);
        Self {
            condominium_id: draft.condominium_id.map(CondominiumId::get),
            first_name: &draft.first_name,
            last_name: &draft.last_name,
            email,
            phone: draft.phone.as_deref(),
            password_hash: &draft.password_hash,
            role: draft.role.as_str(),
            enabled: draft.enabled,
            hidden: draft.hidden,
            created_at: now,
            created_by,
            updated_at: now,
            updated_by: created_by,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub condominium_id: Option<i64>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: &'static str,
    pub enabled: bool,
    pub hidden: bool,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

impl<'a> UserUpdate<'a> {
    pub fn from_entity(account: &'a Account) -> Self {
        Self {
            condominium_id: account.condominium_id.map(CondominiumId::get),
            first_name: &account.first_name,
            last_name: &account.last_name,
            email: &account.email,
            phone: account.phone.as_deref(),
            password_hash: &account.password_hash,
            role: account.role.as_str(),
            enabled: account.enabled,
            hidden: account.hidden,
            updated_at: account.updated_at,
            updated_by: account.updated_by.map(UserId::get),
        }
    }
}

// ---------------------------------------------------------------------------
// Visits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = visits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VisitRow {
    pub id: String,
    pub condominium_id: i64,
    pub created_by: i64,
    pub visitor_name: String,
    pub max_uses: i32,
    pub uses: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Self {
            code: VisitCode::from_stored(row.id),
            condominium_id: CondominiumId::new(row.condominium_id),
            created_by: UserId::new(row.created_by),
            visitor_name: row.visitor_name,
            max_uses: row.max_uses,
            uses: row.uses,
            valid_from: row.valid_from,
            valid_to: row.valid_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = visits)]
pub(crate) struct NewVisitRow<'a> {
    pub id: &'a str,
    pub condominium_id: i64,
    pub created_by: i64,
    pub visitor_name: &'a str,
    pub max_uses: i32,
    pub uses: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewVisitRow<'a> {
    pub fn from_draft(draft: &'a NewVisit, now: DateTime<Utc>) -> Self {
        Self {
            id: draft.code.as_str(),
            condominium_id: draft.condominium_id.get(),
            created_by: draft.created_by.get(),
            visitor_name: &draft.visitor_name,
            max_uses: draft.max_uses,
            uses: 0,
            valid_from: draft.valid_from,
            valid_to: draft.valid_to,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Only the mutable columns; code, owner, and tenant never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = visits)]
pub(crate) struct VisitUpdate<'a> {
    pub visitor_name: &'a str,
    pub max_uses: i32,
    pub uses: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> VisitUpdate<'a> {
    pub fn from_entity(visit: &'a Visit) -> Self {
        Self {
            visitor_name: &visit.visitor_name,
            max_uses: visit.max_uses,
            uses: visit.uses,
            valid_from: visit.valid_from,
            valid_to: visit.valid_to,
            updated_at: visit.updated_at,
        }
    }
}
