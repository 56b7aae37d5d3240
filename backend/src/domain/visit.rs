//! Visitor passes and their usability rules.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::validation::{FieldError, char_length};
use super::{CondominiumId, Error, UserId};

const VISITOR_NAME_MAX: usize = 200;
const CODE_LENGTH: usize = 10;
/// Upper-case alphabet without the easily confused `0/O` and `1/I`.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Opaque visit code handed to the visitor and typed in by the guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct VisitCode(String);

impl VisitCode {
    /// Draw a fresh random code.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LENGTH)
            .map(|_| {
                let index = rng.gen_range(0..CODE_ALPHABET.len());
                CODE_ALPHABET.get(index).copied().map_or('A', char::from)
            })
            .collect();
        Self(code)
    }

    /// Parse user input, ignoring surrounding whitespace and case.
    ///
    /// # Errors
    /// Returns a [`FieldError`] on the `code` field when the input cannot be a
    /// code this service issued.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let normalized = raw.trim().to_ascii_uppercase();
        let well_formed = normalized.len() == CODE_LENGTH
            && normalized.bytes().all(|byte| CODE_ALPHABET.contains(&byte));
        if well_formed {
            Ok(Self(normalized))
        } else {
            Err(FieldError::new("code", "format", "invalid visit code"))
        }
    }

    /// Wrap a code read back from storage.
    #[must_use]
    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    /// Borrow the code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for VisitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a visit cannot be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VisitUnusable {
    /// `now` is before `valid_from`.
    #[error("visit is not valid yet")]
    NotYetValid,
    /// `now` is after `valid_to`.
    #[error("visit has expired")]
    Expired,
    /// Every allowed use has been recorded.
    #[error("visit has no remaining uses")]
    Exhausted,
}

impl VisitUnusable {
    /// Stable machine-readable reason.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotYetValid => "visit_not_yet_valid",
            Self::Expired => "visit_expired",
            Self::Exhausted => "visit_exhausted",
        }
    }
}

impl From<VisitUnusable> for Error {
    fn from(value: VisitUnusable) -> Self {
        Self::invalid_request(value.to_string()).with_details(json!({ "code": value.code() }))
    }
}

/// A stored visitor pass.
///
/// ## Invariants
/// - `valid_from <= valid_to`.
/// - `max_uses >= 0`, where `0` means unlimited.
/// - `uses` only grows, and `uses <= max_uses` whenever `max_uses > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub code: VisitCode,
    pub condominium_id: CondominiumId,
    pub created_by: UserId,
    pub visitor_name: String,
    pub max_uses: i32,
    pub uses: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Visit {
    /// Check whether the visit admits an entry at `now`.
    ///
    /// The window is inclusive at both ends.
    ///
    /// # Errors
    /// Returns the first failing rule: window start, window end, then uses.
    pub fn check_usable(&self, now: DateTime<Utc>) -> Result<(), VisitUnusable> {
        if now < self.valid_from {
            return Err(VisitUnusable::NotYetValid);
        }
        if now > self.valid_to {
            return Err(VisitUnusable::Expired);
        }
        if self.max_uses > 0 && self.uses >= self.max_uses {
            return Err(VisitUnusable::Exhausted);
        }
        Ok(())
    }

    /// Whether [`Self::check_usable`] passes.
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.check_usable(now).is_ok()
    }

    /// Remaining uses, or `None` when unlimited.
    #[must_use]
    pub fn remaining_uses(&self) -> Option<i32> {
        (self.max_uses > 0).then(|| (self.max_uses - self.uses).max(0))
    }

    /// Validate the invariants.
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), FieldError> {
        validate_terms(&VisitTerms {
            visitor_name: &self.visitor_name,
            max_uses: self.max_uses,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        })?;
        if self.uses < 0 {
            return Err(FieldError::new("uses", "range", "uses must not be negative"));
        }
        if self.max_uses > 0 && self.uses > self.max_uses {
            return Err(FieldError::new(
                "uses",
                "range",
                "uses must not exceed max_uses",
            ));
        }
        Ok(())
    }

    /// Validate `self` as the replacement of `previous`.
    ///
    /// Runs [`Self::validate`] and rejects any decrease of `uses`.
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate_update(&self, previous: &Self) -> Result<(), FieldError> {
        self.validate()?;
        if self.uses < previous.uses {
            return Err(FieldError::new(
                "uses",
                "monotonic",
                "uses must never decrease",
            ));
        }
        Ok(())
    }
}

/// Draft for a visit that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub code: VisitCode,
    pub condominium_id: CondominiumId,
    pub created_by: UserId,
    pub visitor_name: String,
    pub max_uses: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

impl NewVisit {
    /// Validate the draft.
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), FieldError> {
        validate_terms(&VisitTerms {
            visitor_name: &self.visitor_name,
            max_uses: self.max_uses,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        })
    }

    /// Materialise the stored row with zero recorded uses.
    #[must_use]
    pub fn into_visit(self, now: DateTime<Utc>) -> Visit {
        Visit {
            code: self.code,
            condominium_id: self.condominium_id,
            created_by: self.created_by,
            visitor_name: self.visitor_name,
            max_uses: self.max_uses,
            uses: 0,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            created_at: now,
            updated_at: now,
        }
    }
}

struct VisitTerms<'a> {
    visitor_name: &'a str,
    max_uses: i32,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
}

fn validate_terms(terms: &VisitTerms<'_>) -> Result<(), FieldError> {
    char_length("visitor_name", terms.visitor_name.trim(), 1, VISITOR_NAME_MAX)?;
    if terms.max_uses < 0 {
        return Err(FieldError::new(
            "max_uses",
            "range",
            "max_uses must not be negative",
        ));
    }
    if terms.valid_from > terms.valid_to {
        return Err(FieldError::new(
            "valid_to",
            "range",
            "valid_to must not be before valid_from",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "visit_tests.rs"]
mod tests;
