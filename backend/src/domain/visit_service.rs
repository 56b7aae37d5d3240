//! Visitor pass issuance and entry validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::ports::{StoreError, VisitRepository};
use super::validation::FieldError;
use super::{
    CondominiumId, Error, Identity, NewVisit, Role, Visit, VisitCode, require_role,
    require_role_and_condo,
};

/// How many fresh codes to try before giving up on collisions.
const CODE_ATTEMPTS: usize = 5;

/// Payload issuing a visitor pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    #[schema(example = "Carla Gómez")]
    pub visitor_name: String,
    /// `0` allows unlimited entries.
    #[serde(default)]
    pub max_uses: i32,
    /// Defaults to the moment of issuance.
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: DateTime<Utc>,
}

/// A guard's view of a pass: the visit plus whether it admits entry now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitInspection {
    pub visit: Visit,
    pub usable: bool,
    /// `visit_expired`, `visit_not_yet_valid` or `visit_exhausted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// `None` when the pass is unlimited.
    pub remaining_uses: Option<i32>,
}

fn resident_condominium(caller: &Identity) -> Result<CondominiumId, Error> {
    caller
        .condominium_id
        .ok_or_else(|| Error::forbidden("account is not attached to a condominium"))
}

fn visit_not_found(code: &VisitCode) -> Error {
    Error::not_found(format!("visit {code} not found"))
}

fn map_visit_error(code: &VisitCode, err: StoreError) -> Error {
    match err {
        StoreError::NotFound { .. } => visit_not_found(code),
        other => other.into(),
    }
}

/// Issues passes for residents and validates them for guards.
pub struct VisitService<S: ?Sized> {
    visits: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for VisitService<S> {
    fn clone(&self) -> Self {
        Self {
            visits: Arc::clone(&self.visits),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> VisitService<S>
where
    S: VisitRepository + ?Sized,
{
    /// Create the service over `visits`, reading time from `clock`.
    pub fn new(visits: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { visits, clock }
    }

    async fn load(&self, code: &VisitCode) -> Result<Visit, Error> {
        self.visits
            .get_visit(code)
            .await
            .map_err(|err| map_visit_error(code, err))
    }

    /// Issue a pass for the resident's condominium.
    ///
    /// # Errors
    /// RBAC failures, validation errors (including a window that already
    /// ended), and store errors.
    pub async fn issue(
        &self,
        identity: Option<&Identity>,
        request: VisitRequest,
    ) -> Result<Visit, Error> {
        let caller = *require_role(identity, Role::User)?;
        let condominium_id = resident_condominium(&caller)?;
        let now = self.clock.utc();
        if request.valid_to < now {
            return Err(FieldError::new(
                "valid_to",
                "past",
                "valid_to must not be in the past",
            )
            .into());
        }
        let valid_from = request.valid_from.unwrap_or(now);

        for _ in 0..CODE_ATTEMPTS {
            let code = VisitCode::generate(&mut rand::thread_rng());
            let draft = NewVisit {
                code,
                condominium_id,
                created_by: caller.id,
                visitor_name: request.visitor_name.trim().to_owned(),
                max_uses: request.max_uses,
                valid_from,
                valid_to: request.valid_to,
            };
            match self.visits.create_visit(draft).await {
                Ok(visit) => {
                    info!(
                        code = %visit.code,
                        condominium_id = %visit.condominium_id,
                        created_by = %caller.id,
                        max_uses = visit.max_uses,
                        "visit issued"
                    );
                    return Ok(visit);
                }
                Err(StoreError::DuplicateVisitCode) => {
                    warn!("visit code collision; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(Error::internal(format!(
            "could not allocate a unique visit code after {CODE_ATTEMPTS} attempts"
        )))
    }

    /// Look a pass up without consuming a use.
    ///
    /// # Errors
    /// RBAC failures (including another condominium's pass),
    /// [`super::ErrorCode::NotFound`], and store errors.
    pub async fn inspect(
        &self,
        identity: Option<&Identity>,
        code: &VisitCode,
    ) -> Result<VisitInspection, Error> {
        require_role(identity, Role::Guard)?;
        let visit = self.load(code).await?;
        require_role_and_condo(identity, Role::Guard, visit.condominium_id)?;
        let verdict = visit.check_usable(self.clock.utc());
        Ok(VisitInspection {
            usable: verdict.is_ok(),
            reason: verdict.err().map(|reason| reason.code().to_owned()),
            remaining_uses: visit.remaining_uses(),
            visit,
        })
    }

    /// Record one entry against a pass.
    ///
    /// The usability check runs inside the store's atomic update against the
    /// current row, so concurrent entries can never exceed `max_uses`.
    ///
    /// # Errors
    /// RBAC failures, [`super::ErrorCode::NotFound`], a user-safe
    /// [`super::ErrorCode::InvalidRequest`] carrying `details.code` when the
    /// pass is unusable, and store errors.
    pub async fn record_use(
        &self,
        identity: Option<&Identity>,
        code: &VisitCode,
    ) -> Result<Visit, Error> {
        let caller = *require_role(identity, Role::Guard)?;
        let visit = self.load(code).await?;
        require_role_and_condo(identity, Role::Guard, visit.condominium_id)?;

        let now = self.clock.utc();
        let updated = self
            .visits
            .update_visit(
                code,
                Box::new(move |mut row| {
                    row.check_usable(now)?;
                    row.uses += 1;
                    Ok(row)
                }),
            )
            .await
            .map_err(|err| map_visit_error(code, err))?;
        info!(
            code = %updated.code,
            uses = updated.uses,
            max_uses = updated.max_uses,
            guard_id = %caller.id,
            "visit entry recorded"
        );
        Ok(updated)
    }

    /// Passes issued by the caller, newest first.
    ///
    /// # Errors
    /// RBAC failures and store errors.
    pub async fn list_mine(&self, identity: Option<&Identity>) -> Result<Vec<Visit>, Error> {
        let caller = require_role(identity, Role::User)?;
        Ok(self.visits.list_visits_by_creator(caller.id).await?)
    }

    /// Delete a pass issued by the caller.
    ///
    /// # Errors
    /// RBAC failures, [`super::ErrorCode::Forbidden`] for another resident's
    /// pass, [`super::ErrorCode::NotFound`], and store errors.
    pub async fn revoke(&self, identity: Option<&Identity>, code: &VisitCode) -> Result<(), Error> {
        let caller = *require_role(identity, Role::User)?;
        let visit = self.load(code).await?;
        if visit.created_by != caller.id && !caller.is_superadmin() {
            return Err(Error::forbidden("visit was issued by another resident"));
        }
        self.visits
            .delete_visit(code)
            .await
            .map_err(|err| map_visit_error(code, err))?;
        info!(code = %code, revoked_by = %caller.id, "visit revoked");
        Ok(())
    }
}

#[cfg(test)]
#[path = "visit_service_tests.rs"]
mod tests;
