//! Visitor pass endpoints.
//!
//! Residents issue and revoke passes under `/neighbor/visits`; guards check
//! and consume them at the gate under `/guard/visits`.

use actix_web::{HttpResponse, delete, get, post, web};

use crate::domain::{Error, Visit, VisitCode, VisitInspection, VisitRequest};

use super::ApiResult;
use super::identity::CurrentIdentity;
use super::state::HttpState;

fn parse_code(raw: &str) -> Result<VisitCode, Error> {
    Ok(VisitCode::parse(raw)?)
}

/// Check a pass without consuming an entry.
#[utoipa::path(
    get,
    path = "/guard/visits/{code}",
    params(("code" = String, Path, description = "Visit code")),
    responses(
        (status = 200, description = "Pass and whether it admits entry now", body = VisitInspection),
        (status = 403, description = "Pass belongs to another condominium", body = Error),
        (status = 404, description = "Unknown code", body = Error)
    ),
    tags = ["guard"],
    operation_id = "inspectVisit"
)]
#[get("/guard/visits/{code}")]
pub async fn inspect_visit(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<VisitInspection>> {
    let code = parse_code(&path)?;
    Ok(web::Json(state.visits.inspect(identity.identity(), &code).await?))
}

/// Admit the visitor, consuming one use of the pass.
#[utoipa::path(
    post,
    path = "/guard/visits/{code}/entries",
    params(("code" = String, Path, description = "Visit code")),
    responses(
        (status = 200, description = "Entry recorded", body = Visit),
        (status = 400, description = "Expired, not yet valid, or used up", body = Error),
        (status = 403, description = "Pass belongs to another condominium", body = Error),
        (status = 404, description = "Unknown code", body = Error)
    ),
    tags = ["guard"],
    operation_id = "recordVisitEntry"
)]
#[post("/guard/visits/{code}/entries")]
pub async fn record_entry(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Visit>> {
    let code = parse_code(&path)?;
    Ok(web::Json(state.visits.record_use(identity.identity(), &code).await?))
}

/// Passes issued by the calling resident, newest first.
#[utoipa::path(
    get,
    path = "/neighbor/visits",
    responses(
        (status = 200, description = "Issued passes", body = [Visit]),
        (status = 403, description = "Not a resident", body = Error)
    ),
    tags = ["neighbor"],
    operation_id = "listMyVisits"
)]
#[get("/neighbor/visits")]
pub async fn list_my_visits(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
) -> ApiResult<web::Json<Vec<Visit>>> {
    Ok(web::Json(state.visits.list_mine(identity.identity()).await?))
}

/// Issue a pass for the resident's condominium.
#[utoipa::path(
    post,
    path = "/neighbor/visits",
    request_body = VisitRequest,
    responses(
        (status = 201, description = "Issued", body = Visit),
        (status = 400, description = "Invalid window, name, or use limit", body = Error),
        (status = 403, description = "Not a resident", body = Error)
    ),
    tags = ["neighbor"],
    operation_id = "issueVisit"
)]
#[post("/neighbor/visits")]
pub async fn issue_visit(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    payload: web::Json<VisitRequest>,
) -> ApiResult<HttpResponse> {
    let visit = state
        .visits
        .issue(identity.identity(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(visit))
}

/// Revoke a pass the resident issued.
#[utoipa::path(
    delete,
    path = "/neighbor/visits/{code}",
    params(("code" = String, Path, description = "Visit code")),
    responses(
        (status = 204, description = "Revoked"),
        (status = 403, description = "Issued by someone else", body = Error),
        (status = 404, description = "Unknown code", body = Error)
    ),
    tags = ["neighbor"],
    operation_id = "revokeVisit"
)]
#[delete("/neighbor/visits/{code}")]
pub async fn revoke_visit(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let code = parse_code(&path)?;
    state.visits.revoke(identity.identity(), &code).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "visits_tests.rs"]
mod tests;
