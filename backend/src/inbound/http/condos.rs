//! Condominium endpoints.
//!
//! ```text
//! GET    /super/condos
//! POST   /super/condos        {"name":"Torre Norte","address":"Av. Siempre Viva 742"}
//! GET    /super/condos/{id}
//! PUT    /super/condos/{id}
//! DELETE /super/condos/{id}
//! GET    /admin/condo
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{Condominium, CondominiumDraft, CondominiumId, Error};

use super::ApiResult;
use super::identity::CurrentIdentity;
use super::state::HttpState;

/// List every condominium.
#[utoipa::path(
    get,
    path = "/super/condos",
    responses(
        (status = 200, description = "Condominiums", body = [Condominium]),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not a superadmin", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "listCondominiums"
)]
#[get("/super/condos")]
pub async fn list_condos(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
) -> ApiResult<web::Json<Vec<Condominium>>> {
    let condos = state.condominiums.list(identity.identity()).await?;
    Ok(web::Json(condos))
}

/// Register a condominium.
#[utoipa::path(
    post,
    path = "/super/condos",
    request_body = CondominiumDraft,
    responses(
        (status = 201, description = "Created", body = Condominium),
        (status = 400, description = "Invalid name or address", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not a superadmin", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "createCondominium"
)]
#[post("/super/condos")]
pub async fn create_condo(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    payload: web::Json<CondominiumDraft>,
) -> ApiResult<HttpResponse> {
    let condo = state
        .condominiums
        .create(identity.identity(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(condo))
}

/// One condominium.
#[utoipa::path(
    get,
    path = "/super/condos/{id}",
    params(("id" = i64, Path, description = "Condominium id")),
    responses(
        (status = 200, description = "Condominium", body = Condominium),
        (status = 404, description = "Unknown condominium", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "getCondominium"
)]
#[get("/super/condos/{id}")]
pub async fn get_condo(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Condominium>> {
    let id = CondominiumId::new(path.into_inner());
    let condo = state.condominiums.get(identity.identity(), id).await?;
    Ok(web::Json(condo))
}

/// Rename or re-address a condominium.
#[utoipa::path(
    put,
    path = "/super/condos/{id}",
    params(("id" = i64, Path, description = "Condominium id")),
    request_body = CondominiumDraft,
    responses(
        (status = 200, description = "Updated", body = Condominium),
        (status = 400, description = "Invalid name or address", body = Error),
        (status = 404, description = "Unknown condominium", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "updateCondominium"
)]
#[put("/super/condos/{id}")]
pub async fn update_condo(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
    payload: web::Json<CondominiumDraft>,
) -> ApiResult<web::Json<Condominium>> {
    let id = CondominiumId::new(path.into_inner());
    let condo = state
        .condominiums
        .update(identity.identity(), id, payload.into_inner())
        .await?;
    Ok(web::Json(condo))
}

/// Remove a condominium with no remaining accounts or visits.
#[utoipa::path(
    delete,
    path = "/super/condos/{id}",
    params(("id" = i64, Path, description = "Condominium id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown condominium", body = Error),
        (status = 409, description = "Condominium still in use", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "deleteCondominium"
)]
#[delete("/super/condos/{id}")]
pub async fn delete_condo(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = CondominiumId::new(path.into_inner());
    state.condominiums.delete(identity.identity(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The calling admin's own condominium.
#[utoipa::path(
    get,
    path = "/admin/condo",
    responses(
        (status = 200, description = "Condominium", body = Condominium),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getOwnCondominium"
)]
#[get("/admin/condo")]
pub async fn own_condo(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
) -> ApiResult<web::Json<Condominium>> {
    let condo = state.condominiums.get_own(identity.identity()).await?;
    Ok(web::Json(condo))
}

#[cfg(test)]
#[path = "condos_tests.rs"]
mod tests;
