//! Account management endpoints.
//!
//! Superadmins manage admins under `/super/admins`; admins manage the guards
//! and residents of their own condominium under `/admin/users`.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{Account, AccountChanges, AdminDraft, Error, MemberDraft, UserId};

use super::ApiResult;
use super::identity::CurrentIdentity;
use super::state::HttpState;

/// List admin accounts.
#[utoipa::path(
    get,
    path = "/super/admins",
    responses(
        (status = 200, description = "Admins", body = [Account]),
        (status = 403, description = "Not a superadmin", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "listAdmins"
)]
#[get("/super/admins")]
pub async fn list_admins(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
) -> ApiResult<web::Json<Vec<Account>>> {
    Ok(web::Json(state.accounts.list_admins(identity.identity()).await?))
}

/// Create an admin for an existing condominium.
#[utoipa::path(
    post,
    path = "/super/admins",
    request_body = AdminDraft,
    responses(
        (status = 201, description = "Created", body = Account),
        (status = 400, description = "Invalid field or unknown condominium", body = Error),
        (status = 409, description = "Email already in use", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "createAdmin"
)]
#[post("/super/admins")]
pub async fn create_admin(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    payload: web::Json<AdminDraft>,
) -> ApiResult<HttpResponse> {
    let admin = state
        .accounts
        .create_admin(identity.identity(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(admin))
}

/// One admin account.
#[utoipa::path(
    get,
    path = "/super/admins/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Admin", body = Account),
        (status = 404, description = "No such admin", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "getAdmin"
)]
#[get("/super/admins/{id}")]
pub async fn get_admin(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Account>> {
    let id = UserId::new(path.into_inner());
    Ok(web::Json(state.accounts.get_admin(identity.identity(), id).await?))
}

/// Patch an admin account.
#[utoipa::path(
    put,
    path = "/super/admins/{id}",
    params(("id" = i64, Path, description = "Account id")),
    request_body = AccountChanges,
    responses(
        (status = 200, description = "Updated", body = Account),
        (status = 400, description = "Invalid field", body = Error),
        (status = 404, description = "No such admin", body = Error),
        (status = 409, description = "Email already in use", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "updateAdmin"
)]
#[put("/super/admins/{id}")]
pub async fn update_admin(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
    payload: web::Json<AccountChanges>,
) -> ApiResult<web::Json<Account>> {
    let id = UserId::new(path.into_inner());
    let admin = state
        .accounts
        .update_admin(identity.identity(), id, payload.into_inner())
        .await?;
    Ok(web::Json(admin))
}

/// Delete an admin account.
#[utoipa::path(
    delete,
    path = "/super/admins/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Deleting your own account", body = Error),
        (status = 404, description = "No such admin", body = Error)
    ),
    tags = ["superadmin"],
    operation_id = "deleteAdmin"
)]
#[delete("/super/admins/{id}")]
pub async fn delete_admin(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner());
    state.accounts.delete_admin(identity.identity(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Guards and residents of the admin's condominium.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Members", body = [Account]),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listMembers"
)]
#[get("/admin/users")]
pub async fn list_members(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
) -> ApiResult<web::Json<Vec<Account>>> {
    Ok(web::Json(state.accounts.list_members(identity.identity()).await?))
}

/// Create a guard or resident in the admin's condominium.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = MemberDraft,
    responses(
        (status = 201, description = "Created", body = Account),
        (status = 400, description = "Invalid field or role", body = Error),
        (status = 409, description = "Email already in use", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createMember"
)]
#[post("/admin/users")]
pub async fn create_member(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    payload: web::Json<MemberDraft>,
) -> ApiResult<HttpResponse> {
    let member = state
        .accounts
        .create_member(identity.identity(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(member))
}

/// One member of the admin's condominium.
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Member", body = Account),
        (status = 403, description = "Member of another condominium", body = Error),
        (status = 404, description = "No such member", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getMember"
)]
#[get("/admin/users/{id}")]
pub async fn get_member(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Account>> {
    let id = UserId::new(path.into_inner());
    Ok(web::Json(state.accounts.get_member(identity.identity(), id).await?))
}

/// Patch a member of the admin's condominium.
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "Account id")),
    request_body = AccountChanges,
    responses(
        (status = 200, description = "Updated", body = Account),
        (status = 400, description = "Invalid field or role", body = Error),
        (status = 403, description = "Member of another condominium", body = Error),
        (status = 404, description = "No such member", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateMember"
)]
#[put("/admin/users/{id}")]
pub async fn update_member(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
    payload: web::Json<AccountChanges>,
) -> ApiResult<web::Json<Account>> {
    let id = UserId::new(path.into_inner());
    let member = state
        .accounts
        .update_member(identity.identity(), id, payload.into_inner())
        .await?;
    Ok(web::Json(member))
}

/// Delete a member of the admin's condominium.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Own account or another condominium", body = Error),
        (status = 404, description = "No such member", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteMember"
)]
#[delete("/admin/users/{id}")]
pub async fn delete_member(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner());
    state.accounts.delete_member(identity.identity(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
