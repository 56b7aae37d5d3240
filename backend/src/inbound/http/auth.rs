//! Login, logout and "who am I" endpoints.
//!
//! ```text
//! POST /auth/login {"email":"superadmin@local","password":"password"}
//! GET  /auth/logout
//! GET  /auth/me
//! ```

use actix_web::{HttpResponse, get, http::header, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, Identity, LoginCredentials, LoginValidationError};

use super::ApiResult;
use super::identity::CurrentIdentity;
use super::session::SessionContext;
use super::state::HttpState;

/// Login request body.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "superadmin@local")]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Where the client should go after logging in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(example = "/super/")]
    pub redirect: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => Error::invalid_request("email must not be empty")
            .with_details(json!({ "field": "email", "code": "required" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "required" })),
    }
}

/// Check credentials and start a session.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank email or password", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Account is disabled", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let account = state.login.authenticate(&credentials).await?;
    let identity = account.identity();
    session.persist_identity(&identity)?;
    Ok(web::Json(LoginResponse {
        redirect: identity.role.home_path().to_owned(),
    }))
}

/// End the session and send the browser back to the login page.
#[utoipa::path(
    get,
    path = "/auth/logout",
    responses((status = 303, description = "Session cleared; redirect to /auth/login")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[get("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    if let Some(user_id) = session.user_id() {
        info!(user_id = %user_id, "logged out");
    }
    session.purge();
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/auth/login"))
        .finish()
}

/// The identity resolved for this request.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Account is disabled", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentIdentity"
)]
#[get("/auth/me")]
pub async fn me(identity: CurrentIdentity) -> ApiResult<web::Json<Identity>> {
    match identity.into_inner() {
        Some(identity) if identity.enabled => Ok(web::Json(identity)),
        Some(_) => Err(Error::forbidden("user is disabled")),
        None => Err(Error::unauthorized("user not authenticated")),
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
