//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every JSON endpoint together with the request and
//! response types they exchange, plus the session cookie security scheme.
//! The document backs Swagger UI in debug builds and is exported with
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Account, AccountChanges, AdminDraft, Condominium, CondominiumDraft, CondominiumId, Error,
    ErrorCode, Identity, MemberDraft, Role, UserId, Visit, VisitCode, VisitInspection,
    VisitRequest,
};
use crate::inbound::http::auth::{LoginRequest, LoginResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "entry-watch API",
        description = "Visitor management for condominiums: accounts, visit passes and gate entries."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::condos::list_condos,
        crate::inbound::http::condos::create_condo,
        crate::inbound::http::condos::get_condo,
        crate::inbound::http::condos::update_condo,
        crate::inbound::http::condos::delete_condo,
        crate::inbound::http::condos::own_condo,
        crate::inbound::http::accounts::list_admins,
        crate::inbound::http::accounts::create_admin,
        crate::inbound::http::accounts::get_admin,
        crate::inbound::http::accounts::update_admin,
        crate::inbound::http::accounts::delete_admin,
        crate::inbound::http::accounts::list_members,
        crate::inbound::http::accounts::create_member,
        crate::inbound::http::accounts::get_member,
        crate::inbound::http::accounts::update_member,
        crate::inbound::http::accounts::delete_member,
        crate::inbound::http::visits::list_my_visits,
        crate::inbound::http::visits::issue_visit,
        crate::inbound::http::visits::revoke_visit,
        crate::inbound::http::visits::inspect_visit,
        crate::inbound::http::visits::record_entry,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Identity,
        Role,
        UserId,
        CondominiumId,
        Account,
        AdminDraft,
        MemberDraft,
        AccountChanges,
        Condominium,
        CondominiumDraft,
        Visit,
        VisitCode,
        VisitRequest,
        VisitInspection,
        LoginRequest,
        LoginResponse,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "condominiums", description = "Condominium management"),
        (name = "accounts", description = "Admin and member accounts"),
        (name = "visits", description = "Visit passes and gate entries"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
