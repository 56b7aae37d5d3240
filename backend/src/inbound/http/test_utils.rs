//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::test_support::MutableClock;

/// Session middleware with a fresh key and the `Secure` flag off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set (or removed) by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// HTTP state over an empty in-memory store pinned to the fixture clock.
pub fn memory_state() -> (HttpState, Arc<MemoryStore>, Arc<MutableClock>) {
    let clock = Arc::new(MutableClock::at_fixture());
    let store = Arc::new(MemoryStore::new(clock.clone()));
    let state = HttpState::new(store.clone(), clock.clone());
    (state, store, clock)
}

/// Log in through `POST /auth/login` and return the session cookie.
pub async fn login_cookie<S, B>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login as {email}");
    session_cookie(&response).expect("login sets the session cookie")
}

/// Initialise the full API over `state` with a test session middleware.
macro_rules! api_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap($crate::inbound::http::test_utils::test_session_middleware())
                .configure($crate::inbound::http::configure),
        )
        .await
    };
}
pub(crate) use api_app;
