//! Running server and shared world for HTTP behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs over an in-memory
//! store seeded with the bootstrap superadmin, and its clock is pinned so
//! visit windows are deterministic. `WorldFixture` stops the server even if a
//! test panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use awc::Client;
use entry_watch::Trace;
use entry_watch::domain::{TRACE_ID_HEADER, ensure_superadmin};
use entry_watch::inbound::http::configure;
use entry_watch::inbound::http::health::{HealthState, live, ready};
use entry_watch::inbound::http::state::HttpState;
use entry_watch::outbound::memory::MemoryStore;
use entry_watch::test_support::MutableClock;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

pub(crate) struct HttpWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) clock: Arc<MutableClock>,
    /// `name=value` cookie pairs keyed by the actor that logged in.
    pub(crate) cookies: HashMap<String, String>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
    pub(crate) last_set_cookie: Option<String>,
    pub(crate) last_location: Option<String>,
    pub(crate) visit_code: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<HttpWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

/// Run `operation` on the world's runtime with the server's base URL.
///
/// The future must not borrow the world.
pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

/// One JSON request.
pub(crate) struct RequestSpec<'a> {
    pub(crate) method: Method,
    pub(crate) path: &'a str,
    pub(crate) payload: Option<Value>,
    /// Actor whose session cookie is sent, if any.
    pub(crate) actor: Option<&'a str>,
}

/// Perform `spec` and record status, body, trace id and cookies in the world.
pub(crate) fn perform(world: &SharedWorld, spec: RequestSpec<'_>) {
    let RequestSpec {
        method,
        path,
        payload,
        actor,
    } = spec;
    let cookie = actor.and_then(|name| world.borrow().cookies.get(name).cloned());
    let label = format!("{method} {path}");
    let (status, trace_id, set_cookie, location, body) =
        with_world_async(world, |base_url| async move {
            let client = Client::builder().disable_redirects().finish();
            let mut request = client.request(method, format!("{base_url}{path}"));
            if let Some(cookie) = cookie {
                request = request.insert_header((header::COOKIE, cookie));
            }
            let mut response = match payload {
                Some(payload) => request.send_json(&payload).await.expect(&label),
                None => request.send().await.expect(&label),
            };
            let header_text = |name: &str| {
                response
                    .headers()
                    .get(name)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
            };
            let trace_id = header_text(TRACE_ID_HEADER);
            let set_cookie = header_text(header::SET_COOKIE.as_str());
            let location = header_text(header::LOCATION.as_str());
            let status = response.status().as_u16();
            let bytes = response.body().await.expect(&label);
            let body = serde_json::from_slice(&bytes).ok();
            (status, trace_id, set_cookie, location, body)
        });

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_trace_id = trace_id;
    ctx.last_set_cookie = set_cookie;
    ctx.last_location = location;
    ctx.last_body = body;
}

/// Log `actor` in and keep the session cookie under their name.
pub(crate) fn login(world: &SharedWorld, actor: &str, email: &str, password: &str) {
    perform(
        world,
        RequestSpec {
            method: Method::POST,
            path: "/auth/login",
            payload: Some(serde_json::json!({ "email": email, "password": password })),
            actor: None,
        },
    );
    let mut ctx = world.borrow_mut();
    let pair = ctx
        .last_set_cookie
        .as_deref()
        .and_then(|value| value.split(';').next())
        .map(str::to_owned);
    if let Some(pair) = pair {
        ctx.cookies.insert(actor.to_owned(), pair);
    }
}

/// Block on a store operation.
pub(crate) fn with_store<R, F>(
    world: &SharedWorld,
    operation: impl FnOnce(Arc<MemoryStore>) -> F,
) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let store = Arc::clone(&ctx.store);
    ctx.local.block_on(&ctx.runtime, operation(store))
}

fn test_session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(12)))
        .build()
}

fn spawn_server(state: HttpState) -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let http_data = web::Data::new(state);
    let health = web::Data::new(HealthState::new());
    health.mark_ready();

    let server = HttpServer::new(move || {
        let api = web::scope("")
            .wrap(test_session_middleware(key.clone()))
            .configure(configure);
        App::new()
            .app_data(http_data.clone())
            .app_data(health.clone())
            .wrap(Trace)
            .service(ready)
            .service(live)
            .service(api)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

/// Start a server over a fresh store with the bootstrap superadmin.
pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let clock = Arc::new(MutableClock::at_fixture());
    let store = Arc::new(MemoryStore::new(clock.clone()));
    local
        .block_on(&runtime, ensure_superadmin(store.as_ref()))
        .expect("bootstrap superadmin");
    let state = HttpState::new(store.clone(), clock.clone());
    let (base_url, server) = local
        .block_on(&runtime, async { spawn_server(state) })
        .expect("spawn server");

    WorldFixture {
        world: Rc::new(RefCell::new(HttpWorld {
            runtime,
            local,
            base_url,
            server,
            store,
            clock,
            cookies: HashMap::new(),
            last_status: None,
            last_body: None,
            last_trace_id: None,
            last_set_cookie: None,
            last_location: None,
            visit_code: None,
        })),
    }
}
