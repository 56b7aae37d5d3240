//! Step definitions shared by the HTTP behaviour suites.

use actix_web::http::Method;
use entry_watch::domain::Role;
use entry_watch::test_support::fixtures::{seed_account, seed_condominium};
use rstest_bdd_macros::{given, then, when};
use serde_json::Value;

use crate::harness::{RequestSpec, SharedWorld, WorldFixture, login, perform, with_store};

pub(crate) fn last_body(world: &SharedWorld) -> Value {
    world.borrow().last_body.clone().expect("response body")
}

#[given("a running server with a bootstrapped superadmin")]
fn a_running_server_with_a_bootstrapped_superadmin(world: &WorldFixture) {
    let _ = world;
}

#[given("condominium {name} with resident {resident} and guard {guard}")]
fn condominium_with_resident_and_guard(
    world: &WorldFixture,
    name: String,
    resident: String,
    guard: String,
) {
    with_store(&world.world(), |store| async move {
        let condo = seed_condominium(store.as_ref(), name.trim_matches('"')).await;
        seed_account(store.as_ref(), Role::User, Some(condo.id), resident.trim_matches('"')).await;
        seed_account(store.as_ref(), Role::Guard, Some(condo.id), guard.trim_matches('"')).await;
    });
}

#[given("{actor} is logged in as {email} with password {password}")]
fn actor_is_logged_in(world: &WorldFixture, actor: String, email: String, password: String) {
    let shared = world.world();
    let actor = actor.trim_matches('"');
    login(&shared, actor, email.trim_matches('"'), password.trim_matches('"'));
    assert_eq!(shared.borrow().last_status, Some(200), "login for {actor}");
}

#[when("{actor} logs in as {email} with password {password}")]
fn actor_logs_in(world: &WorldFixture, actor: String, email: String, password: String) {
    login(
        &world.world(),
        actor.trim_matches('"'),
        email.trim_matches('"'),
        password.trim_matches('"'),
    );
}

#[when("{actor} requests {path}")]
fn actor_requests(world: &WorldFixture, actor: String, path: String) {
    perform(
        &world.world(),
        RequestSpec {
            method: Method::GET,
            path: path.trim_matches('"'),
            payload: None,
            actor: Some(actor.trim_matches('"')),
        },
    );
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    assert_eq!(world.world().borrow().last_status, Some(status));
}

#[then("the error code is {code}")]
fn the_error_code_is(world: &WorldFixture, code: String) {
    let body = last_body(&world.world());
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some(code.trim_matches('"'))
    );
}

#[then("the error detail code is {code}")]
fn the_error_detail_code_is(world: &WorldFixture, code: String) {
    let body = last_body(&world.world());
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some(code.trim_matches('"'))
    );
}

#[then("the error carries the response trace id")]
fn the_error_carries_the_response_trace_id(world: &WorldFixture) {
    let shared = world.world();
    let ctx = shared.borrow();
    let trace_id = ctx.last_trace_id.as_deref().expect("trace id header");
    let body = ctx.last_body.as_ref().expect("error body");
    assert_eq!(body.get("traceId").and_then(Value::as_str), Some(trace_id));
}
