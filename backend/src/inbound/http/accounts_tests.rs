//! Tests for the admin and member management endpoints.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{BOOTSTRAP_EMAIL, BOOTSTRAP_PASSWORD, Role, ensure_superadmin};
use crate::inbound::http::test_utils::{api_app, login_cookie, memory_state};
use crate::test_support::fixtures::{SEED_PASSWORD, seed_account, seed_condominium};

#[rstest]
#[actix_web::test]
async fn superadmin_creates_an_admin_who_can_log_in() {
    let (state, store, _) = memory_state();
    ensure_superadmin(store.as_ref()).await.expect("bootstrap");
    let condo = seed_condominium(store.as_ref(), "North").await;
    let app = api_app!(state);
    let cookie = login_cookie(&app, BOOTSTRAP_EMAIL, BOOTSTRAP_PASSWORD).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/super/admins")
            .cookie(cookie.clone())
            .set_json(json!({
                "condominiumId": condo.id,
                "firstName": "Ana",
                "lastName": "Ruiz",
                "email": "Ana@North.Test",
                "password": "s3cret-pass",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let admin: Value = test::read_body_json(res).await;
    assert_eq!(admin["email"], "ana@north.test");
    assert_eq!(admin["role"], "admin");
    assert!(admin.get("passwordHash").is_none());

    let duplicate = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/super/admins")
            .cookie(cookie)
            .set_json(json!({
                "condominiumId": condo.id,
                "firstName": "Ana",
                "lastName": "Again",
                "email": "ana@north.test",
                "password": "s3cret-pass",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    login_cookie(&app, "ana@north.test", "s3cret-pass").await;
}

#[rstest]
#[actix_web::test]
async fn admins_for_unknown_condominiums_are_rejected() {
    let (state, store, _) = memory_state();
    ensure_superadmin(store.as_ref()).await.expect("bootstrap");
    let app = api_app!(state);
    let cookie = login_cookie(&app, BOOTSTRAP_EMAIL, BOOTSTRAP_PASSWORD).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/super/admins")
            .cookie(cookie)
            .set_json(json!({
                "condominiumId": 404,
                "firstName": "Ana",
                "lastName": "Ruiz",
                "email": "ana@north.test",
                "password": "s3cret-pass",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "condominium_id");
}

#[rstest]
#[actix_web::test]
async fn superadmin_cannot_delete_their_own_account() {
    let (state, store, _) = memory_state();
    ensure_superadmin(store.as_ref()).await.expect("bootstrap");
    let app = api_app!(state);
    let cookie = login_cookie(&app, BOOTSTRAP_EMAIL, BOOTSTRAP_PASSWORD).await;
    let me: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/auth/me")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/super/admins/{}", me["id"]))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn admins_manage_members_of_their_own_condominium_only() {
    let (state, store, _) = memory_state();
    let north = seed_condominium(store.as_ref(), "North").await;
    let south = seed_condominium(store.as_ref(), "South").await;
    seed_account(store.as_ref(), Role::Admin, Some(north.id), "admin@north.test").await;
    let outsider = seed_account(store.as_ref(), Role::Guard, Some(south.id), "guard@south.test").await;
    let app = api_app!(state);
    let cookie = login_cookie(&app, "admin@north.test", SEED_PASSWORD).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/users")
            .cookie(cookie.clone())
            .set_json(json!({
                "role": "guard",
                "firstName": "Gus",
                "lastName": "Gate",
                "email": "gus@north.test",
                "password": "s3cret-pass",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let guard: Value = test::read_body_json(res).await;
    assert_eq!(guard["condominiumId"], north.id.get());
    let guard_id = guard["id"].as_i64().expect("numeric id");

    let members: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/admin/users")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let emails: Vec<&str> = members
        .as_array()
        .map(|rows| rows.iter().filter_map(|row| row["email"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(emails, vec!["gus@north.test"]);

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/admin/users/{guard_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "role": "user", "enabled": false }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(res).await;
    assert_eq!(updated["role"], "user");
    assert_eq!(updated["enabled"], false);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/admin/users/{}", outsider.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/admin/users/{guard_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[case("admin")]
#[case("superadmin")]
#[actix_web::test]
async fn admins_cannot_create_privileged_members(#[case] role: &str) {
    let (state, store, _) = memory_state();
    let north = seed_condominium(store.as_ref(), "North").await;
    seed_account(store.as_ref(), Role::Admin, Some(north.id), "admin@north.test").await;
    let app = api_app!(state);
    let cookie = login_cookie(&app, "admin@north.test", SEED_PASSWORD).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/users")
            .cookie(cookie)
            .set_json(json!({
                "role": role,
                "firstName": "Eve",
                "lastName": "Escalate",
                "email": "eve@north.test",
                "password": "s3cret-pass",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn residents_cannot_reach_admin_routes() {
    let (state, store, _) = memory_state();
    let north = seed_condominium(store.as_ref(), "North").await;
    seed_account(store.as_ref(), Role::User, Some(north.id), "neighbor@north.test").await;
    let app = api_app!(state);
    let cookie = login_cookie(&app, "neighbor@north.test", SEED_PASSWORD).await;

    for uri in ["/admin/users", "/super/admins"] {
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(uri).cookie(cookie.clone()).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}
