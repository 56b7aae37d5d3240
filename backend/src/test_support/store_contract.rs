//! Behaviour every [`Store`] adapter must share.
//!
//! Each check receives a fresh, empty store and the clock that store stamps
//! timestamps with. The in-memory and PostgreSQL suites call the same checks.

use std::sync::Arc;

use crate::domain::ports::{Store, StoreError};
use crate::domain::{
    AccountFilter, BOOTSTRAP_EMAIL, BootstrapOutcome, CondominiumId, Error, NewAccount, Role,
    UserId, VisitCode, ensure_superadmin,
};

use super::MutableClock;
use super::clock::fixture_now;
use super::fixtures::{
    account_draft, condominium_draft, seed_account, seed_condominium, seed_visit, visit_draft,
};

fn expect_not_found<T: std::fmt::Debug>(result: Result<T, StoreError>) {
    match result {
        Err(err) => assert!(err.is_not_found(), "expected NotFound, got {err:?}"),
        Ok(value) => panic!("expected NotFound, got {value:?}"),
    }
}

/// Missing rows are a typed `NotFound` for every entity.
pub async fn missing_rows_are_not_found<S: Store + ?Sized>(store: &S) {
    expect_not_found(store.get_user(UserId::new(9_999)).await);
    expect_not_found(store.get_condominium(CondominiumId::new(9_999)).await);
    expect_not_found(
        store
            .get_visit(&VisitCode::from_stored("ZZZZZZZZZZ".to_owned()))
            .await,
    );
    expect_not_found(store.delete_user(UserId::new(9_999)).await);
    expect_not_found(store.delete_condominium(CondominiumId::new(9_999)).await);
    expect_not_found(
        store
            .update_user(UserId::new(9_999), Box::new(|account| Ok(account)))
            .await,
    );
}

/// Created rows read back identically and emails are normalised.
pub async fn created_rows_read_back<S: Store + ?Sized>(store: &S) {
    let condo = seed_condominium(store, "Torre Norte").await;
    assert_eq!(
        store.get_condominium(condo.id).await.expect("get condo"),
        condo
    );

    let admin = seed_account(store, Role::Admin, Some(condo.id), " Admin@Tower.Test ").await;
    assert_eq!(admin.email, "admin@tower.test");
    assert_eq!(store.get_user(admin.id).await.expect("get user"), admin);
    let by_email = store
        .find_user_by_email("admin@tower.test")
        .await
        .expect("lookup");
    assert_eq!(by_email, Some(admin));
}

/// Invalid entities are rejected and nothing is persisted.
pub async fn invalid_creates_are_rejected<S: Store + ?Sized>(store: &S) {
    let mut blank = condominium_draft("x");
    blank.name = "   ".to_owned();
    let err = store
        .create_condominium(blank)
        .await
        .expect_err("blank name");
    assert!(matches!(err, StoreError::Validation { .. }), "{err:?}");
    assert!(store.list_condominiums().await.expect("list").is_empty());

    let orphan_guard = account_draft(Role::Guard, None, "guard@tower.test");
    let err = store
        .create_user(orphan_guard)
        .await
        .expect_err("guard without condominium");
    assert!(matches!(err, StoreError::Validation { .. }), "{err:?}");
    assert_eq!(
        store.count_users_by_role(Role::Guard).await.expect("count"),
        0
    );
}

/// Emails are unique regardless of case, on create and on update.
pub async fn duplicate_email_is_a_conflict<S: Store + ?Sized>(store: &S) {
    let condo = seed_condominium(store, "Torre Sur").await;
    seed_account(store, Role::User, Some(condo.id), "ana@tower.test").await;
    let other = seed_account(store, Role::User, Some(condo.id), "bea@tower.test").await;

    let err = store
        .create_user(account_draft(Role::Guard, Some(condo.id), "ANA@tower.test"))
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");

    let err = store
        .update_user(
            other.id,
            Box::new(|mut account| {
                account.email = "ana@tower.test".to_owned();
                Ok(account)
            }),
        )
        .await
        .expect_err("duplicate email on update");
    assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");
    assert_eq!(
        store.get_user(other.id).await.expect("get").email,
        "bea@tower.test"
    );
}

/// Mutator errors and invalid results leave the row untouched; successful
/// updates advance `updated_at`, stamped at microsecond precision.
pub async fn update_is_all_or_nothing<S: Store + ?Sized>(store: &S, clock: &MutableClock) {
    let condo = seed_condominium(store, "Torre Este").await;

    let err = store
        .update_condominium(
            condo.id,
            Box::new(|_| Err(Error::forbidden("not today"))),
        )
        .await
        .expect_err("mutator refuses");
    assert_eq!(err, StoreError::rejected(Error::forbidden("not today")));

    let err = store
        .update_condominium(
            condo.id,
            Box::new(|mut row| {
                row.address = String::new();
                Ok(row)
            }),
        )
        .await
        .expect_err("invalid result");
    assert!(matches!(err, StoreError::Validation { .. }), "{err:?}");
    assert_eq!(store.get_condominium(condo.id).await.expect("get"), condo);

    clock.set(clock_now(clock) + chrono::TimeDelta::nanoseconds(60_000_000_789));
    let updated = store
        .update_condominium(
            condo.id,
            Box::new(|mut row| {
                row.name = "Torre Este II".to_owned();
                Ok(row)
            }),
        )
        .await
        .expect("update");
    assert_eq!(updated.name, "Torre Este II");
    assert_eq!(updated.created_at, condo.created_at);
    assert!(updated.updated_at > condo.updated_at);
    assert_eq!(
        chrono::Timelike::nanosecond(&updated.updated_at) % 1_000,
        0,
        "timestamps are stored at microsecond precision"
    );
    assert_eq!(store.get_condominium(condo.id).await.expect("get"), updated);
}

/// Counts are exact; the superadmin count ignores disabled accounts.
pub async fn counts_are_exact<S: Store + ?Sized>(store: &S) {
    let condo = seed_condominium(store, "Torre Oeste").await;
    assert_eq!(store.count_superadmins().await.expect("count"), 0);

    let root = seed_account(store, Role::Superadmin, None, "root@local").await;
    seed_account(store, Role::Superadmin, None, "root2@local").await;
    seed_account(store, Role::Guard, Some(condo.id), "g1@tower.test").await;
    seed_account(store, Role::Guard, Some(condo.id), "g2@tower.test").await;
    seed_account(store, Role::Guard, Some(condo.id), "g3@tower.test").await;

    assert_eq!(store.count_users_by_role(Role::Guard).await.expect("count"), 3);
    assert_eq!(store.count_users_by_role(Role::Admin).await.expect("count"), 0);
    assert_eq!(store.count_superadmins().await.expect("count"), 2);

    store
        .update_user(
            root.id,
            Box::new(|mut account| {
                account.enabled = false;
                Ok(account)
            }),
        )
        .await
        .expect("disable");
    assert_eq!(store.count_superadmins().await.expect("count"), 1);
    assert_eq!(
        store
            .count_users_by_role(Role::Superadmin)
            .await
            .expect("count"),
        2
    );
}

/// Listings honour role and condominium filters and skip hidden accounts.
pub async fn listings_are_filtered<S: Store + ?Sized>(store: &S) {
    let north = seed_condominium(store, "Norte").await;
    let south = seed_condominium(store, "Sur").await;
    let guard = seed_account(store, Role::Guard, Some(north.id), "guard@norte.test").await;
    let resident = seed_account(store, Role::User, Some(north.id), "res@norte.test").await;
    seed_account(store, Role::User, Some(south.id), "res@sur.test").await;
    let mut hidden = account_draft(Role::Guard, Some(north.id), "hidden@norte.test");
    hidden.hidden = true;
    store.create_user(hidden).await.expect("hidden account");

    let members = store
        .list_users(&AccountFilter {
            roles: vec![Role::Guard, Role::User],
            condominium_id: Some(north.id),
        })
        .await
        .expect("list");
    let ids: Vec<_> = members.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![guard.id, resident.id]);

    let residents = store
        .list_users(&AccountFilter::role(Role::User))
        .await
        .expect("list");
    assert_eq!(residents.len(), 2);

    let condos = store.list_condominiums().await.expect("list");
    assert_eq!(
        condos.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![north.id, south.id]
    );
}

/// A referenced condominium cannot be deleted; an empty one can.
pub async fn referenced_condominium_delete_conflicts<S: Store + ?Sized>(store: &S) {
    let condo = seed_condominium(store, "Ocupado").await;
    let resident = seed_account(store, Role::User, Some(condo.id), "res@ocupado.test").await;

    let err = store
        .delete_condominium(condo.id)
        .await
        .expect_err("still referenced");
    assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");

    store.delete_user(resident.id).await.expect("delete user");
    store.delete_condominium(condo.id).await.expect("delete condo");
    expect_not_found(store.get_condominium(condo.id).await);
}

/// Visits are keyed by code, listed by creator and condominium, a code
/// clash has its own error, and `uses` never goes down.
pub async fn visits_by_code_creator_and_condominium<S: Store + ?Sized>(store: &S) {
    let condo = seed_condominium(store, "Visitas").await;
    let other = seed_condominium(store, "Otra").await;
    let ana = seed_account(store, Role::User, Some(condo.id), "ana@visitas.test").await;
    let bea = seed_account(store, Role::User, Some(other.id), "bea@otra.test").await;
    let from = fixture_now();

    let first = seed_visit(store, visit_draft("AAAAAAAAA2", condo.id, ana.id, 1, from)).await;
    assert_eq!(first.uses, 0);
    seed_visit(store, visit_draft("AAAAAAAAA3", condo.id, ana.id, 0, from)).await;
    seed_visit(store, visit_draft("AAAAAAAAA4", other.id, bea.id, 2, from)).await;

    let err = store
        .create_visit(visit_draft("AAAAAAAAA2", condo.id, ana.id, 5, from))
        .await
        .expect_err("code clash");
    assert_eq!(err, StoreError::DuplicateVisitCode);

    assert_eq!(
        store
            .get_visit(&first.code)
            .await
            .expect("get visit"),
        first
    );
    assert_eq!(
        store
            .list_visits_by_creator(ana.id)
            .await
            .expect("list")
            .len(),
        2
    );
    assert_eq!(
        store
            .list_visits_by_condominium(other.id)
            .await
            .expect("list")
            .len(),
        1
    );

    let err = store
        .update_visit(
            &first.code,
            Box::new(|mut visit| {
                visit.uses = 2;
                Ok(visit)
            }),
        )
        .await
        .expect_err("uses beyond max");
    assert!(matches!(err, StoreError::Validation { .. }), "{err:?}");

    let used = store
        .update_visit(
            &first.code,
            Box::new(|mut visit| {
                visit.uses = 1;
                Ok(visit)
            }),
        )
        .await
        .expect("record a use");
    assert_eq!(used.uses, 1);
    let err = store
        .update_visit(
            &first.code,
            Box::new(|mut visit| {
                visit.uses = 0;
                Ok(visit)
            }),
        )
        .await
        .expect_err("uses never go down");
    assert!(
        matches!(&err, StoreError::Validation { error } if error.field() == "uses"),
        "{err:?}"
    );
    assert_eq!(store.get_visit(&first.code).await.expect("get").uses, 1);

    store.delete_visit(&first.code).await.expect("delete");
    expect_not_found(store.get_visit(&first.code).await);
}

/// Concurrent single-use consumption admits exactly one winner.
pub async fn concurrent_updates_are_serialised<S>(store: Arc<S>, clock: &MutableClock)
where
    S: Store + ?Sized + 'static,
{
    let condo = seed_condominium(store.as_ref(), "Concurrente").await;
    let ana = seed_account(store.as_ref(), Role::User, Some(condo.id), "ana@c.test").await;
    let visit = seed_visit(
        store.as_ref(),
        visit_draft("CCCCCCCCC2", condo.id, ana.id, 1, clock_now(clock)),
    )
    .await;

    let attempts = (0..8).map(|_| {
        let store = Arc::clone(&store);
        let code = visit.code.clone();
        tokio::spawn(async move {
            store
                .update_visit(
                    &code,
                    Box::new(|mut row| {
                        if row.max_uses > 0 && row.uses >= row.max_uses {
                            return Err(Error::invalid_request("visit has no remaining uses"));
                        }
                        row.uses += 1;
                        Ok(row)
                    }),
                )
                .await
        })
    });
    let mut successes = 0;
    for handle in attempts.collect::<Vec<_>>() {
        if handle.await.expect("task joins").is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(store.get_visit(&visit.code).await.expect("get").uses, 1);
}

/// Bootstrapping twice creates the superadmin once and then does nothing.
pub async fn bootstrap_is_idempotent<S: Store + ?Sized>(store: &S) {
    let first = ensure_superadmin(store).await.expect("first bootstrap");
    let BootstrapOutcome::Created(id) = first else {
        panic!("expected Created, got {first:?}");
    };
    let second = ensure_superadmin(store).await.expect("second bootstrap");
    assert_eq!(second, BootstrapOutcome::AlreadyPresent);

    assert_eq!(
        store
            .count_users_by_role(Role::Superadmin)
            .await
            .expect("count"),
        1
    );
    let row = store
        .find_user_by_email(BOOTSTRAP_EMAIL)
        .await
        .expect("lookup")
        .expect("bootstrap row");
    assert_eq!(row.id, id);
    assert!(row.enabled);
}

/// A disabled account holding the bootstrap email is reported, not touched.
pub async fn bootstrap_leaves_a_taken_email_alone<S: Store + ?Sized>(store: &S) {
    let disabled = store
        .create_user(NewAccount {
            enabled: false,
            ..account_draft(Role::Superadmin, None, BOOTSTRAP_EMAIL)
        })
        .await
        .expect("seed disabled superadmin");

    let outcome = ensure_superadmin(store).await.expect("bootstrap");
    assert_eq!(outcome, BootstrapOutcome::EmailTaken(disabled.id));

    assert_eq!(store.get_user(disabled.id).await.expect("get"), disabled);
    assert_eq!(
        store
            .count_users_by_role(Role::Superadmin)
            .await
            .expect("count"),
        1
    );
    assert_eq!(store.count_superadmins().await.expect("count enabled"), 0);
}

fn clock_now(clock: &MutableClock) -> chrono::DateTime<chrono::Utc> {
    mockable::Clock::utc(clock)
}
