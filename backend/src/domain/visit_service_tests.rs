//! Issuing, inspecting, and consuming visitor passes.

use std::sync::Arc;

use chrono::TimeDelta;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockVisitRepository;
use crate::domain::{Account, ErrorCode};
use crate::outbound::memory::MemoryStore;
use crate::test_support::MutableClock;
use crate::test_support::clock::fixture_now;
use crate::test_support::fixtures::{seed_account, seed_condominium};

struct World {
    clock: Arc<MutableClock>,
    service: VisitService<MemoryStore>,
    resident: Account,
    neighbour: Account,
    guard: Account,
    foreign_guard: Account,
}

#[fixture]
async fn world() -> World {
    let clock = Arc::new(MutableClock::at_fixture());
    let store = Arc::new(MemoryStore::new(clock.clone()));
    let north = seed_condominium(store.as_ref(), "Norte").await;
    let south = seed_condominium(store.as_ref(), "Sur").await;
    let resident = seed_account(store.as_ref(), Role::User, Some(north.id), "res@norte.test").await;
    let neighbour = seed_account(store.as_ref(), Role::User, Some(north.id), "vec@norte.test").await;
    let guard = seed_account(store.as_ref(), Role::Guard, Some(north.id), "gus@norte.test").await;
    let foreign_guard = seed_account(store.as_ref(), Role::Guard, Some(south.id), "gus@sur.test").await;
    World {
        service: VisitService::new(store, clock.clone()),
        clock,
        resident,
        neighbour,
        guard,
        foreign_guard,
    }
}

fn request(max_uses: i32, hours: i64) -> VisitRequest {
    VisitRequest {
        visitor_name: " Carla Gómez ".to_owned(),
        max_uses,
        valid_from: None,
        valid_to: fixture_now() + TimeDelta::hours(hours),
    }
}

fn reason(err: &Error) -> Option<&str> {
    err.details()
        .and_then(|d| d.get("code"))
        .and_then(|c| c.as_str())
}

#[rstest]
#[tokio::test]
async fn resident_issues_pass_for_own_condominium(#[future] world: World) {
    let world = world.await;
    let visit = world
        .service
        .issue(Some(&world.resident.identity()), request(2, 4))
        .await
        .expect("issue");

    assert_eq!(visit.visitor_name, "Carla Gómez");
    assert_eq!(visit.condominium_id, world.resident.condominium_id.expect("condo"));
    assert_eq!(visit.created_by, world.resident.id);
    assert_eq!(visit.uses, 0);
    assert_eq!(visit.valid_from, fixture_now());
    assert_eq!(VisitCode::parse(visit.code.as_str()), Ok(visit.code.clone()));
}

#[rstest]
#[tokio::test]
async fn past_window_is_rejected(#[future] world: World) {
    let world = world.await;
    let err = world
        .service
        .issue(Some(&world.resident.identity()), request(1, -1))
        .await
        .expect_err("already over");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn guards_cannot_issue(#[future] world: World) {
    let world = world.await;
    let err = world
        .service
        .issue(Some(&world.guard.identity()), request(1, 1))
        .await
        .expect_err("guard");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn single_use_pass_admits_one_entry(#[future] world: World) {
    let world = world.await;
    let visit = world
        .service
        .issue(Some(&world.resident.identity()), request(1, 4))
        .await
        .expect("issue");
    let guard = world.guard.identity();

    let used = world
        .service
        .record_use(Some(&guard), &visit.code)
        .await
        .expect("first entry");
    assert_eq!(used.uses, 1);

    let err = world
        .service
        .record_use(Some(&guard), &visit.code)
        .await
        .expect_err("second entry");
    assert_eq!(reason(&err), Some("visit_exhausted"));

    let inspection = world
        .service
        .inspect(Some(&guard), &visit.code)
        .await
        .expect("inspect");
    assert!(!inspection.usable);
    assert_eq!(inspection.remaining_uses, Some(0));
}

#[rstest]
#[case(-3_600, "visit_not_yet_valid")]
#[case(5 * 3_600, "visit_expired")]
#[tokio::test]
async fn entries_outside_the_window_are_refused(
    #[future] world: World,
    #[case] offset_seconds: i64,
    #[case] expected: &str,
) {
    let world = world.await;
    let mut req = request(0, 4);
    req.valid_from = Some(fixture_now());
    let visit = world
        .service
        .issue(Some(&world.resident.identity()), req)
        .await
        .expect("issue");

    world.clock.advance_seconds(offset_seconds);
    let err = world
        .service
        .record_use(Some(&world.guard.identity()), &visit.code)
        .await
        .expect_err("outside window");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(reason(&err), Some(expected));
}

#[rstest]
#[tokio::test]
async fn guard_of_another_condominium_is_forbidden(#[future] world: World) {
    let world = world.await;
    let visit = world
        .service
        .issue(Some(&world.resident.identity()), request(0, 4))
        .await
        .expect("issue");

    let err = world
        .service
        .record_use(Some(&world.foreign_guard.identity()), &visit.code)
        .await
        .expect_err("other tenant");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn unknown_code_is_not_found(#[future] world: World) {
    let world = world.await;
    let code = VisitCode::parse("ZZZZZZZZZZ").expect("well formed");
    let err = world
        .service
        .inspect(Some(&world.guard.identity()), &code)
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn residents_list_and_revoke_only_their_own(#[future] world: World) {
    let world = world.await;
    let mine = world
        .service
        .issue(Some(&world.resident.identity()), request(0, 4))
        .await
        .expect("issue");
    world
        .service
        .issue(Some(&world.neighbour.identity()), request(0, 4))
        .await
        .expect("issue");

    let listed = world
        .service
        .list_mine(Some(&world.resident.identity()))
        .await
        .expect("list");
    assert_eq!(listed, vec![mine.clone()]);

    let err = world
        .service
        .revoke(Some(&world.neighbour.identity()), &mine.code)
        .await
        .expect_err("not theirs");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    world
        .service
        .revoke(Some(&world.resident.identity()), &mine.code)
        .await
        .expect("revoke");
    assert!(
        world
            .service
            .list_mine(Some(&world.resident.identity()))
            .await
            .expect("list")
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn concurrent_entries_never_exceed_max_uses(#[future] world: World) {
    let world = world.await;
    let visit = world
        .service
        .issue(Some(&world.resident.identity()), request(1, 4))
        .await
        .expect("issue");
    let guard = world.guard.identity();

    let attempts = (0..16).map(|_| {
        let service = world.service.clone();
        let code = visit.code.clone();
        tokio::spawn(async move { service.record_use(Some(&guard), &code).await })
    });
    let mut successes = 0;
    let mut exhausted = 0;
    for handle in attempts.collect::<Vec<_>>() {
        match handle.await.expect("join") {
            Ok(_) => successes += 1,
            Err(err) if reason(&err) == Some("visit_exhausted") => exhausted += 1,
            Err(err) => panic!("unexpected error: {err:?}"),
        }
    }
    assert_eq!((successes, exhausted), (1, 15));
}

fn resident_identity() -> Identity {
    Identity {
        id: crate::domain::UserId::new(7),
        condominium_id: Some(CondominiumId::new(1)),
        role: Role::User,
        enabled: true,
    }
}

fn mock_service(repo: MockVisitRepository) -> VisitService<MockVisitRepository> {
    VisitService::new(Arc::new(repo), Arc::new(MutableClock::at_fixture()))
}

#[rstest]
#[tokio::test]
async fn code_collisions_are_retried_with_a_fresh_code() {
    let mut repo = MockVisitRepository::new();
    let mut seq = mockall::Sequence::new();
    repo.expect_create_visit()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Err(StoreError::duplicate_visit_code()));
    repo.expect_create_visit()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|draft| Ok(draft.into_visit(fixture_now())));

    let visit = mock_service(repo)
        .issue(Some(&resident_identity()), request(1, 4))
        .await
        .expect("second attempt succeeds");
    assert_eq!(visit.created_by, resident_identity().id);
}

#[rstest]
#[tokio::test]
async fn other_conflicts_are_not_retried() {
    let mut repo = MockVisitRepository::new();
    repo.expect_create_visit().times(1).return_once(|_| {
        Err(StoreError::conflict(
            "visit references a missing condominium or user",
        ))
    });

    let err = mock_service(repo)
        .issue(Some(&resident_identity()), request(1, 4))
        .await
        .expect_err("dangling reference");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "visit references a missing condominium or user");
}

#[rstest]
#[tokio::test]
async fn persistent_collisions_give_up_after_bounded_attempts() {
    let mut repo = MockVisitRepository::new();
    repo.expect_create_visit()
        .times(CODE_ATTEMPTS)
        .returning(|_| Err(StoreError::duplicate_visit_code()));

    let err = mock_service(repo)
        .issue(Some(&resident_identity()), request(1, 4))
        .await
        .expect_err("codes exhausted");
    assert_eq!(err.code(), ErrorCode::InternalError);
}
