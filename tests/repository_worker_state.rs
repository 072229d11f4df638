use sqlx::PgPool;
use std::sync::Arc;
use range_shortener::domain::entities::WorkerState;
use range_shortener::domain::repositories::WorkerStateRepository;
use range_shortener::error::ErrorKind;
use range_shortener::infrastructure::persistence::PgWorkerStateRepository;

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_missing_worker_returns_none(pool: PgPool) {
    let repo = PgWorkerStateRepository::new(Arc::new(pool));

    assert!(repo.find_by_worker_id("nobody").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_save_and_reload_ranges_in_order(pool: PgPool) {
    let repo = PgWorkerStateRepository::new(Arc::new(pool));

    let mut state = WorkerState::new("w1");
    state.push_range(1);
    state.allocated_ranges[0].counter = 19_999_999;
    state.allocated_ranges[0].exhausted = true;
    state.push_range(7);
    state.allocated_ranges[1].counter = 3;
    repo.save(&state).await.unwrap();

    let found = repo.find_by_worker_id("w1").await.unwrap().unwrap();

    assert_eq!(found.version, 1);
    assert_eq!(found.allocated_ranges, state.allocated_ranges);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_advances_counter(pool: PgPool) {
    let repo = PgWorkerStateRepository::new(Arc::new(pool));

    let mut state = WorkerState::new("w1");
    state.push_range(1);
    repo.save(&state).await.unwrap();

    let mut loaded = repo.find_by_worker_id("w1").await.unwrap().unwrap();
    loaded.allocated_ranges[0].counter = 42;
    repo.save(&loaded).await.unwrap();

    let reloaded = repo.find_by_worker_id("w1").await.unwrap().unwrap();
    assert_eq!(reloaded.version, 2);
    assert_eq!(reloaded.allocated_ranges[0].counter, 42);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_version_is_conflict(pool: PgPool) {
    let repo = PgWorkerStateRepository::new(Arc::new(pool));

    let fresh = WorkerState::new("w1");
    repo.save(&fresh).await.unwrap();

    let err = repo.save(&fresh).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKeyConflict);

    let loaded = repo.find_by_worker_id("w1").await.unwrap().unwrap();
    repo.save(&loaded).await.unwrap();

    let err = repo.save(&loaded).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKeyConflict);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_partition_cannot_belong_to_two_workers(pool: PgPool) {
    let repo = PgWorkerStateRepository::new(Arc::new(pool));

    let mut first = WorkerState::new("w1");
    first.push_range(5);
    repo.save(&first).await.unwrap();

    let mut second = WorkerState::new("w2");
    second.push_range(5);
    let err = repo.save(&second).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateKeyConflict);
    assert!(repo.find_by_worker_id("w2").await.unwrap().is_none());
}
