use sqlx::PgPool;
use std::sync::Arc;
use range_shortener::domain::repositories::PartitionCounterRepository;
use range_shortener::infrastructure::persistence::PgPartitionCounterRepository;

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_first_increment_returns_one(pool: PgPool) {
    let repo = PgPartitionCounterRepository::new(Arc::new(pool));

    assert_eq!(repo.current().await.unwrap(), 0);
    assert_eq!(repo.increment_and_fetch().await.unwrap(), 1);
    assert_eq!(repo.increment_and_fetch().await.unwrap(), 2);
    assert_eq!(repo.current().await.unwrap(), 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_increments_are_unique(pool: PgPool) {
    let repo = Arc::new(PgPartitionCounterRepository::new(Arc::new(pool)));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_and_fetch().await.unwrap() })
        })
        .collect();

    let mut values = Vec::new();
    for handle in handles {
        values.push(handle.await.unwrap());
    }
    values.sort_unstable();

    assert_eq!(values, (1..=20).collect::<Vec<i64>>());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_named_counters_are_independent(pool: PgPool) {
    let pool = Arc::new(pool);
    let first = PgPartitionCounterRepository::with_name(pool.clone(), "first");
    let second = PgPartitionCounterRepository::with_name(pool, "second");

    first.increment_and_fetch().await.unwrap();
    first.increment_and_fetch().await.unwrap();

    assert_eq!(second.increment_and_fetch().await.unwrap(), 1);
}
