use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use range_shortener::domain::entities::NewShortUrl;
use range_shortener::domain::repositories::ShortUrlRepository;
use range_shortener::error::ErrorKind;
use range_shortener::infrastructure::persistence::PgShortUrlRepository;

fn new_short_url(code: &str, long_url: &str) -> NewShortUrl {
    NewShortUrl {
        code: code.to_string(),
        long_url: long_url.to_string(),
        expires_at: Some(Utc::now() + Duration::days(1)),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find_by_code(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let created = repo
        .create(new_short_url("211f0", "https://example.com/"))
        .await
        .unwrap();

    assert_eq!(created.code, "211f0");
    assert!(created.last_access_at.is_none());

    let found = repo.find_by_code("211f0").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.long_url, "https://example.com/");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_code_is_conflict(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    repo.create(new_short_url("2ab", "https://a.example.com/"))
        .await
        .unwrap();
    let err = repo
        .create(new_short_url("2ab", "https://b.example.com/"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateKeyConflict);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_by_long_url_returns_latest(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    repo.create(new_short_url("2a0", "https://example.com/x"))
        .await
        .unwrap();
    let latest = repo
        .create(new_short_url("3a0", "https://example.com/x"))
        .await
        .unwrap();

    let found = repo
        .find_by_long_url("https://example.com/x")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, latest.id);
    assert!(repo
        .find_by_long_url("https://example.com/y")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_record_access(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    repo.create(new_short_url("2ab", "https://example.com/"))
        .await
        .unwrap();

    assert!(repo.record_access("2ab", Utc::now()).await.unwrap());
    assert!(!repo.record_access("missing", Utc::now()).await.unwrap());

    let found = repo.find_by_code("2ab").await.unwrap().unwrap();
    assert!(found.last_access_at.is_some());
}
