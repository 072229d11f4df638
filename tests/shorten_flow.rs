mod common;

use common::MemoryStores;
use range_shortener::domain::repositories::ShortUrlRepository;
use range_shortener::error::ErrorKind;
use range_shortener::utils::key_encoder;
use std::collections::HashSet;

#[tokio::test]
async fn test_shorten_then_resolve() {
    let stores = MemoryStores::new();
    let service = stores.short_url_service("33cc6eebd387");

    let created = service
        .shorten("https://example.com/some/long/path?q=1")
        .await
        .unwrap();

    assert_eq!(service.decode_key(&created.code).unwrap(), 1);
    assert_eq!(
        service.resolve(&created.code).await.unwrap(),
        "https://example.com/some/long/path?q=1"
    );

    let stored = stores
        .short_urls
        .find_by_code(&created.code)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_access_at.is_some());
}

#[tokio::test]
async fn test_same_url_is_shortened_once() {
    let stores = MemoryStores::new();
    let service = stores.short_url_service("w");

    let first = service.shorten("https://example.com/a").await.unwrap();
    let second = service.shorten("https://example.com/a").await.unwrap();

    assert_eq!(first.code, second.code);
    assert_eq!(stores.short_urls.len().await, 1);
}

#[tokio::test]
async fn test_codes_from_different_workers_never_collide() {
    let stores = MemoryStores::new();
    let worker_a = stores.short_url_service("worker-a");
    let worker_b = stores.short_url_service("worker-b");

    let mut keys = HashSet::new();
    for i in 0..50 {
        let a = worker_a
            .shorten(&format!("https://a.example.com/{i}"))
            .await
            .unwrap();
        let b = worker_b
            .shorten(&format!("https://b.example.com/{i}"))
            .await
            .unwrap();

        assert!(keys.insert(key_encoder::decode_key(&a.code).unwrap()));
        assert!(keys.insert(key_encoder::decode_key(&b.code).unwrap()));
    }

    assert_eq!(stores.short_urls.len().await, 100);
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let stores = MemoryStores::new();
    let service = stores.short_url_service("w");

    let err = service.resolve("2zz").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_invalid_url_consumes_no_key() {
    let stores = MemoryStores::new();
    let service = stores.short_url_service("w");

    let err = service.shorten("not a url").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(stores.short_urls.is_empty().await);

    let created = service.shorten("http://example.com").await.unwrap();
    assert_eq!(service.decode_key(&created.code).unwrap(), 1);
}
