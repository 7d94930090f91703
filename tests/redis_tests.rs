// tests/redis_tests.rs
//
// Needs a running Redis; run with `TEST_REDIS_URL=redis://localhost:6379/15 cargo test -- --ignored`.

#![cfg(feature = "redis")]

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tron_http::{
    storage::{cursor_key, CursorStore, RedisCursorStore},
    ApiKeys, CredentialRotator,
};

fn get_test_redis_url() -> String {
    std::env::var("TEST_REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379/15".to_string())
}

fn unique_prefix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("tron_http_test:{nanos}:")
}

fn test_store() -> Arc<RedisCursorStore> {
    Arc::new(RedisCursorStore::from_url(&get_test_redis_url(), Some(unique_prefix())).unwrap())
}

#[tokio::test]
#[ignore]
async fn test_redis_rotation_cycles() {
    let rotator = CredentialRotator::new(test_store());
    let candidates = ApiKeys::from("a,b,c");

    let mut issued = Vec::new();
    for _ in 0..4 {
        issued.push(rotator.next_key("mainnet", &candidates, None).await.unwrap().unwrap());
    }
    assert_eq!(issued, vec!["a", "b", "c", "a"]);
}

#[tokio::test]
#[ignore]
async fn test_redis_advance_coerces_corrupted_cursor() {
    let store = test_store();
    let key = cursor_key("nile");

    store.set(&key, "oops").await.unwrap();
    assert_eq!(store.advance(&key, 3).await.unwrap(), 0);

    store.set(&key, "7").await.unwrap();
    assert_eq!(store.advance(&key, 3).await.unwrap(), 0);

    for raw in ["0x2", "2.0", "1e0", "1.5"] {
        store.set(&key, raw).await.unwrap();
        assert_eq!(store.advance(&key, 3).await.unwrap(), 0, "cursor {raw}");
    }

    store.set(&key, " +1 ").await.unwrap();
    assert_eq!(store.advance(&key, 3).await.unwrap(), 2);

    store.set(&key, "1").await.unwrap();
    assert_eq!(store.advance(&key, 3).await.unwrap(), 2);
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("2"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_redis_concurrent_rotation_is_fair() {
    let rotator = CredentialRotator::new(test_store());
    let candidates = ApiKeys::from("a,b,c");

    let tasks = (0..30).map(|_| {
        let rotator = rotator.clone();
        let candidates = candidates.clone();
        tokio::spawn(async move { rotator.next_key("mainnet", &candidates, None).await })
    });

    let mut counts: HashMap<String, usize> = HashMap::new();
    for result in join_all(tasks).await {
        *counts.entry(result.unwrap().unwrap().unwrap()).or_default() += 1;
    }
    assert!(counts.values().all(|&n| n == 10), "uneven distribution: {counts:?}");
}

#[tokio::test]
#[ignore]
async fn test_redis_unreachable_is_store_error() {
    let store = RedisCursorStore::from_url("redis://127.0.0.1:1/", None).unwrap();
    let err = store.advance(&cursor_key("mainnet"), 2).await.unwrap_err();
    assert!(matches!(err, tron_http::AppError::Store { .. }));
}
