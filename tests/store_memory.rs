use std::sync::Arc;
use std::time::Duration;
use tinylink::prelude::*;

const WINDOW: Duration = Duration::from_secs(1800);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rate_limiter_concurrent_first_requests() {
    let store = Arc::new(MemoryStore::new());
    let limiter = Arc::new(RateLimiter::new(Arc::clone(&store), 10, WINDOW));

    let mut handles = vec![];
    for _ in 0..25 {
        let limiter = Arc::clone(&limiter);
        handles.push(tokio::spawn(async move { limiter.check("burst").await }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().allowed {
            allowed += 1;
        }
    }

    assert_eq!(allowed, 10);
    assert_eq!(
        store.get("rate:burst").await.unwrap().as_deref(),
        Some("0")
    );
}

#[tokio::test]
async fn test_url_and_rate_namespaces_do_not_collide() {
    let store = Arc::new(MemoryStore::new());
    let limiter = RateLimiter::new(Arc::clone(&store), 10, WINDOW);
    let generator = TokenGenerator::default();

    limiter.check("promo").await.unwrap();
    let code = generator
        .issue(store.as_ref(), Some("promo"), "https://example.com", WINDOW)
        .await
        .unwrap();

    assert_eq!(code.as_str(), "promo");
    assert_eq!(store.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_stops_with_store() {
    let store = Arc::new(MemoryStore::new());
    store
        .put("url:gone", "https://example.com", Duration::from_secs(1))
        .await
        .unwrap();

    let handle = store.spawn_sweeper(Duration::from_secs(2));
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(store.is_empty());

    drop(store);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(handle.is_finished());
}
