mod common;

use common::{code_of, create_test_service};
use std::time::Duration;
use tinylink::prelude::*;

#[tokio::test]
async fn test_resolve_unknown_code() {
    let (_, service) = create_test_service();

    let err = service.resolve("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.is_client_error());
}

#[tokio::test(start_paused = true)]
async fn test_resolve_after_expiry() {
    let (_, service) = create_test_service();
    let resp = service
        .shorten(
            &ShortenRequest::new("https://example.com").with_expiry(Duration::from_secs(10)),
            "c",
        )
        .await
        .unwrap();
    let code = code_of(&resp.short).to_string();

    tokio::time::advance(Duration::from_secs(9)).await;
    assert!(service.resolve(&code).await.is_ok());

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(
        service.resolve(&code).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_resolve_does_not_touch_rate_records() {
    let (store, service) = create_test_service();

    let _ = service.resolve("abc").await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_health_check_on_memory_store() {
    let (_, service) = create_test_service();
    assert!(service.health_check().await);
}
