#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tinylink::prelude::*;

pub const PUBLIC_DOMAIN: &str = "myshortener.com";

pub type TestService = ShorteningService<MemoryStore, HostValidator>;

pub fn test_settings() -> ShortenerSettings {
    ShortenerSettings {
        public_domain: PUBLIC_DOMAIN.to_string(),
        ..ShortenerSettings::default()
    }
}

pub fn create_test_service() -> (Arc<MemoryStore>, TestService) {
    create_test_service_with(test_settings())
}

pub fn create_test_service_with(settings: ShortenerSettings) -> (Arc<MemoryStore>, TestService) {
    let store = Arc::new(MemoryStore::new());
    let validator = Arc::new(HostValidator::new(&settings.public_domain));
    let service = ShorteningService::new(Arc::clone(&store), validator, settings);
    (store, service)
}

pub fn code_of(short_url: &str) -> &str {
    short_url.rsplit('/').next().unwrap()
}

pub const HOUR: Duration = Duration::from_secs(3600);
