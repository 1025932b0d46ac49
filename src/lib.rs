//! # tinylink
//!
//! URL shortening core: collision-checked short codes, expiry-bound storage
//! and per-client rate limiting that stay correct under concurrent access.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities, the [`KeyStore`](domain::repositories::KeyStore)
//!   contract and the [`UrlValidator`](domain::validator::UrlValidator) seam
//! - **Application Layer** ([`application`]) - Rate limiting, code issuance and the
//!   shortening service
//! - **Infrastructure Layer** ([`infrastructure`]) - In-memory and Redis key stores
//! - **DTOs** ([`dto`]) - Serde request/response types
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tinylink::prelude::*;
//!
//! # async fn run() -> Result<(), ShortenError> {
//! let store = Arc::new(MemoryStore::new());
//! let validator = Arc::new(HostValidator::new("sho.rt"));
//! let service = ShorteningService::new(store, validator, ShortenerSettings::default());
//!
//! let resp = service
//!     .shorten(&ShortenRequest::new("example.com/page"), "203.0.113.7")
//!     .await?;
//! assert_eq!(resp.url, "https://example.com/page");
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! The `tinylink` binary loads its settings from environment variables via
//! [`config::Config`]. See the [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod dto;
pub mod error;
pub mod infrastructure;
pub mod utils;

pub use error::{ShortenError, StoreError};

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        RateLimiter, ShortenerSettings, ShorteningService, TokenGenerator,
    };
    pub use crate::domain::entities::{RateDecision, ShortCode, UrlRecord};
    pub use crate::domain::repositories::{Decrement, KeyStore};
    pub use crate::domain::validator::UrlValidator;
    pub use crate::dto::{ShortenRequest, ShortenResponse};
    pub use crate::error::{ErrorKind, ShortenError, StoreError};
    pub use crate::infrastructure::store::{MemoryStore, RedisStore, RedisStoreConfig};
    pub use crate::utils::code_generator::CodeAlphabet;
    pub use crate::utils::url_normalizer::HostValidator;
}
