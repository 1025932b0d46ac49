//! Application layer services implementing business logic.
//!
//! Services consume the [`KeyStore`](crate::domain::repositories::KeyStore)
//! and [`UrlValidator`](crate::domain::validator::UrlValidator) traits and
//! expose the shortening API to front-ends.
//!
//! # Available Services
//!
//! - [`services::ShorteningService`] - Shorten and resolve, composing the two below
//! - [`services::RateLimiter`] - Per-client fixed-window quota
//! - [`services::TokenGenerator`] - Collision-checked short code issuance

pub mod services;
