//! Business logic services for the application layer.

pub mod rate_limiter;
pub mod shortening_service;
pub mod token_generator;

pub use rate_limiter::RateLimiter;
pub use shortening_service::{ShortenerSettings, ShorteningService};
pub use token_generator::TokenGenerator;
