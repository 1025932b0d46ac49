//! Data Transfer Objects for the shortening core.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Durations travel as whole seconds.

pub mod shorten;

pub use shorten::{ShortenRequest, ShortenResponse};
