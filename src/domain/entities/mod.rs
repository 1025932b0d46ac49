//! Core domain entities of the shortening core.
//!
//! # Entity Types
//!
//! - [`ShortCode`] - A token identifying a stored URL mapping
//! - [`UrlRecord`] - A live `short code -> original URL` mapping
//! - [`RateRecord`] - A client's remaining quota in the current window
//! - [`RateDecision`] - Outcome of a quota check
//!
//! Both record kinds live in the same [`crate::domain::repositories::KeyStore`];
//! each owns a key namespace so a custom code can never address a client key.

pub mod link;
pub mod rate;

pub use link::{ShortCode, UrlRecord};
pub use rate::{RateDecision, RateRecord};
