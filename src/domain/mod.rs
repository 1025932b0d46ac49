//! Domain layer containing entities and the contracts the core depends on.
//!
//! - [`entities`] - Short codes, URL records and rate records
//! - [`repositories`] - The [`repositories::KeyStore`] contract
//! - [`validator`] - URL predicates supplied by the embedding application

pub mod entities;
pub mod repositories;
pub mod validator;
