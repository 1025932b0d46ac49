//! Storage trait definitions for the domain layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::store`
//! - Mock implementations are auto-generated via `mockall` for testing

pub mod key_store;

pub use key_store::{Decrement, KeyStore};

#[cfg(test)]
pub use key_store::MockKeyStore;
