//! Infrastructure layer for external integrations.
//!
//! Implements the storage interface defined by the domain layer.
//!
//! # Modules
//!
//! - [`store`] - In-memory and Redis key stores

pub mod store;
