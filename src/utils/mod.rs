//! Utility functions for code generation and URL processing.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`url_normalizer`] - Scheme enforcement and the default URL validator

pub mod code_generator;
pub mod url_normalizer;
