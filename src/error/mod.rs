//! Error types for the dispatch layer.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
