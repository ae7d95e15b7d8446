//! Configuration module.
//!
//! Handles loading and validating server configuration from TOML files.

mod settings;

pub use settings::*;
