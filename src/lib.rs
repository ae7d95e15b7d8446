//! Shop Dispatch Library
//!
//! This crate provides the command-dispatch layer of a multi-domain shop
//! web application: controllers map each request to a command, run it and
//! commit the outcome it returns.

pub mod audit;
pub mod auth;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod protocol;
pub mod server;
pub mod services;
pub mod templates;
pub mod validation;
