//! HTTP server module.
//!
//! Accepts TCP connections with axum and hands every request to the
//! [`crate::controller::Dispatcher`].

mod convert;
mod listener;

pub use convert::{into_axum_response, read_request};
pub use listener::{HttpServer, ServerOptions};
