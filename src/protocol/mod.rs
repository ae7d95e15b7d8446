//! Request/response protocol between the HTTP adapter, controllers and commands.
//!
//! The adapter converts wire requests into [`HttpRequest`], controllers hand
//! commands a buffered [`HttpResponse`], and commands answer with an
//! [`Outcome`] the controller commits.

mod outcome;
mod request;
mod response;

pub use outcome::Outcome;
pub use request::{cookie_value, HttpRequest, Method, UploadedFile};
pub use response::HttpResponse;
