//! View rendering.

mod engine;

pub use engine::{TemplateEngine, ViewRenderer};
