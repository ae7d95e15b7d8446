//! Command handlers module.
//!
//! Contains the command factories and all command implementations, one
//! submodule per domain.
//!
//! ## Adding a New Command
//!
//! 1. Create a new file in the domain's subdirectory (e.g., `order/`, `admin_product/`)
//! 2. Implement the `Command` trait
//! 3. Add it to the domain's table function, or to its action enum for
//!    switch-based domains

mod factory;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub mod admin_category;
pub mod admin_mapping;
pub mod admin_order;
pub mod admin_product;
pub mod admin_user;
pub mod basket;
pub mod file;
pub mod order;
pub mod product;
pub mod user;

pub use factory::{CommandFactory, CommandTable};
pub use traits::Command;
pub use types::ExecutionContext;
