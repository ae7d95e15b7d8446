//! Authentication module.
//!
//! Handles sessions, the authorization gate run by protected controllers,
//! and password hashing.

mod gate;
mod password;
mod session;

pub use gate::{Access, AuthGate, AuthRequirement};
pub use password::{hash_password, verify_password};
pub use session::{
    MemorySessionStore, Session, SessionStore, SessionUser, ADMIN_ATTRIBUTE, USER_ATTRIBUTE,
};
